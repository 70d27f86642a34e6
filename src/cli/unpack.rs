use std::fs::File;
use std::io::{self, BufWriter, Read, Write};

use anyhow::{Context, Result, bail};
use log::Level;

use super::command::{Cli, Unpack14Args};
use crate::input::InputReader;
use dtscore::process::unpack::Unpacker;

pub fn cmd_unpack14(args: &Unpack14Args, cli: &Cli) -> Result<()> {
    log::info!("Unpacking 14-bit stream: {}", args.input.display());

    let mut reader = InputReader::new(&args.input)?;
    if reader.is_pipe() {
        log::debug!("reading from stdin pipe");
    }

    if args.skip > 0 {
        let skipped = io::copy(&mut (&mut reader).take(args.skip), &mut io::sink())?;
        if skipped < args.skip {
            bail!(
                "input ends after {skipped} bytes, cannot skip {} bytes",
                args.skip
            );
        }
    }

    let mut writer: Box<dyn Write> = match &args.output {
        Some(path) => {
            let file = File::create_new(path)
                .with_context(|| format!("cannot create {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::stdout().lock()),
    };

    let mut unpacker = Unpacker::default();
    if cli.strict {
        unpacker.set_fail_level(Level::Warn);
    }

    let report = unpacker.convert(&mut reader, &mut writer)?;
    writer.flush()?;

    log::info!(
        "{} blocks converted, {} bytes written",
        report.blocks,
        report.bytes_out
    );

    Ok(())
}
