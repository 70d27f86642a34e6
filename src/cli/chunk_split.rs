use std::fs::File;
use std::io::{BufReader, BufWriter, Write};

use anyhow::{Context, Result, bail};

use super::command::ChunkSplitArgs;
use dtscore::process::scan::{ScanEvent, Scanner};
use dtscore::process::split::create_track_file;
use dtscore::utils::errors::ScanError;

/// Splits at desync boundaries. Streams extracted from a dtswav carry
/// zero padding between tracks so that each track starts frame-aligned;
/// the padding closes out the running track and the marker after it
/// opens the next one.
pub fn cmd_chunk_split(args: &ChunkSplitArgs) -> Result<()> {
    log::info!("Splitting {} at desync boundaries", args.input.display());

    let file = File::open(&args.input)
        .with_context(|| format!("cannot open {}", args.input.display()))?;
    let mut scanner =
        Scanner::with_resync_window(BufReader::new(file), args.resync_window).capture_payload(true);

    let mut track = 1;
    let (path, file) = create_track_file(&args.output_dir, track)?;
    let mut out = BufWriter::new(file);
    log::info!("starting {}", path.display());

    let mut lost = None;

    for event in &mut scanner {
        match event? {
            ScanEvent::Frame { data, .. } => {
                if let Some(data) = data {
                    out.write_all(&data)?;
                }
            }
            ScanEvent::Desync { offset } => {
                println!("desync at {offset:#x}");
            }
            ScanEvent::Resync {
                offset,
                skipped,
                data,
            } => {
                // Pad bytes belong to the tail of the running track.
                if let Some(pad) = data {
                    out.write_all(&pad)?;
                }
                out.flush()?;
                println!("resync at {offset:#x} (+{skipped:#x})");

                track += 1;
                let (path, file) = create_track_file(&args.output_dir, track)?;
                out = BufWriter::new(file);
                log::info!("starting {}", path.display());
            }
            ScanEvent::LostSync {
                offset,
                trailing,
                data,
            } => {
                // Unmatched tail bytes are still audio as far as the
                // running track is concerned; keep them.
                if let Some(tail) = data {
                    out.write_all(&tail)?;
                }
                lost = Some((offset, trailing));
            }
        }
    }

    out.flush()?;
    println!("{} frames, {track} tracks", scanner.frames());

    if let Some((offset, trailing)) = lost {
        bail!(ScanError::LostSync { offset, trailing });
    }

    Ok(())
}
