use std::fs::File;
use std::io::BufReader;

use anyhow::{Context, Result};
use log::Level;

use super::command::{Cli, SplitArgs};
use super::info::print_geometry;
use crate::input::read_first_header;
use dtscore::process::split::{Splitter, plan_segments};
use dtscore::structs::chapters::ChapterList;
use dtscore::structs::geometry::StreamGeometry;

pub fn cmd_split(args: &SplitArgs, cli: &Cli) -> Result<()> {
    log::info!(
        "Splitting {} at chapters from {}",
        args.input.display(),
        args.chapters.display()
    );

    let chapter_file = File::open(&args.chapters)
        .with_context(|| format!("cannot open {}", args.chapters.display()))?;
    let chapters = ChapterList::from_reader(BufReader::new(chapter_file))
        .with_context(|| format!("malformed chapter list {}", args.chapters.display()))?;

    // Calibrate geometry from the first header before touching any output.
    let header = read_first_header(&args.input)?;
    let geometry = StreamGeometry::from_header(&header)
        .with_context(|| format!("{} has no usable geometry", args.input.display()))?;
    print_geometry(&header, &geometry);

    let segments = plan_segments(&chapters, &geometry);

    let file = File::open(&args.input)
        .with_context(|| format!("cannot open {}", args.input.display()))?;
    let mut reader = BufReader::new(file);

    let mut splitter = Splitter::new(&args.output_dir);
    if cli.strict {
        splitter.set_fail_level(Level::Warn);
    }

    let written = splitter.split(&mut reader, &segments)?;
    println!("wrote {} tracks", written.len());

    Ok(())
}
