use anyhow::{Context, Result};

use super::command::InfoArgs;
use crate::input::read_first_header;
use dtscore::structs::geometry::StreamGeometry;
use dtscore::structs::header::FrameHeader;

pub fn cmd_info(args: &InfoArgs) -> Result<()> {
    log::info!("Reading stream parameters: {}", args.input.display());

    let header = read_first_header(&args.input)?;
    let geometry = StreamGeometry::from_header(&header)
        .with_context(|| format!("{} has no usable geometry", args.input.display()))?;

    print_geometry(&header, &geometry);

    Ok(())
}

pub fn print_geometry(header: &FrameHeader, geometry: &StreamGeometry) {
    println!("bitrate = {}", header.bit_rate());
    println!("sample rate = {}", geometry.sample_rate_hz);
    println!("frame size = {:#x}", geometry.frame_bytes);
    println!("frame samples = {:#x}", geometry.samples_per_frame);
}
