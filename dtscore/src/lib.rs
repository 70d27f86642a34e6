//! Parser and surgery toolkit for DTS core elementary streams.
//!
//! ## Technical Overview
//!
//! A DTS core stream is a sequence of self-sizing frames, each opened by
//! the 4-byte marker `0x7FFE8001` and a fixed header carrying the frame
//! byte length, block count and rate codes. Nothing here decodes audio;
//! the crate reads exactly the header fields needed to walk, measure and
//! cut streams.
//!
//! ### Processing Stages
//!
//! 1. Reassemble a byte-aligned stream from 14-bit-packed transport input
//!    using [`process::unpack::Unpacker`] (when the source is a dtswav
//!    capture).
//! 2. Walk frames and diagnose sync loss with [`process::scan::Scanner`].
//! 3. Cut the stream into tracks with [`process::split::Splitter`], at
//!    byte offsets planned from chapter ticks and the stream geometry.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! use dtscore::process::scan::{ScanEvent, Scanner};
//!
//! let file = File::open("audio.dts")?;
//! let mut scanner = Scanner::new(BufReader::new(file));
//!
//! for event in &mut scanner {
//!     match event? {
//!         ScanEvent::Frame { .. } => {}
//!         ScanEvent::Desync { offset } => println!("desync at {offset:#x}"),
//!         ScanEvent::Resync { offset, skipped, .. } => {
//!             println!("resync at {offset:#x} (+{skipped:#x})")
//!         }
//!         ScanEvent::LostSync { offset, trailing, .. } => {
//!             println!("lost sync at {offset:#x}, {trailing} bytes unrecovered")
//!         }
//!     }
//! }
//! println!("{} frames", scanner.frames());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Processing stages for stream surgery.
///
/// 1. **Scanning** ([`process::scan`]): frame walking and sync diagnosis.
/// 2. **Unpacking** ([`process::unpack`]): 14-bit transport reassembly.
/// 3. **Splitting** ([`process::split`]): per-track byte-range copies.
pub mod process;

/// Data structures describing a stream.
///
/// - **Frame headers** ([`structs::header`]): fixed-field decoding
/// - **Geometry** ([`structs::geometry`]): calibrated frame dimensions
/// - **Chapters** ([`structs::chapters`]): boundary tick lists
pub mod structs;

/// Supporting infrastructure.
///
/// - **Bitstream I/O** ([`utils::bitstream_io`]): bit-level reading
/// - **Error Handling** ([`utils::errors`]): error types
pub mod utils;
