//! Tick-to-byte track splitting.
//!
//! Chapter ticks become frame counts through the stream geometry, frame
//! counts become byte lengths, and each byte range is copied into its own
//! exclusively created `trackNN.dts` file. Whatever follows the last
//! boundary lands in one final trailing file.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow, bail};
use log::{Level, info};

use crate::log_or_err;
use crate::structs::chapters::{ChapterList, TICK_HZ, TICK_START};
use crate::structs::geometry::StreamGeometry;
use crate::utils::errors::SplitError;

/// Byte range of one output track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackSegment {
    /// 1-based track number, also the output file number.
    pub index: usize,
    pub frames: u64,
    pub bytes: u64,
}

/// Computes per-track byte lengths from chapter boundaries.
///
/// Each boundary tick maps to an absolute frame count,
/// `round(delta_ticks * sample_rate / 45000 / samples_per_frame)` with
/// ties rounded to even; the difference to the previous boundary is the
/// track's frame length. Byte math is exact from there.
pub fn plan_segments(chapters: &ChapterList, geometry: &StreamGeometry) -> Vec<TrackSegment> {
    let mut segments = Vec::with_capacity(chapters.boundaries().len());
    let mut prev_frames = 0u64;

    for (i, &tick) in chapters.boundaries().iter().enumerate() {
        let delta = tick - TICK_START;
        let frames = (delta as f64 * geometry.sample_rate_hz as f64
            / TICK_HZ as f64
            / geometry.samples_per_frame as f64)
            .round_ties_even() as u64;

        segments.push(TrackSegment {
            index: i + 1,
            frames: frames - prev_frames,
            bytes: (frames - prev_frames) * geometry.frame_bytes as u64,
        });
        prev_frames = frames;
    }

    segments
}

/// Creates `trackNN.dts` under `dir`, refusing to overwrite.
pub fn create_track_file(dir: &Path, index: usize) -> Result<(PathBuf, File)> {
    let path = dir.join(format!("track{index:02}.dts"));
    match File::create_new(&path) {
        Ok(file) => Ok((path, file)),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            bail!(SplitError::AlreadyExists(path))
        }
        Err(e) => Err(e.into()),
    }
}

/// One output file written by a split run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackFile {
    pub path: PathBuf,
    pub bytes: u64,
}

/// Copies planned segments into per-track files.
#[derive(Debug)]
pub struct Splitter {
    out_dir: PathBuf,
    fail_level: Level,
}

impl Splitter {
    pub fn new<P: Into<PathBuf>>(out_dir: P) -> Self {
        Self {
            out_dir: out_dir.into(),
            fail_level: Level::Error,
        }
    }

    /// Sets the failure level for validation findings.
    ///
    /// - `log::Level::Error`: only fail on errors (default)
    /// - `log::Level::Warn`: fail on warnings too (strict mode)
    pub fn set_fail_level(&mut self, level: Level) {
        self.fail_level = level;
    }

    /// Copies each segment, then the remainder, into numbered files.
    ///
    /// A source that runs out mid-segment is a warning, not an error;
    /// the run moves on to the next segment. Files already written stay
    /// on disk if a later one fails. Only one output is open at a time.
    pub fn split<R: Read>(&self, input: &mut R, segments: &[TrackSegment]) -> Result<Vec<TrackFile>> {
        let mut written = Vec::with_capacity(segments.len() + 1);

        for segment in segments {
            let (path, file) = create_track_file(&self.out_dir, segment.index)?;
            let mut out = BufWriter::new(file);
            let copied = io::copy(&mut input.by_ref().take(segment.bytes), &mut out)?;
            out.flush()?;

            info!(
                "{}: {} frames, {copied} bytes",
                path.display(),
                segment.frames
            );

            if copied < segment.bytes {
                log_or_err!(
                    self,
                    Level::Warn,
                    anyhow!(SplitError::UnexpectedEof {
                        path: path.clone(),
                        missing: segment.bytes - copied,
                    })
                );
            }

            written.push(TrackFile { path, bytes: copied });
        }

        let (path, file) = create_track_file(&self.out_dir, segments.len() + 1)?;
        let mut out = BufWriter::new(file);
        let copied = io::copy(input, &mut out)?;
        out.flush()?;
        info!("{}: {copied} bytes (remainder)", path.display());
        written.push(TrackFile { path, bytes: copied });

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::utils::errors::ChapterError;

    const GEOMETRY: StreamGeometry = StreamGeometry {
        frame_bytes: 0xE00,
        samples_per_frame: 1536,
        sample_rate_hz: 48_000,
    };

    #[test]
    fn one_second_chapters_make_31_frame_tracks() {
        let chapters =
            ChapterList::from_reader("27000000\n27045000\n27090000\n".as_bytes()).unwrap();
        let segments = plan_segments(&chapters, &GEOMETRY);

        // 45000 ticks = 1 s = 31.25 frames; ties and fractions round off.
        assert_eq!(
            segments,
            vec![
                TrackSegment {
                    index: 1,
                    frames: 31,
                    bytes: 31 * 0xE00,
                },
                TrackSegment {
                    index: 2,
                    frames: 31,
                    bytes: 31 * 0xE00,
                },
            ]
        );
    }

    #[test]
    fn wrong_origin_fails_before_planning() {
        assert!(matches!(
            ChapterList::from_reader("27000001\n27045000\n".as_bytes()),
            Err(ChapterError::BadStart { .. })
        ));
    }

    #[test]
    fn split_copies_ranges_and_remainder() {
        let dir = tempfile::tempdir().unwrap();
        let input: Vec<u8> = (0..100u8).collect();
        let segments = [
            TrackSegment {
                index: 1,
                frames: 2,
                bytes: 32,
            },
            TrackSegment {
                index: 2,
                frames: 3,
                bytes: 48,
            },
        ];

        let written = Splitter::new(dir.path())
            .split(&mut Cursor::new(input.clone()), &segments)
            .unwrap();

        assert_eq!(written.len(), 3);
        assert_eq!(written[0].bytes, 32);
        assert_eq!(written[1].bytes, 48);
        assert_eq!(written[2].bytes, 20);

        assert_eq!(std::fs::read(dir.path().join("track01.dts")).unwrap(), &input[..32]);
        assert_eq!(
            std::fs::read(dir.path().join("track02.dts")).unwrap(),
            &input[32..80]
        );
        assert_eq!(
            std::fs::read(dir.path().join("track03.dts")).unwrap(),
            &input[80..]
        );
    }

    #[test]
    fn short_source_warns_and_continues() {
        let dir = tempfile::tempdir().unwrap();
        let segments = [TrackSegment {
            index: 1,
            frames: 4,
            bytes: 64,
        }];

        let written = Splitter::new(dir.path())
            .split(&mut Cursor::new(vec![0u8; 40]), &segments)
            .unwrap();

        assert_eq!(written[0].bytes, 40);
        // Trailing file still gets created, empty.
        assert_eq!(written[1].bytes, 0);
        assert!(dir.path().join("track02.dts").exists());
    }

    #[test]
    fn short_source_is_fatal_in_strict_mode() {
        let dir = tempfile::tempdir().unwrap();
        let segments = [TrackSegment {
            index: 1,
            frames: 4,
            bytes: 64,
        }];

        let mut splitter = Splitter::new(dir.path());
        splitter.set_fail_level(Level::Warn);

        let err = splitter
            .split(&mut Cursor::new(vec![0u8; 40]), &segments)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SplitError>(),
            Some(SplitError::UnexpectedEof { missing: 24, .. })
        ));
    }

    #[test]
    fn refuses_to_overwrite_existing_track() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("track01.dts"), b"keep me").unwrap();

        let segments = [TrackSegment {
            index: 1,
            frames: 1,
            bytes: 16,
        }];

        let err = Splitter::new(dir.path())
            .split(&mut Cursor::new(vec![0u8; 16]), &segments)
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<SplitError>(),
            Some(SplitError::AlreadyExists(_))
        ));
        assert_eq!(
            std::fs::read(dir.path().join("track01.dts")).unwrap(),
            b"keep me"
        );
    }
}
