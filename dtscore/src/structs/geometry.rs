//! Immutable stream geometry derived from the first frame header.

use crate::structs::header::FrameHeader;
use crate::utils::errors::HeaderError;

/// Frame geometry of a stream, calibrated once and passed by value.
///
/// Resolving the sample rate happens here, so construction is the point
/// where a reserved rate code becomes fatal for geometry-dependent
/// operations. Scanning does not need a geometry and is unaffected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamGeometry {
    /// Whole-frame size in bytes.
    pub frame_bytes: u32,
    /// PCM samples per frame.
    pub samples_per_frame: u32,
    /// Sample rate in Hz.
    pub sample_rate_hz: u32,
}

impl StreamGeometry {
    pub fn from_header(header: &FrameHeader) -> Result<Self, HeaderError> {
        Ok(Self {
            frame_bytes: header.frame_bytes(),
            samples_per_frame: header.samples_per_frame(),
            sample_rate_hz: header.sample_rate_hz()?,
        })
    }
}

#[test]
fn geometry_from_header() {
    let buf = crate::structs::header::make_header(47, 0xDFF, 13, 24);
    let header = FrameHeader::read(&buf).unwrap();
    let geometry = StreamGeometry::from_header(&header).unwrap();

    assert_eq!(geometry.frame_bytes, 0xE00);
    assert_eq!(geometry.samples_per_frame, 1536);
    assert_eq!(geometry.sample_rate_hz, 48_000);
}

#[test]
fn geometry_requires_known_sample_rate() {
    let buf = crate::structs::header::make_header(47, 0xDFF, 5, 24);
    let header = FrameHeader::read(&buf).unwrap();

    assert!(matches!(
        StreamGeometry::from_header(&header),
        Err(HeaderError::InvalidSampleRate(5))
    ));
}
