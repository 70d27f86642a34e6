//! DTS core frame header decoding.
//!
//! A core frame opens with the 4-byte marker `0x7FFE8001` followed by a
//! big-endian bit-packed header. Only the fixed fields needed to size a
//! frame and calibrate stream geometry are decoded here; payload and
//! checksum are never inspected.

use std::fmt;

use anyhow::{Result, bail};

use crate::utils::bitstream_io::BsIoSliceReader;
use crate::utils::errors::HeaderError;

/// 4-byte marker opening every DTS core frame.
pub const SYNC_MARKER: [u8; 4] = [0x7F, 0xFE, 0x80, 0x01];

/// Bytes required to decode the fixed header fields.
pub const HEADER_BYTES: usize = 10;

/// Frame size of the common 48 kHz / 1536-sample configuration.
///
/// Other sizes are legal; they are surfaced as diagnostics, not errors.
pub const NOMINAL_FRAME_BYTES: u32 = 0xE00;

/// Bit rates addressed by the 5-bit rate code. Codes 29-31 are the
/// open / variable / lossless escape values.
const BIT_RATES_BPS: [u32; 29] = [
    32_000, 56_000, 64_000, 96_000, 112_000, 128_000, 192_000, 224_000, 256_000, 320_000, 384_000,
    448_000, 512_000, 576_000, 640_000, 768_000, 896_000, 1_024_000, 1_152_000, 1_280_000,
    1_344_000, 1_408_000, 1_411_200, 1_472_000, 1_536_000, 1_920_000, 2_048_000, 3_072_000,
    3_840_000,
];

/// Fixed fields of a DTS core frame header.
///
/// Decoding fails only on a marker mismatch. The sample rate code is kept
/// raw so that a scan can keep walking frames whose code is reserved;
/// [`FrameHeader::sample_rate_hz`] resolves it on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Normal frame (true) or termination frame.
    pub frame_type: bool,
    /// Deficit sample count, 5 bits.
    pub deficit_samples: u8,
    /// Whether a CRC field is present in the frame.
    pub crc_present: bool,
    /// PCM sample blocks minus one, 7 bits.
    pub nblks: u8,
    /// Frame byte size minus one, 14 bits.
    pub fsize: u16,
    /// Channel arrangement, 6 bits.
    pub amode: u8,
    /// Sample rate code, 4 bits.
    pub sample_rate_code: u8,
    /// Bit rate code, 5 bits.
    pub bit_rate_code: u8,
}

impl FrameHeader {
    /// Decodes the fixed header fields from the first 10 bytes of a frame.
    pub fn read(buf: &[u8; HEADER_BYTES]) -> Result<Self> {
        if buf[..4] != SYNC_MARKER {
            let marker = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]);
            bail!(HeaderError::InvalidSync(marker));
        }

        let mut reader = BsIoSliceReader::from_slice(&buf[4..]);

        Ok(Self {
            frame_type: reader.get()?,
            deficit_samples: reader.get_n(5)?,
            crc_present: reader.get()?,
            nblks: reader.get_n(7)?,
            fsize: reader.get_n(14)?,
            amode: reader.get_n(6)?,
            sample_rate_code: reader.get_n(4)?,
            bit_rate_code: reader.get_n(5)?,
        })
    }

    /// Whole-frame size in bytes, including the header.
    pub fn frame_bytes(&self) -> u32 {
        self.fsize as u32 + 1
    }

    /// PCM samples carried by one frame.
    pub fn samples_per_frame(&self) -> u32 {
        32 * (self.nblks as u32 + 1)
    }

    /// Resolves the sample rate code to a frequency in Hz.
    pub fn sample_rate_hz(&self) -> Result<u32, HeaderError> {
        match self.sample_rate_code {
            1 => Ok(8_000),
            2 => Ok(16_000),
            3 => Ok(32_000),
            6 => Ok(11_025),
            7 => Ok(22_050),
            8 => Ok(44_100),
            11 => Ok(12_000),
            12 => Ok(24_000),
            13 => Ok(48_000),
            code => Err(HeaderError::InvalidSampleRate(code)),
        }
    }

    /// Bit rate addressed by the 5-bit rate code.
    pub fn bit_rate(&self) -> BitRate {
        match self.bit_rate_code {
            code @ 0..=28 => BitRate::Bps(BIT_RATES_BPS[code as usize]),
            29 => BitRate::Open,
            30 => BitRate::Variable,
            _ => BitRate::Lossless,
        }
    }

    /// True for the common 48 kHz / 1536-sample frame size.
    pub fn is_nominal_size(&self) -> bool {
        self.frame_bytes() == NOMINAL_FRAME_BYTES
    }
}

/// Bit rate of a stream, either a fixed rate or one of the escape labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitRate {
    Bps(u32),
    Open,
    Variable,
    Lossless,
}

impl fmt::Display for BitRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitRate::Bps(bps) => write!(f, "{bps}"),
            BitRate::Open => write!(f, "open"),
            BitRate::Variable => write!(f, "variable"),
            BitRate::Lossless => write!(f, "lossless"),
        }
    }
}

#[cfg(test)]
pub(crate) fn make_header(nblks: u8, fsize: u16, sfreq: u8, rate: u8) -> [u8; HEADER_BYTES] {
    let mut x: u64 = 0;
    x |= (nblks as u64) << 34;
    x |= (fsize as u64) << 20;
    x |= (sfreq as u64) << 10;
    x |= (rate as u64) << 5;

    let mut buf = [0u8; HEADER_BYTES];
    buf[..4].copy_from_slice(&SYNC_MARKER);
    buf[4..].copy_from_slice(&x.to_be_bytes()[2..]);
    buf
}

#[test]
fn decode_nominal_header() {
    // 48 kHz, 1536 samples (nblks 47), frame size 0xE00, 1536 kbps
    let buf = make_header(47, 0xDFF, 13, 24);
    let header = FrameHeader::read(&buf).unwrap();

    assert_eq!(header.frame_bytes(), 0xE00);
    assert_eq!(header.samples_per_frame(), 1536);
    assert_eq!(header.sample_rate_hz().unwrap(), 48_000);
    assert_eq!(header.bit_rate(), BitRate::Bps(1_536_000));
    assert!(header.is_nominal_size());
}

#[test]
fn reject_bad_marker() {
    let mut buf = make_header(47, 0xDFF, 13, 24);
    buf[0] = 0x00;

    let err = FrameHeader::read(&buf).unwrap_err();
    match err.downcast_ref::<HeaderError>() {
        Some(HeaderError::InvalidSync(marker)) => assert_eq!(*marker, 0x00FE8001),
        other => panic!("expected InvalidSync, got {other:?}"),
    }
}

#[test]
fn reserved_sample_rate_is_deferred() {
    // Code 0 is reserved; the header still decodes so a scan can size it.
    let buf = make_header(47, 0xDFF, 0, 24);
    let header = FrameHeader::read(&buf).unwrap();

    assert_eq!(header.frame_bytes(), 0xE00);
    assert!(matches!(
        header.sample_rate_hz(),
        Err(HeaderError::InvalidSampleRate(0))
    ));
}

#[test]
fn bit_rate_escape_codes() {
    for (code, expected) in [(29, "open"), (30, "variable"), (31, "lossless")] {
        let buf = make_header(47, 0xDFF, 13, code);
        let header = FrameHeader::read(&buf).unwrap();
        assert_eq!(header.bit_rate().to_string(), expected);
    }
}
