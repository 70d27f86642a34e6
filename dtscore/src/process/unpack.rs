//! 14-bit packed transport ("dtswav") to byte-aligned DTS conversion.
//!
//! The transport stores 8 signed samples per 16-byte block, each in a
//! 16-bit little-endian slot of which only the low 14 bits carry data.
//! Unpacking concatenates those 14-bit fields most-significant-bit first,
//! emitting exactly 14 bytes per block with no inter-sample padding.
//! Conversion is streaming and holds one block at a time.

use std::io::{Read, Write};

use anyhow::{Result, anyhow, bail};
use bitstream_io::{BigEndian, BitWrite, BitWriter};
use log::Level;

use crate::log_or_err;
use crate::process::read_full;
use crate::utils::errors::UnpackError;

/// Input block size in bytes.
pub const BLOCK_BYTES: usize = 16;

/// Output bytes per block: 8 samples of 14 bits.
pub const PACKED_BLOCK_BYTES: usize = 14;

const SAMPLES_PER_BLOCK: usize = 8;
const SAMPLE_MIN: i16 = -0x2000;
const SAMPLE_MAX: i16 = 0x1FFF;

/// Streaming 14-bit unpacker.
#[derive(Debug)]
pub struct Unpacker {
    fail_level: Level,
}

impl Default for Unpacker {
    fn default() -> Self {
        Self {
            fail_level: Level::Error,
        }
    }
}

/// Counters from one conversion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnpackReport {
    pub blocks: u64,
    pub bytes_out: u64,
    /// Bytes of a trailing partial block that were dropped.
    pub trailing_bytes: usize,
}

impl Unpacker {
    /// Sets the failure level for validation findings.
    ///
    /// - `log::Level::Error`: only fail on errors (default)
    /// - `log::Level::Warn`: fail on warnings too (strict mode)
    pub fn set_fail_level(&mut self, level: Level) {
        self.fail_level = level;
    }

    /// Converts packed input to a byte-aligned stream.
    ///
    /// An out-of-range slot aborts immediately; the bad block is never
    /// partially written. A trailing partial block is dropped, which
    /// loses up to 15 bytes of input; the report counts them and the
    /// drop is surfaced as a warning.
    pub fn convert<R: Read, W: Write>(&self, input: &mut R, output: &mut W) -> Result<UnpackReport> {
        let mut writer = BitWriter::endian(output, BigEndian);
        let mut block = [0u8; BLOCK_BYTES];
        let mut samples = [0i16; SAMPLES_PER_BLOCK];
        let mut offset = 0u64;
        let mut blocks = 0u64;
        let mut trailing_bytes = 0;

        loop {
            let got = read_full(input, &mut block)?;
            if got < BLOCK_BYTES {
                if got > 0 {
                    trailing_bytes = got;
                    log_or_err!(
                        self,
                        Level::Warn,
                        anyhow!(UnpackError::TrailingBlock { bytes: got })
                    );
                }
                break;
            }

            // Validate the whole block before any of it is written.
            for (i, slot) in block.chunks_exact(2).enumerate() {
                let value = i16::from_le_bytes([slot[0], slot[1]]);
                if !(SAMPLE_MIN..=SAMPLE_MAX).contains(&value) {
                    bail!(UnpackError::OutOfRangeSample {
                        value,
                        offset: offset + 2 * i as u64,
                    });
                }
                samples[i] = value;
            }

            for value in samples {
                writer.write_var(14, (value as u16) & 0x3FFF)?;
            }

            offset += BLOCK_BYTES as u64;
            blocks += 1;
        }

        Ok(UnpackReport {
            blocks,
            bytes_out: blocks * PACKED_BLOCK_BYTES as u64,
            trailing_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pack_input(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    /// Reference packing through whole-number accumulation.
    fn reference_block(samples: &[i16; 8]) -> Vec<u8> {
        let mut bits = 0u128;
        for &s in samples {
            bits = (bits << 14) | (s as u16 & 0x3FFF) as u128;
        }
        bits.to_be_bytes()[2..].to_vec()
    }

    #[test]
    fn packs_block_msb_first() {
        let samples = [-0x2000, 0x1FFF, 0, 1, -1, 0x1000, -0x1000, 0x123];
        let mut output = Vec::new();

        let report = Unpacker::default()
            .convert(&mut pack_input(&samples).as_slice(), &mut output)
            .unwrap();

        assert_eq!(report.blocks, 1);
        assert_eq!(report.bytes_out, 14);
        assert_eq!(output, reference_block(&samples));
    }

    #[test]
    fn matches_reference_over_many_blocks() {
        let mut samples = Vec::new();
        for i in 0..64i32 {
            samples.push(((i * 37 + 123) % 0x2000 - 0x1000) as i16);
        }

        let mut output = Vec::new();
        let report = Unpacker::default()
            .convert(&mut pack_input(&samples).as_slice(), &mut output)
            .unwrap();
        assert_eq!(report.blocks, 8);

        let expected: Vec<u8> = samples
            .chunks_exact(8)
            .flat_map(|c| reference_block(c.try_into().unwrap()))
            .collect();
        assert_eq!(output, expected);
    }

    #[test]
    fn out_of_range_aborts_without_partial_block() {
        let mut samples = vec![0i16; 8];
        samples.extend_from_slice(&[0, 0, 0x2000, 0, 0, 0, 0, 0]);

        let mut output = Vec::new();
        let err = Unpacker::default()
            .convert(&mut pack_input(&samples).as_slice(), &mut output)
            .unwrap_err();

        match err.downcast_ref::<UnpackError>() {
            Some(UnpackError::OutOfRangeSample { value, offset }) => {
                assert_eq!(*value, 0x2000);
                assert_eq!(*offset, 20);
            }
            other => panic!("expected OutOfRangeSample, got {other:?}"),
        }
        // Only the first, valid block reached the output.
        assert_eq!(output.len(), 14);
    }

    #[test]
    fn negative_overflow_rejected() {
        let samples = [-0x2001i16, 0, 0, 0, 0, 0, 0, 0];
        let mut output = Vec::new();

        let err = Unpacker::default()
            .convert(&mut pack_input(&samples).as_slice(), &mut output)
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<UnpackError>(),
            Some(UnpackError::OutOfRangeSample {
                value: -0x2001,
                offset: 0,
            })
        ));
        assert!(output.is_empty());
    }

    #[test]
    fn trailing_partial_block_is_dropped() {
        let samples = [1i16, 2, 3, 4, 5, 6, 7, 8];
        let mut input = pack_input(&samples);
        input.extend_from_slice(&[0xAA; 5]);

        let mut output = Vec::new();
        let report = Unpacker::default()
            .convert(&mut input.as_slice(), &mut output)
            .unwrap();

        assert_eq!(report.blocks, 1);
        assert_eq!(report.trailing_bytes, 5);
        assert_eq!(output.len(), 14);
    }

    #[test]
    fn strict_mode_fails_on_trailing_block() {
        let mut input = pack_input(&[1i16, 2, 3, 4, 5, 6, 7, 8]);
        input.push(0xAA);

        let mut unpacker = Unpacker::default();
        unpacker.set_fail_level(Level::Warn);

        let err = unpacker
            .convert(&mut input.as_slice(), &mut Vec::new())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<UnpackError>(),
            Some(UnpackError::TrailingBlock { bytes: 1 })
        ));
    }
}
