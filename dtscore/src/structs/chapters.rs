//! Chapter tick lists.
//!
//! Blu-ray playlists mark chapter starts on a 45 kHz tick clock. A tick
//! file carries one decimal tick per line; the first value is the fixed
//! stream origin and marks no boundary of its own.

use std::io::BufRead;

use crate::utils::errors::ChapterError;

/// Tick clock frequency in Hz.
pub const TICK_HZ: u32 = 45_000;

/// Tick value of the stream origin, always the first list entry.
pub const TICK_START: u64 = 27_000_000;

/// Validated chapter boundaries, origin entry removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterList {
    boundaries: Vec<u64>,
}

impl ChapterList {
    /// Parses a newline-delimited decimal tick list.
    ///
    /// The list must be non-empty, open with [`TICK_START`] and never go
    /// backwards. Diagnostics carry the offending 1-based line.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, ChapterError> {
        let mut ticks = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let text = line.trim();
            let tick: u64 = text.parse().map_err(|_| ChapterError::BadTick {
                line: index + 1,
                text: text.to_string(),
            })?;

            if let Some(&previous) = ticks.last() {
                if tick < previous {
                    return Err(ChapterError::BadOrder {
                        line: index + 1,
                        found: tick,
                        previous,
                    });
                }
            }

            ticks.push(tick);
        }

        match ticks.first() {
            None => Err(ChapterError::Empty),
            Some(&first) if first != TICK_START => Err(ChapterError::BadStart {
                expected: TICK_START,
                found: first,
            }),
            Some(_) => {
                ticks.remove(0);
                Ok(Self { boundaries: ticks })
            }
        }
    }

    /// Absolute boundary ticks, in order.
    pub fn boundaries(&self) -> &[u64] {
        &self.boundaries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_boundaries() {
        let list = ChapterList::from_reader("27000000\n27045000\n27090000\n".as_bytes()).unwrap();
        assert_eq!(list.boundaries(), &[27_045_000, 27_090_000]);
    }

    #[test]
    fn reject_wrong_origin() {
        let err = ChapterList::from_reader("27000001\n27045000\n".as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            ChapterError::BadStart {
                found: 27_000_001,
                ..
            }
        ));
    }

    #[test]
    fn reject_garbage_line() {
        let err = ChapterList::from_reader("27000000\nnope\n".as_bytes()).unwrap_err();
        match err {
            ChapterError::BadTick { line, text } => {
                assert_eq!(line, 2);
                assert_eq!(text, "nope");
            }
            other => panic!("expected BadTick, got {other:?}"),
        }
    }

    #[test]
    fn reject_empty_list() {
        assert!(matches!(
            ChapterList::from_reader("".as_bytes()),
            Err(ChapterError::Empty)
        ));
    }

    #[test]
    fn reject_backwards_ticks() {
        let err = ChapterList::from_reader("27000000\n27090000\n27045000\n".as_bytes()).unwrap_err();
        assert!(matches!(err, ChapterError::BadOrder { line: 3, .. }));
    }
}
