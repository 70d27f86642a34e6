//! Frame-by-frame sync scanning with bounded resync.
//!
//! The scanner walks a seekable stream one frame at a time, peeking ten
//! bytes at the cursor without consuming them. A decodable header advances
//! the cursor by the frame's own size field; a marker mismatch opens a
//! bounded lookahead search for the next sync marker. The cursor only
//! moves forward and no byte is reprocessed outside that lookahead.

use std::io::{Read, Seek, SeekFrom};

use log::{debug, warn};

use crate::process::read_full;
use crate::structs::header::{FrameHeader, HEADER_BYTES, SYNC_MARKER};
use crate::utils::errors::ScanError;

/// Default resync lookahead in bytes.
pub const DEFAULT_RESYNC_WINDOW: usize = 4096;

/// Marker alignment state of a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// The cursor sits on a sync marker.
    InSync,
    /// Marker mismatch; a resync search is pending.
    Desync,
    /// Resync search exhausted. Terminal.
    Lost,
}

/// One step of a scan.
///
/// Payload fields are populated only when the scanner runs in capture
/// mode; diagnostic scans leave them `None` and seek past frame bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// A decodable frame at `offset`, sized by its own header.
    Frame {
        offset: u64,
        header: FrameHeader,
        data: Option<Vec<u8>>,
    },
    /// Marker mismatch at `offset`.
    Desync { offset: u64 },
    /// Marker found again at `offset` after skipping `skipped` bytes.
    Resync {
        offset: u64,
        skipped: u64,
        data: Option<Vec<u8>>,
    },
    /// No marker within the lookahead; `trailing` bytes remain
    /// unrecovered from `offset` to the end of the stream. Terminal.
    LostSync {
        offset: u64,
        trailing: u64,
        data: Option<Vec<u8>>,
    },
}

/// Sync scanner over a seekable byte stream.
///
/// Yields [`ScanEvent`]s as an iterator; iteration ends when fewer than
/// ten bytes remain or after a [`ScanEvent::LostSync`]. The scan never
/// halts on a decodable header, whatever its rate code says.
#[derive(Debug)]
pub struct Scanner<R> {
    reader: R,
    pos: u64,
    state: SyncState,
    resync_window: usize,
    capture: bool,
    frames: u64,
    done: bool,
}

impl<R: Read + Seek> Scanner<R> {
    pub fn new(reader: R) -> Self {
        Self::with_resync_window(reader, DEFAULT_RESYNC_WINDOW)
    }

    pub fn with_resync_window(reader: R, resync_window: usize) -> Self {
        Self {
            reader,
            pos: 0,
            state: SyncState::InSync,
            resync_window,
            capture: false,
            frames: 0,
            done: false,
        }
    }

    /// Retain frame and skipped bytes in events instead of seeking past
    /// them. Used by boundary splitting; diagnostic scans leave this off.
    pub fn capture_payload(mut self, capture: bool) -> Self {
        self.capture = capture;
        self
    }

    /// Frames successfully walked so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Current cursor offset from the start of the stream.
    pub fn position(&self) -> u64 {
        self.pos
    }

    fn peek_header(&mut self) -> Result<Option<[u8; HEADER_BYTES]>, ScanError> {
        self.reader.seek(SeekFrom::Start(self.pos))?;

        let mut buf = [0u8; HEADER_BYTES];
        let got = read_full(&mut self.reader, &mut buf)?;
        if got < HEADER_BYTES {
            return Ok(None);
        }

        Ok(Some(buf))
    }

    fn step(&mut self) -> Result<Option<ScanEvent>, ScanError> {
        let Some(buf) = self.peek_header()? else {
            return Ok(None);
        };

        let header = match FrameHeader::read(&buf) {
            Ok(header) => header,
            Err(_) => {
                self.state = SyncState::Desync;
                debug!("desync at {:#x}", self.pos);
                return Ok(Some(ScanEvent::Desync { offset: self.pos }));
            }
        };

        let size = header.frame_bytes() as u64;
        let data = if self.capture {
            self.reader.seek(SeekFrom::Start(self.pos))?;
            let mut body = Vec::with_capacity(size as usize);
            (&mut self.reader).take(size).read_to_end(&mut body)?;
            Some(body)
        } else {
            None
        };

        if !header.is_nominal_size() {
            debug!("fsize={:#x} at {:#x}", header.frame_bytes(), self.pos);
        }

        let offset = self.pos;
        self.pos += size;
        self.frames += 1;

        Ok(Some(ScanEvent::Frame {
            offset,
            header,
            data,
        }))
    }

    fn resync(&mut self) -> Result<ScanEvent, ScanError> {
        self.reader.seek(SeekFrom::Start(self.pos))?;

        let mut window = vec![0u8; self.resync_window];
        let got = read_full(&mut self.reader, &mut window)?;
        window.truncate(got);

        if let Some(i) = window.windows(SYNC_MARKER.len()).position(|w| w == SYNC_MARKER) {
            window.truncate(i);
            self.pos += i as u64;
            self.state = SyncState::InSync;
            debug!("resync at {:#x} (+{:#x})", self.pos, i);

            return Ok(ScanEvent::Resync {
                offset: self.pos,
                skipped: i as u64,
                data: self.capture.then_some(window),
            });
        }

        let end = self.reader.seek(SeekFrom::End(0))?;
        let trailing = end - self.pos;
        let data = if self.capture {
            self.reader.seek(SeekFrom::Start(self.pos))?;
            let mut tail = Vec::with_capacity(trailing as usize);
            self.reader.read_to_end(&mut tail)?;
            Some(tail)
        } else {
            None
        };

        self.state = SyncState::Lost;
        self.done = true;
        warn!("lost sync at {:#x}, {trailing} bytes unrecovered", self.pos);

        Ok(ScanEvent::LostSync {
            offset: self.pos,
            trailing,
            data,
        })
    }
}

impl<R: Read + Seek> Iterator for Scanner<R> {
    type Item = Result<ScanEvent, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if self.state == SyncState::Desync {
            let item = self.resync();
            if item.is_err() {
                self.done = true;
            }
            return Some(item);
        }

        match self.step() {
            Ok(Some(event)) => Some(Ok(event)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::structs::header::{NOMINAL_FRAME_BYTES, make_header};

    fn make_frame(size: u32) -> Vec<u8> {
        let mut frame = make_header(47, (size - 1) as u16, 13, 24).to_vec();
        frame.resize(size as usize, 0);
        frame
    }

    #[test]
    fn clean_stream_counts_frames() {
        let mut stream = Vec::new();
        for _ in 0..10 {
            stream.extend_from_slice(&make_frame(64));
        }

        let mut scanner = Scanner::new(Cursor::new(stream));
        let events: Vec<_> = (&mut scanner).collect::<Result<_, _>>().unwrap();

        assert_eq!(scanner.frames(), 10);
        assert_eq!(scanner.state(), SyncState::InSync);
        assert!(events.iter().all(|e| matches!(e, ScanEvent::Frame { .. })));
    }

    #[test]
    fn zero_run_yields_one_desync_and_recovers() {
        let mut stream = Vec::new();
        stream.extend_from_slice(&make_frame(64));
        stream.extend_from_slice(&make_frame(64));
        stream.extend_from_slice(&[0u8; 4]);
        stream.extend_from_slice(&make_frame(64));
        stream.extend_from_slice(&make_frame(64));

        let mut scanner = Scanner::new(Cursor::new(stream));
        let events: Vec<_> = (&mut scanner).collect::<Result<_, _>>().unwrap();

        assert_eq!(scanner.frames(), 4);
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, ScanEvent::Desync { .. }))
                .count(),
            1
        );
        assert!(events.contains(&ScanEvent::Desync { offset: 128 }));
        assert!(events.contains(&ScanEvent::Resync {
            offset: 132,
            skipped: 4,
            data: None,
        }));
    }

    #[test]
    fn missing_marker_loses_sync() {
        let mut stream = Vec::new();
        stream.extend_from_slice(&make_frame(64));
        stream.extend_from_slice(&[0x55u8; 32]);

        let mut scanner = Scanner::new(Cursor::new(stream));
        let events: Vec<_> = (&mut scanner).collect::<Result<_, _>>().unwrap();

        assert_eq!(scanner.state(), SyncState::Lost);
        assert!(events.contains(&ScanEvent::LostSync {
            offset: 64,
            trailing: 32,
            data: None,
        }));
    }

    #[test]
    fn resync_search_is_bounded() {
        let mut stream = Vec::new();
        stream.extend_from_slice(&make_frame(64));
        stream.extend_from_slice(&vec![0u8; 5000]);
        stream.extend_from_slice(&make_frame(64));

        // The marker sits past the default window.
        let mut scanner = Scanner::new(Cursor::new(stream.clone()));
        let last = (&mut scanner).last().unwrap().unwrap();
        assert!(matches!(last, ScanEvent::LostSync { offset: 64, .. }));

        // A wider window recovers.
        let mut scanner = Scanner::with_resync_window(Cursor::new(stream), 8192);
        let events: Vec<_> = (&mut scanner).collect::<Result<_, _>>().unwrap();
        assert_eq!(scanner.frames(), 2);
        assert!(events.contains(&ScanEvent::Resync {
            offset: 5064,
            skipped: 5000,
            data: None,
        }));
    }

    #[test]
    fn off_size_frame_is_flagged_not_fatal() {
        let mut stream = Vec::new();
        for i in 0..100u32 {
            let size = if i == 50 {
                NOMINAL_FRAME_BYTES + 1
            } else {
                NOMINAL_FRAME_BYTES
            };
            stream.extend_from_slice(&make_frame(size));
        }

        let mut scanner = Scanner::new(Cursor::new(stream));
        let events: Vec<_> = (&mut scanner).collect::<Result<_, _>>().unwrap();

        assert_eq!(scanner.frames(), 100);
        assert!(events.iter().all(|e| matches!(e, ScanEvent::Frame { .. })));

        let odd: Vec<_> = events
            .iter()
            .enumerate()
            .filter_map(|(i, e)| match e {
                ScanEvent::Frame { offset, header, .. } if !header.is_nominal_size() => {
                    Some((i, *offset, header.frame_bytes()))
                }
                _ => None,
            })
            .collect();
        assert_eq!(odd, vec![(50, 50 * NOMINAL_FRAME_BYTES as u64, 0xE01)]);
    }

    #[test]
    fn capture_mode_keeps_bytes() {
        let frame = make_frame(64);
        let mut stream = Vec::new();
        stream.extend_from_slice(&frame);
        stream.extend_from_slice(&[0u8; 6]);
        stream.extend_from_slice(&frame);
        stream.extend_from_slice(&[0x55u8; 16]);

        let scanner = Scanner::new(Cursor::new(stream)).capture_payload(true);
        let events: Vec<_> = scanner.collect::<Result<_, _>>().unwrap();

        assert_eq!(
            events,
            vec![
                ScanEvent::Frame {
                    offset: 0,
                    header: FrameHeader::read(frame[..10].try_into().unwrap()).unwrap(),
                    data: Some(frame.clone()),
                },
                ScanEvent::Desync { offset: 64 },
                ScanEvent::Resync {
                    offset: 70,
                    skipped: 6,
                    data: Some(vec![0u8; 6]),
                },
                ScanEvent::Frame {
                    offset: 70,
                    header: FrameHeader::read(frame[..10].try_into().unwrap()).unwrap(),
                    data: Some(frame.clone()),
                },
                ScanEvent::Desync { offset: 134 },
                ScanEvent::LostSync {
                    offset: 134,
                    trailing: 16,
                    data: Some(vec![0x55u8; 16]),
                },
            ]
        );
    }
}
