use std::io::{self, Read};

/// Frame-by-frame sync scanning with bounded resync.
///
/// Provides the [`Scanner`](scan::Scanner) for walking a stream and
/// yielding [`ScanEvent`](scan::ScanEvent)s for frames, desyncs and
/// recoveries.
pub mod scan;

/// Track splitting at chapter boundaries.
///
/// Provides [`plan_segments`](split::plan_segments) and the
/// [`Splitter`](split::Splitter) for copying byte ranges into per-track
/// files.
pub mod split;

/// 14-bit packed transport conversion.
///
/// Provides the [`Unpacker`](unpack::Unpacker) for reassembling a
/// byte-aligned stream from 14-bit-packed input.
pub mod unpack;

/// Reads until `buf` is full or the source is exhausted.
///
/// Returns the number of bytes read; anything short of `buf.len()`
/// means end of input.
pub(crate) fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;

    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(filled)
}
