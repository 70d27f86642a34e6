use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};

use dtscore::structs::header::{FrameHeader, HEADER_BYTES};

/// Unified input reader that handles both file and pipe input with buffered reading
pub struct InputReader {
    reader: Box<dyn Read>,
    is_pipe: bool,
}

impl InputReader {
    /// Create a new InputReader from a path
    /// Use "-" for stdin pipe input
    pub fn new<P: AsRef<Path>>(input_path: P) -> Result<Self> {
        let path = input_path.as_ref();
        let is_pipe = path.to_string_lossy() == "-";

        let reader: Box<dyn Read> = if is_pipe {
            Box::new(io::stdin().lock())
        } else {
            let file =
                File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
            Box::new(BufReader::new(file))
        };

        Ok(Self { reader, is_pipe })
    }

    /// Check if this is pipe input
    pub fn is_pipe(&self) -> bool {
        self.is_pipe
    }
}

impl Read for InputReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

/// Decodes the first frame header of a stream file.
pub fn read_first_header(path: &Path) -> Result<FrameHeader> {
    let mut file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;

    let mut buf = [0u8; HEADER_BYTES];
    file.read_exact(&mut buf)
        .with_context(|| format!("{} is too short for a frame header", path.display()))?;

    let header = FrameHeader::read(&buf)
        .with_context(|| format!("{} is not a DTS stream", path.display()))?;
    Ok(header)
}
