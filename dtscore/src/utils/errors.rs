#[macro_export]
macro_rules! log_or_err {
    ($state:expr, $level:expr, $err:expr $(,)?) => {{
        if $level <= $state.fail_level {
            return Err($err);
        } else {
            match $level {
                ::log::Level::Error => ::log::error!("{}", $err),
                ::log::Level::Warn => ::log::warn!("{}", $err),
                ::log::Level::Info => ::log::info!("{}", $err),
                ::log::Level::Debug => ::log::debug!("{}", $err),
                ::log::Level::Trace => ::log::trace!("{}", $err),
            }
        }
    }};
}

#[derive(thiserror::Error, Debug)]
pub enum HeaderError {
    #[error("invalid sync marker, read {0:#010X}, expected 0x7FFE8001")]
    InvalidSync(u32),

    #[error("invalid sample rate code {0:#X}")]
    InvalidSampleRate(u8),
}

#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    #[error("lost sync at {offset:#x}, {trailing} trailing bytes unrecovered")]
    LostSync { offset: u64, trailing: u64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum UnpackError {
    #[error("sample {value:#x} at input offset {offset:#x} outside [-0x2000, 0x1fff]")]
    OutOfRangeSample { value: i16, offset: u64 },

    #[error("trailing {bytes} bytes do not form a whole 16-byte block, dropped")]
    TrailingBlock { bytes: usize },
}

#[derive(thiserror::Error, Debug)]
pub enum ChapterError {
    #[error("chapter list is empty")]
    Empty,

    #[error("line {line}: invalid tick value {text:?}")]
    BadTick { line: usize, text: String },

    #[error("first tick must be the stream origin {expected}, read {found}")]
    BadStart { expected: u64, found: u64 },

    #[error("line {line}: tick {found} goes backwards (previous {previous})")]
    BadOrder {
        line: usize,
        found: u64,
        previous: u64,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum SplitError {
    #[error("output file {} already exists", .0.display())]
    AlreadyExists(std::path::PathBuf),

    #[error("unexpected eof in {}, expected {missing} more bytes", .path.display())]
    UnexpectedEof {
        path: std::path::PathBuf,
        missing: u64,
    },
}
