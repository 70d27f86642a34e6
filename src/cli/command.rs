use std::path::PathBuf;

use clap::{Args, Parser as ClapParser, Subcommand, ValueEnum};

use dtscore::process::scan::DEFAULT_RESYNC_WINDOW;

#[derive(Debug, ClapParser)]
#[command(
    name       = env!("CARGO_PKG_NAME"),
    version    = env!("CARGO_PKG_VERSION"),
    about      = "Tools for inspecting and splitting DTS core elementary streams",
    long_about = None,
)]
pub struct Cli {
    /// Set the log level
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub loglevel: LogLevel,

    /// Treat warnings as fatal errors (fail on first warning).
    #[arg(long, global = true)]
    pub strict: bool,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Show progress bars during operations.
    #[arg(long, global = true)]
    pub progress: bool,

    /// Choose an operation to perform.
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print header-derived stream parameters
    Info(InfoArgs),

    /// Walk the stream frame by frame and diagnose sync loss
    SyncScan(SyncScanArgs),

    /// Convert 14-bit-packed (dtswav) input to a plain DTS stream
    Unpack14(Unpack14Args),

    /// Split a stream into tracks at chapter-tick boundaries
    Split(SplitArgs),

    /// Split a stream into tracks at its desync boundaries
    ChunkSplit(ChunkSplitArgs),
}

#[derive(Debug, Args)]
pub struct InfoArgs {
    /// Input DTS bitstream.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,
}

#[derive(Debug, Args)]
pub struct SyncScanArgs {
    /// Input DTS bitstream.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Lookahead in bytes when searching for the next sync marker.
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_RESYNC_WINDOW)]
    pub resync_window: usize,
}

#[derive(Debug, Args)]
pub struct Unpack14Args {
    /// 14-bit-packed input (use "-" for stdin).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output path (stdout if omitted). Never overwrites.
    #[arg(value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Leading bytes to discard first, e.g. 44 for a dtswav RIFF header.
    #[arg(long, value_name = "BYTES", default_value_t = 0)]
    pub skip: u64,
}

#[derive(Debug, Args)]
pub struct SplitArgs {
    /// Chapter tick list, one decimal tick per line.
    #[arg(value_name = "CHAPTERS")]
    pub chapters: PathBuf,

    /// Input DTS bitstream.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Directory for trackNN.dts files.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,
}

#[derive(Debug, Args)]
pub struct ChunkSplitArgs {
    /// Input DTS bitstream.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Directory for trackNN.dts files.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Lookahead in bytes when searching for the next sync marker.
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_RESYNC_WINDOW)]
    pub resync_window: usize,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    /// Disable logging output.
    Off,
    /// No output except errors.
    Error,
    /// Show warnings and errors.
    Warn,
    /// Show info, warnings and errors (default).
    Info,
    /// Show debug, info, warnings and errors.
    Debug,
    /// Show all log messages including trace.
    Trace,
}

impl LogLevel {
    /// Convert LogLevel to log::LevelFilter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    /// Colorized human-readable text.
    Plain,
    /// Structured JSON per log record.
    Json,
}
