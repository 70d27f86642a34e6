/// Bit-level reading for header fields.
pub mod bitstream_io;

/// Error types for every processing stage.
pub mod errors;
