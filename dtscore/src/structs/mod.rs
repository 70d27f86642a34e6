/// Chapter tick lists read from playlist dumps.
pub mod chapters;

/// Stream geometry calibrated from the first header.
pub mod geometry;

/// Core frame header decoding.
pub mod header;
