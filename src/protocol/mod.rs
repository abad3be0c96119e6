//! Line protocol spoken over the UART characteristics

pub mod framing;
pub mod line;

pub use framing::LineAccumulator;
pub use line::{chunk_count, chunks, encode_line, terminate_line};
