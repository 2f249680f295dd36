//! Stream source infrastructure module
//!
//! Delivers a file or standard input as a live sequence of compressed chunks.

mod reader;

pub use reader::{ReaderChunkStream, ReaderStreamSource};
