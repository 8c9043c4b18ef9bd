//! Sink implementations

pub mod file;
pub mod stream;

pub use file::FileSink;
pub use stream::{MemoryWriter, StreamSink};

pub use crate::core::Sink;
