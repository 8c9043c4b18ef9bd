//! Stream sink implementation

use crate::core::{LoggerError, Result, Sink, StreamTarget};
use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;

enum Stream {
    Stdout,
    Stderr,
    Stdlog,
    Writer {
        name: String,
        writer: Box<dyn Write + Send>,
    },
}

/// Console stream, or any caller-supplied writer
pub struct StreamSink {
    stream: Stream,
}

impl StreamSink {
    pub fn stdout() -> Self {
        Self {
            stream: Stream::Stdout,
        }
    }

    pub fn stderr() -> Self {
        Self {
            stream: Stream::Stderr,
        }
    }

    /// Diagnostic stream; writes to standard error
    pub fn stdlog() -> Self {
        Self {
            stream: Stream::Stdlog,
        }
    }

    /// Wrap an arbitrary writer
    ///
    /// # Example
    ///
    /// ```
    /// use rust_logger_tree::sinks::{MemoryWriter, StreamSink};
    ///
    /// let buffer = MemoryWriter::new();
    /// let sink = StreamSink::writer("capture", buffer.clone());
    /// ```
    pub fn writer(name: impl Into<String>, writer: impl Write + Send + 'static) -> Self {
        Self {
            stream: Stream::Writer {
                name: name.into(),
                writer: Box::new(writer),
            },
        }
    }

    /// Sink for a named stream; `None` for `DevNull` and `Unchanged`
    pub fn for_target(target: StreamTarget) -> Option<Self> {
        match target {
            StreamTarget::Stdout => Some(Self::stdout()),
            StreamTarget::Stderr => Some(Self::stderr()),
            StreamTarget::Stdlog => Some(Self::stdlog()),
            StreamTarget::DevNull | StreamTarget::Unchanged => None,
        }
    }

    /// Named stream this sink writes to, if it is a console stream
    pub fn target(&self) -> Option<StreamTarget> {
        match self.stream {
            Stream::Stdout => Some(StreamTarget::Stdout),
            Stream::Stderr => Some(StreamTarget::Stderr),
            Stream::Stdlog => Some(StreamTarget::Stdlog),
            Stream::Writer { .. } => None,
        }
    }
}

impl std::fmt::Debug for StreamSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamSink").field("name", &self.name()).finish()
    }
}

impl Sink for StreamSink {
    fn write_record(&mut self, record: &str) -> Result<()> {
        match &mut self.stream {
            Stream::Stdout => std::io::stdout().lock().write_all(record.as_bytes())?,
            Stream::Stderr | Stream::Stdlog => {
                std::io::stderr().lock().write_all(record.as_bytes())?
            }
            Stream::Writer { name, writer } => {
                writer.write_all(record.as_bytes()).map_err(|e| {
                    LoggerError::io_operation("writing record", format!("stream '{}'", name), e)
                })?;
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        match &mut self.stream {
            Stream::Stdout => std::io::stdout().flush()?,
            Stream::Stderr | Stream::Stdlog => std::io::stderr().flush()?,
            Stream::Writer { name, writer } => writer
                .flush()
                .map_err(|e| LoggerError::writer(format!("flushing stream '{}': {}", name, e)))?,
        }
        Ok(())
    }

    fn name(&self) -> &str {
        match &self.stream {
            Stream::Stdout => "stdout",
            Stream::Stderr => "stderr",
            Stream::Stdlog => "stdlog",
            Stream::Writer { name, .. } => name,
        }
    }
}

/// Clonable in-memory writer; every clone appends to the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemoryWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
