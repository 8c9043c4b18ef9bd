//! Sink trait for record output destinations

use super::error::Result;

/// A destination for fully rendered records.
///
/// `record` already carries its line terminator when the formatter asks for
/// one. Sinks are flushed after every record.
pub trait Sink: Send {
    fn write_record(&mut self, record: &str) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}
