//! # Rust Logger Tree
//!
//! A hierarchical, thread-safe logging facility. Loggers are named with
//! dotted paths (`app.db.pool`) and form a tree under a root logger.
//!
//! ## Features
//!
//! - **Level inheritance**: a logger without a level uses its nearest ancestor's
//! - **Propagation**: records travel up the tree until a logger stops them
//! - **Template formatting**: `%t %I[%l] %N%m` style record templates with
//!   bounded record length
//! - **Sinks**: one console stream and one append-mode file per logger
//! - **Thread safe**: records from concurrent threads never interleave
//!
//! ## Example
//!
//! ```
//! use rust_logger_tree::{info, LogLevel, MemoryWriter, Registry};
//!
//! let registry = Registry::new();
//! let app = registry.resolve("app");
//! let output = MemoryWriter::new();
//! app.set_writer("memory", output.clone());
//! app.formatter().set_record_format("[%l] %N%m");
//! app.set_level(LogLevel::Info);
//!
//! let db = registry.resolve("app.db");
//! info!(db, "connected to {}", "primary");
//!
//! assert_eq!(output.lines(), vec!["[info] app.db: connected to primary"]);
//! ```

pub mod core;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        get_logger, root_logger, ConfiguredLoggers, FormatSpec, Formatter, LogLevel, Logger,
        LoggerConfig, LoggerError, LoggerMetrics, LoggingConfig, Registry, RegistryBuilder,
        Result, Sink, StreamTarget, UNCHANGED,
    };
    pub use crate::sinks::{FileSink, MemoryWriter, StreamSink};
}

pub use core::{
    designate_main_thread, get_logger, root_logger, ConfiguredLoggers, FormatSpec, Formatter,
    Limits, LogLevel, Logger, LoggerConfig, LoggerError, LoggerMetrics, LoggingConfig, Registry,
    RegistryBuilder, Result, Sink, StreamTarget, UNCHANGED,
};
pub use sinks::{FileSink, MemoryWriter, StreamSink};
