//! Core logger types and traits

pub mod config;
pub(crate) mod diagnostics;
pub mod error;
pub mod formatter;
pub mod log_level;
pub mod logger;
pub mod message;
pub mod metrics;
pub mod registry;
pub mod sink;
pub mod thread_info;
pub mod timestamp;

pub use config::{ConfiguredLoggers, LoggerConfig, LoggingConfig};
pub use error::{LoggerError, Result};
pub use formatter::{FormatSpec, Formatter, DEFAULT_MAX_RECORD_LENGTH, DEFAULT_RECORD_FORMAT};
pub use log_level::{level_name, LogLevel, StreamTarget, UNCHANGED};
pub use logger::Logger;
pub use message::{DEFAULT_MAX_MESSAGE_LENGTH, MESSAGE_FORMAT_ERROR};
pub use metrics::LoggerMetrics;
pub use registry::{
    get_logger, root_logger, Limits, NodeId, Registry, RegistryBuilder, DEFAULT_MAX_NAME_LENGTH,
    DEFAULT_MAX_SUBFIELDS,
};
pub use sink::Sink;
pub use thread_info::designate_main_thread;
pub use timestamp::{DEFAULT_TIME_FORMAT, TIME_FORMAT_ERROR};
