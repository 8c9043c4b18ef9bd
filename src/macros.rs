//! Logging macros for ergonomic log message formatting.
//!
//! These macros take `format!`-style arguments. The message is only expanded
//! when the record passes the logger's effective level.
//!
//! # Examples
//!
//! ```
//! use rust_logger_tree::prelude::*;
//! use rust_logger_tree::info;
//!
//! let registry = Registry::new();
//! let logger = registry.resolve("server");
//! logger.set_level(LogLevel::Info);
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//! ```

/// Log a message at an explicit level.
///
/// # Examples
///
/// ```
/// # use rust_logger_tree::prelude::*;
/// # let logger = Registry::new().resolve("app");
/// use rust_logger_tree::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($level, format_args!($($arg)+))
    };
}

/// Log a critical-level message.
///
/// # Examples
///
/// ```
/// # use rust_logger_tree::prelude::*;
/// # let logger = Registry::new().resolve("app");
/// use rust_logger_tree::critical;
/// critical!(logger, "Unable to recover from error: {}", "disk full");
/// ```
#[macro_export]
macro_rules! critical {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Critical, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// # Examples
///
/// ```
/// # use rust_logger_tree::prelude::*;
/// # let logger = Registry::new().resolve("app");
/// use rust_logger_tree::warning;
/// warning!(logger, "Retry attempt {} of {}", 3, 5);
/// ```
#[macro_export]
macro_rules! warning {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warning, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{Formatter, LogLevel, Logger, Registry};
    use crate::sinks::MemoryWriter;

    fn captured(registry: &Registry) -> (Logger, MemoryWriter) {
        let logger = registry.resolve("macros");
        let buffer = MemoryWriter::new();
        logger.set_level(LogLevel::Debug);
        logger.set_formatter(Formatter::new("%L %m", "TS", true));
        logger.set_writer("capture", buffer.clone());
        (logger, buffer)
    }

    #[test]
    fn test_log_macro() {
        let registry = Registry::new();
        let (logger, buffer) = captured(&registry);
        log!(logger, LogLevel::Info, "Test message");
        log!(logger, LogLevel::Info, "Formatted: {}", 42);
        assert_eq!(buffer.lines(), vec!["INFO Test message", "INFO Formatted: 42"]);
    }

    #[test]
    fn test_leveled_macros() {
        let registry = Registry::new();
        let (logger, buffer) = captured(&registry);
        critical!(logger, "c{}", 1);
        error!(logger, "e{}", 2);
        warning!(logger, "w{}", 3);
        info!(logger, "i{}", 4);
        debug!(logger, "d{}", 5);
        assert_eq!(
            buffer.lines(),
            vec!["CRITICAL c1", "ERROR e2", "WARNING w3", "INFO i4", "DEBUG d5"]
        );
    }

    #[test]
    fn test_macro_respects_level() {
        let registry = Registry::new();
        let (logger, buffer) = captured(&registry);
        logger.set_level(LogLevel::Error);
        info!(logger, "dropped {}", 1);
        error!(logger, "kept {}", 2);
        assert_eq!(buffer.lines(), vec!["ERROR kept 2"]);
    }
}
