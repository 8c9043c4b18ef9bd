//! The facility's own diagnostic channel
//!
//! Registry bookkeeping (node creation, reuse, teardown) is reported here
//! rather than through the logger tree, so it can run while tree locks are
//! held. Debug-level events are only written when self-logging is enabled;
//! errors are always written. Output goes to standard error as
//! `[LOGGER <LEVEL>] <message>`.

use super::log_level::LogLevel;
use std::fmt;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub(crate) struct Diagnostics {
    enabled: AtomicBool,
}

impl Diagnostics {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
        }
    }

    pub(crate) fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Returns the previous setting
    pub(crate) fn set_enabled(&self, enabled: bool) -> bool {
        self.enabled.swap(enabled, Ordering::Relaxed)
    }

    pub(crate) fn debug(&self, args: fmt::Arguments<'_>) {
        if self.enabled() {
            emit(LogLevel::Debug, args);
        }
    }

    pub(crate) fn error(&self, args: fmt::Arguments<'_>) {
        emit(LogLevel::Error, args);
    }

    pub(crate) fn critical(&self, args: fmt::Arguments<'_>) {
        emit(LogLevel::Critical, args);
    }
}

fn emit(level: LogLevel, args: fmt::Arguments<'_>) {
    let _ = writeln!(std::io::stderr().lock(), "[LOGGER {}] {}", level, args);
}
