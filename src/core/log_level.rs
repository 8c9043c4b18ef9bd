//! Log level and stream selection definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sentinel accepted wherever a raw level or stream value means "leave as-is"
pub const UNCHANGED: i32 = -1;

/// Severity of a record, or `NotSet` for a logger that inherits its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum LogLevel {
    #[default]
    NotSet = 0,
    Debug = 1,
    Info = 2,
    Warning = 3,
    Error = 4,
    Critical = 5,
}

impl LogLevel {
    pub const MIN: LogLevel = LogLevel::NotSet;
    pub const MAX: LogLevel = LogLevel::Critical;

    pub fn to_str(&self) -> &'static str {
        level_name(*self as i32, true)
    }

    /// Map a raw severity onto a level: `abs(raw)` clamped into `[MIN, MAX]`.
    ///
    /// ```
    /// use rust_logger_tree::LogLevel;
    ///
    /// assert_eq!(LogLevel::clamp_raw(-7), LogLevel::Critical);
    /// assert_eq!(LogLevel::clamp_raw(-2), LogLevel::Info);
    /// ```
    #[must_use]
    pub fn clamp_raw(raw: i32) -> Self {
        match raw.unsigned_abs().min(LogLevel::MAX as u32) {
            0 => LogLevel::NotSet,
            1 => LogLevel::Debug,
            2 => LogLevel::Info,
            3 => LogLevel::Warning,
            4 => LogLevel::Error,
            _ => LogLevel::Critical,
        }
    }

    /// Raw values outside `0..=5` yield `None`
    #[must_use]
    pub fn from_raw(raw: i32) -> Option<Self> {
        if (LogLevel::MIN as i32..=LogLevel::MAX as i32).contains(&raw) {
            Some(Self::clamp_raw(raw))
        } else {
            None
        }
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        *self != LogLevel::NotSet
    }
}

/// Name of a raw severity as rendered by `%l` / `%L`.
pub fn level_name(raw: i32, uppercase: bool) -> &'static str {
    match (raw, uppercase) {
        (0, false) => "unset",
        (0, true) => "UNSET",
        (1, false) => "debug",
        (1, true) => "DEBUG",
        (2, false) => "info",
        (2, true) => "INFO",
        (3, false) => "warning",
        (3, true) => "WARNING",
        (4, false) => "error",
        (4, true) => "ERROR",
        (5, false) => "critical",
        (5, true) => "CRITICAL",
        (_, false) => "unknown",
        (_, true) => "UNKNOWN",
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl From<LogLevel> for i32 {
    fn from(level: LogLevel) -> Self {
        level as i32
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "NOTSET" | "UNSET" => Ok(LogLevel::NotSet),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warning),
            "ERROR" => Ok(LogLevel::Error),
            "CRITICAL" | "FATAL" => Ok(LogLevel::Critical),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}

/// Named console stream selection for a logger's stream sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamTarget {
    /// Discard stream output
    DevNull,
    Stdout,
    Stderr,
    /// Diagnostic stream; shares the process's standard error
    Stdlog,
    /// Keep whatever stream is configured
    Unchanged,
}

impl StreamTarget {
    /// Decode the raw selector (`0..=3`, `-1`); unknown values mean `Unchanged`.
    #[must_use]
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            0 => StreamTarget::DevNull,
            1 => StreamTarget::Stdout,
            2 => StreamTarget::Stderr,
            3 => StreamTarget::Stdlog,
            _ => StreamTarget::Unchanged,
        }
    }

    pub fn to_raw(self) -> i32 {
        match self {
            StreamTarget::DevNull => 0,
            StreamTarget::Stdout => 1,
            StreamTarget::Stderr => 2,
            StreamTarget::Stdlog => 3,
            StreamTarget::Unchanged => UNCHANGED,
        }
    }
}

impl fmt::Display for StreamTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StreamTarget::DevNull => "devnull",
            StreamTarget::Stdout => "stdout",
            StreamTarget::Stderr => "stderr",
            StreamTarget::Stdlog => "stdlog",
            StreamTarget::Unchanged => "unchanged",
        };
        f.write_str(name)
    }
}
