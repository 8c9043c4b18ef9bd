//! Record formatter
//!
//! A [`Formatter`] turns (message, logger name, severity) into one record
//! line using a record template and a time template:
//!
//! | directive   | output                                               |
//! |-------------|------------------------------------------------------|
//! | `%t` `%T`   | current local time rendered with the time template   |
//! | `%i`        | thread tag (hex)                                     |
//! | `%I`        | `"(tag) "`, nothing on the main thread               |
//! | `%p` `%P`   | process id / parent process id                       |
//! | `%l` `%L`   | level name, lowercase / uppercase                    |
//! | `%n`        | logger name                                          |
//! | `%N`        | logger name and `": "`, nothing for an empty name    |
//! | `%m` `%M`   | the message                                          |
//! | `%%`        | `%`                                                  |
//!
//! Any other `%x` is copied through unchanged. Records never exceed the
//! formatter's maximum record length.
//!
//! Cloning a `Formatter` shares it: setters called through one clone are seen
//! by every logger holding another.

use super::log_level::{level_name, LogLevel};
use super::message::BoundedBuf;
use super::thread_info::{is_main_thread, parent_process_id, process_id, thread_tag};
use super::timestamp::{self, DEFAULT_TIME_FORMAT};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Default record template: `2025/01/08:10:30:45 (1f2e3d) [error] app.db: message`
pub const DEFAULT_RECORD_FORMAT: &str = "%t %I[%l] %N%m";

/// Default cap on the rendered record, in bytes
pub const DEFAULT_MAX_RECORD_LENGTH: usize = 512;

/// Plain settings of a formatter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatSpec {
    pub record_format: String,
    pub time_format: String,
    pub append_newline: bool,
    pub max_record_length: usize,
}

impl Default for FormatSpec {
    fn default() -> Self {
        Self {
            record_format: DEFAULT_RECORD_FORMAT.to_string(),
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            append_newline: true,
            max_record_length: DEFAULT_MAX_RECORD_LENGTH,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Formatter {
    spec: Arc<RwLock<FormatSpec>>,
}

impl Formatter {
    /// A fresh, unshared formatter
    #[must_use]
    pub fn new(record_format: &str, time_format: &str, append_newline: bool) -> Self {
        Self::from_spec(FormatSpec {
            record_format: record_format.to_string(),
            time_format: time_format.to_string(),
            append_newline,
            ..FormatSpec::default()
        })
    }

    #[must_use]
    pub fn from_spec(spec: FormatSpec) -> Self {
        Self {
            spec: Arc::new(RwLock::new(spec)),
        }
    }

    /// Snapshot of the current settings
    pub fn spec(&self) -> FormatSpec {
        self.spec.read().clone()
    }

    /// Whether both handles refer to the same formatter instance
    pub fn ptr_eq(&self, other: &Formatter) -> bool {
        Arc::ptr_eq(&self.spec, &other.spec)
    }

    pub fn time_format(&self) -> String {
        self.spec.read().time_format.clone()
    }

    pub fn set_time_format(&self, time_format: &str) {
        self.spec.write().time_format = time_format.to_string();
    }

    pub fn record_format(&self) -> String {
        self.spec.read().record_format.clone()
    }

    pub fn set_record_format(&self, record_format: &str) {
        self.spec.write().record_format = record_format.to_string();
    }

    pub fn append_newline(&self) -> bool {
        self.spec.read().append_newline
    }

    /// Returns the previous setting
    pub fn set_append_newline(&self, append_newline: bool) -> bool {
        std::mem::replace(&mut self.spec.write().append_newline, append_newline)
    }

    pub fn max_record_length(&self) -> usize {
        self.spec.read().max_record_length
    }

    pub fn set_max_record_length(&self, max_record_length: usize) {
        self.spec.write().max_record_length = max_record_length;
    }

    /// Render a record for `level`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rust_logger_tree::{Formatter, LogLevel};
    ///
    /// let formatter = Formatter::new("[%L] %N%m", "%H:%M", true);
    /// assert_eq!(formatter.render("disk full", "app.db", LogLevel::Error), "[ERROR] app.db: disk full");
    /// assert_eq!(formatter.render("disk full", "", LogLevel::Error), "[ERROR] disk full");
    /// ```
    pub fn render(&self, message: &str, name: &str, level: LogLevel) -> String {
        self.render_severity(message, name, level as i32)
    }

    /// Render a record for a raw severity; unknown severities print as `unknown`.
    pub fn render_severity(&self, message: &str, name: &str, severity: i32) -> String {
        let spec = self.spec.read();
        let mut out = BoundedBuf::new(spec.max_record_length);
        let mut stamp: Option<String> = None;
        let mut utf8 = [0u8; 4];
        let mut chars = spec.record_format.chars();

        while let Some(c) = chars.next() {
            if out.is_full() {
                break;
            }
            if c != '%' {
                out.push(c.encode_utf8(&mut utf8));
                continue;
            }
            let Some(directive) = chars.next() else {
                out.push("%");
                break;
            };
            match directive {
                't' | 'T' => {
                    let ts = stamp.get_or_insert_with(|| timestamp::render_now(&spec.time_format));
                    out.push(ts);
                }
                'i' => out.push(&thread_tag()),
                'I' => {
                    if !is_main_thread() {
                        out.push("(");
                        out.push(&thread_tag());
                        out.push(") ");
                    }
                }
                'p' => out.push(&process_id().to_string()),
                'P' => out.push(&parent_process_id().to_string()),
                'l' => out.push(level_name(severity, false)),
                'L' => out.push(level_name(severity, true)),
                'n' => out.push(name),
                'N' => {
                    if !name.is_empty() {
                        out.push(name);
                        out.push(": ");
                    }
                }
                'm' | 'M' => out.push(message),
                '%' => out.push("%"),
                other => {
                    out.push("%");
                    out.push(other.encode_utf8(&mut utf8));
                }
            }
        }

        out.into_string()
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::from_spec(FormatSpec::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::timestamp::TIME_FORMAT_ERROR;

    fn fixed_time(record_format: &str) -> Formatter {
        // a time template without directives renders verbatim
        Formatter::new(record_format, "TS", true)
    }

    #[test]
    fn test_default_template_with_name() {
        let formatter = fixed_time(DEFAULT_RECORD_FORMAT);
        let record = formatter.render("boom", "x", LogLevel::Error);
        assert_eq!(record, format!("TS ({}) [error] x: boom", thread_tag()));
    }

    #[test]
    fn test_default_template_without_name() {
        let formatter = fixed_time(DEFAULT_RECORD_FORMAT);
        let record = formatter.render("boom", "", LogLevel::Error);
        assert_eq!(record, format!("TS ({}) [error] boom", thread_tag()));
    }

    #[test]
    fn test_level_directives() {
        let formatter = fixed_time("%l|%L");
        assert_eq!(formatter.render("", "", LogLevel::Warning), "warning|WARNING");
        assert_eq!(formatter.render("", "", LogLevel::NotSet), "unset|UNSET");
        assert_eq!(formatter.render_severity("", "", 9), "unknown|UNKNOWN");
    }

    #[test]
    fn test_name_directives() {
        let formatter = fixed_time("<%n><%N>");
        assert_eq!(formatter.render("", "app.db", LogLevel::Info), "<app.db><app.db: >");
        assert_eq!(formatter.render("", "", LogLevel::Info), "<><>");
    }

    #[test]
    fn test_process_and_thread_directives() {
        let formatter = fixed_time("%p %P %i");
        let expected = format!("{} {} {}", process_id(), parent_process_id(), thread_tag());
        assert_eq!(formatter.render("", "", LogLevel::Info), expected);
    }

    #[test]
    fn test_message_aliases_and_escapes() {
        let formatter = fixed_time("%m=%M 100%% %q %");
        assert_eq!(formatter.render("hi", "", LogLevel::Info), "hi=hi 100% %q %");
    }

    #[test]
    fn test_time_aliases() {
        let formatter = fixed_time("%t/%T");
        assert_eq!(formatter.render("", "", LogLevel::Info), "TS/TS");
    }

    #[test]
    fn test_bad_time_template() {
        let formatter = Formatter::new("%t %m", "%Y %Q", true);
        assert_eq!(
            formatter.render("m", "", LogLevel::Info),
            format!("{} m", TIME_FORMAT_ERROR)
        );
    }

    #[test]
    fn test_truncation_is_exact_for_ascii() {
        let formatter = fixed_time("[%l] %N%m");
        let message = "a".repeat(2000);
        let record = formatter.render(&message, "svc", LogLevel::Info);
        assert_eq!(record.len(), DEFAULT_MAX_RECORD_LENGTH);
        assert!(record.starts_with("[info] svc: aaa"));
    }

    #[test]
    fn test_truncation_boundary_inside_directive() {
        let formatter = fixed_time("abc%N%m");
        formatter.set_max_record_length(5);
        assert_eq!(formatter.render("zzz", "name", LogLevel::Info), "abcna");
    }

    #[test]
    fn test_truncation_never_splits_characters() {
        let formatter = fixed_time("%m");
        formatter.set_max_record_length(7);
        let record = formatter.render("ééééé", "", LogLevel::Info);
        assert_eq!(record, "ééé");
    }

    #[test]
    fn test_shared_mutation_is_visible() {
        let formatter = fixed_time("%m");
        let shared = formatter.clone();
        shared.set_record_format("[%l] %m");
        assert!(formatter.ptr_eq(&shared));
        assert_eq!(formatter.render("x", "", LogLevel::Debug), "[debug] x");

        let isolated = Formatter::from_spec(formatter.spec());
        isolated.set_record_format("%m");
        assert!(!isolated.ptr_eq(&formatter));
        assert_eq!(formatter.record_format(), "[%l] %m");
    }

    #[test]
    fn test_append_newline_setter_returns_previous() {
        let formatter = Formatter::default();
        assert!(formatter.append_newline());
        assert!(formatter.set_append_newline(false));
        assert!(!formatter.append_newline());
    }
}
