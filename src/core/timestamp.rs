//! Timestamp rendering for the `%t` directive
//!
//! Time templates are strftime-compatible strings evaluated against the local
//! wall clock. A template chrono cannot evaluate renders as
//! [`TIME_FORMAT_ERROR`] instead of failing the record.

use chrono::{DateTime, Local, TimeZone};
use std::fmt::{Display, Write};

/// Default time template: `2025/01/08:10:30:45`
pub const DEFAULT_TIME_FORMAT: &str = "%Y/%m/%d:%H:%M:%S";

/// Placeholder emitted when a time template cannot be rendered
pub const TIME_FORMAT_ERROR: &str = "time fmt error";

/// Render the current local time with `template`.
#[must_use]
pub fn render_now(template: &str) -> String {
    render(template, &Local::now())
}

/// Render `datetime` with `template`, falling back to [`TIME_FORMAT_ERROR`].
///
/// # Examples
///
/// ```
/// use rust_logger_tree::core::timestamp::{render, TIME_FORMAT_ERROR};
/// use chrono::{TimeZone, Utc};
///
/// let datetime = Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap();
/// assert_eq!(render("%Y-%m-%d", &datetime), "2025-01-08");
/// assert_eq!(render("%Q", &datetime), TIME_FORMAT_ERROR);
/// ```
#[must_use]
pub fn render<Tz>(template: &str, datetime: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut out = String::with_capacity(template.len() + 16);
    // chrono reports unknown specifiers through the Display impl
    match write!(out, "{}", datetime.format(template)) {
        Ok(()) => out,
        Err(_) => TIME_FORMAT_ERROR.to_string(),
    }
}
