//! Bounded message expansion
//!
//! Messages are expanded from any `Display` value (typically
//! `format_args!`) into a buffer of at most `capacity - 1` bytes, cut on a
//! character boundary. A `Display` impl that reports an error yields
//! [`MESSAGE_FORMAT_ERROR`] instead.

use std::fmt::{self, Display, Write};

/// Default message buffer size in bytes
pub const DEFAULT_MAX_MESSAGE_LENGTH: usize = 1024;

/// Placeholder emitted when a message cannot be expanded
pub const MESSAGE_FORMAT_ERROR: &str = "logging error: message formatting failed";

/// Appends text up to a byte limit, dropping whatever does not fit.
///
/// Once a push is cut short the buffer is closed, so its contents are always
/// a prefix of everything pushed.
pub(crate) struct BoundedBuf {
    buf: String,
    limit: usize,
    closed: bool,
}

impl BoundedBuf {
    pub(crate) fn new(limit: usize) -> Self {
        Self {
            buf: String::with_capacity(limit.min(256)),
            limit,
            closed: false,
        }
    }

    pub(crate) fn push(&mut self, s: &str) {
        if self.closed {
            return;
        }
        let room = self.limit.saturating_sub(self.buf.len());
        if s.len() <= room {
            self.buf.push_str(s);
        } else {
            self.buf.push_str(&s[..floor_char_boundary(s, room)]);
            self.closed = true;
        }
    }

    pub(crate) fn is_full(&self) -> bool {
        self.closed || self.buf.len() >= self.limit
    }

    pub(crate) fn into_string(self) -> String {
        self.buf
    }
}

impl Write for BoundedBuf {
    // Overflow is truncation, not an error, so user Display impls run to completion
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push(s);
        Ok(())
    }
}

/// Largest index `<= max` that lies on a char boundary of `s`
pub(crate) fn floor_char_boundary(s: &str, max: usize) -> usize {
    if max >= s.len() {
        return s.len();
    }
    let mut idx = max;
    while !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

/// Expand `message` into at most `capacity - 1` bytes.
pub fn expand(message: &dyn Display, capacity: usize) -> String {
    let mut buf = BoundedBuf::new(capacity.saturating_sub(1));
    match write!(buf, "{}", message) {
        Ok(()) => buf.into_string(),
        Err(_) => {
            let mut fallback = BoundedBuf::new(capacity.saturating_sub(1));
            fallback.push(MESSAGE_FORMAT_ERROR);
            fallback.into_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl Display for Broken {
        fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    #[test]
    fn test_expand_format_args() {
        let user = "alice";
        let message = expand(&format_args!("user {} logged in ({} tries)", user, 3), 1024);
        assert_eq!(message, "user alice logged in (3 tries)");
    }

    #[test]
    fn test_expand_truncates_to_capacity_minus_one() {
        let long = "x".repeat(5000);
        let message = expand(&long, DEFAULT_MAX_MESSAGE_LENGTH);
        assert_eq!(message.len(), 1023);
    }

    #[test]
    fn test_expand_respects_char_boundaries() {
        // each 'é' is two bytes; 9 bytes of room fit four of them
        let message = expand(&"éééééé", 10);
        assert_eq!(message, "éééé");
    }

    #[test]
    fn test_expand_failure_substitutes_placeholder() {
        assert_eq!(expand(&Broken, 1024), MESSAGE_FORMAT_ERROR);
    }

    #[test]
    fn test_bounded_buf_is_full() {
        let mut buf = BoundedBuf::new(4);
        buf.push("ab");
        assert!(!buf.is_full());
        buf.push("cdef");
        assert!(buf.is_full());
        assert_eq!(buf.into_string(), "abcd");
    }

    #[test]
    fn test_bounded_buf_closes_after_cut() {
        let mut buf = BoundedBuf::new(5);
        buf.push("abcd");
        buf.push("éé");
        buf.push("z");
        assert_eq!(buf.into_string(), "abcd");
    }
}
