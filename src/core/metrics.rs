//! Registry metrics for observability
//!
//! Counters for records delivered, filtered and lost, and for logger node
//! churn in the tree.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics shared by every logger of one registry
///
/// # Example
///
/// ```
/// use rust_logger_tree::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
///
/// metrics.record_written();
/// metrics.record_write_failure();
///
/// assert_eq!(metrics.records_written(), 1);
/// assert_eq!(metrics.write_failures(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Records written to a sink (one per sink per record)
    records_written: AtomicU64,

    /// Sink writes or flushes that failed
    write_failures: AtomicU64,

    /// Calls rejected by the origin logger's effective level
    records_filtered: AtomicU64,

    /// Logger nodes constructed
    nodes_created: AtomicU64,

    /// Logger nodes detached and destroyed
    nodes_destroyed: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            records_written: AtomicU64::new(0),
            write_failures: AtomicU64::new(0),
            records_filtered: AtomicU64::new(0),
            nodes_created: AtomicU64::new(0),
            nodes_destroyed: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn records_written(&self) -> u64 {
        self.records_written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn write_failures(&self) -> u64 {
        self.write_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn records_filtered(&self) -> u64 {
        self.records_filtered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn nodes_created(&self) -> u64 {
        self.nodes_created.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn nodes_destroyed(&self) -> u64 {
        self.nodes_destroyed.load(Ordering::Relaxed)
    }

    /// Number of nodes currently alive, the root included
    pub fn live_nodes(&self) -> u64 {
        self.nodes_created().saturating_sub(self.nodes_destroyed())
    }

    /// Record a sink write; returns the previous count
    #[inline]
    pub fn record_written(&self) -> u64 {
        self.records_written.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_write_failure(&self) -> u64 {
        self.write_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_filtered(&self) -> u64 {
        self.records_filtered.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn record_node_created(&self) -> u64 {
        self.nodes_created.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn record_node_destroyed(&self) -> u64 {
        self.nodes_destroyed.fetch_add(1, Ordering::Relaxed)
    }

    /// Failure rate of sink writes as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if nothing has been written yet.
    pub fn failure_rate(&self) -> f64 {
        let failed = self.write_failures() as f64;
        let total = self.records_written() as f64 + failed;
        if total == 0.0 {
            0.0
        } else {
            (failed / total) * 100.0
        }
    }

    /// Reset the record counters to zero; node counters keep tracking the tree
    pub fn reset(&self) {
        self.records_written.store(0, Ordering::Relaxed);
        self.write_failures.store(0, Ordering::Relaxed);
        self.records_filtered.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            records_written: AtomicU64::new(self.records_written()),
            write_failures: AtomicU64::new(self.write_failures()),
            records_filtered: AtomicU64::new(self.records_filtered()),
            nodes_created: AtomicU64::new(self.nodes_created()),
            nodes_destroyed: AtomicU64::new(self.nodes_destroyed()),
        }
    }
}
