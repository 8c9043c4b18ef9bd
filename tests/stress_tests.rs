//! Stress tests for concurrent use of the logger tree
//!
//! These tests verify:
//! - Records from concurrent threads are never interleaved
//! - No record is lost under concurrent dispatch
//! - Concurrent resolution and release keep the tree consistent
//! - Concurrent level and formatter changes do not disturb dispatch

use rust_logger_tree::prelude::*;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use tempfile::TempDir;

const THREADS: usize = 8;
const RECORDS_PER_THREAD: usize = 1000;

/// N threads x 1000 records into one shared file yield N x 1000 whole lines
#[test]
fn test_concurrent_dispatch_to_shared_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("shared.log");

    let registry = Registry::new();
    let service = registry.resolve("service");
    service.set_formatter(Formatter::new("%n %m", "TS", true));
    service.set_level(LogLevel::Debug);
    service.set_logfile(&log_file).expect("Failed to open log file");

    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let registry = registry.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let logger = registry.resolve(&format!("service.worker{}", t));
                barrier.wait();
                for i in 0..RECORDS_PER_THREAD {
                    logger.info(format_args!("thread={} seq={} payload={}", t, i, "x".repeat(40)));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    let content = std::fs::read_to_string(&log_file).expect("Failed to read log file");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), THREADS * RECORDS_PER_THREAD);

    let mut seen = HashSet::new();
    for line in &lines {
        let mut parts = line.split(' ');
        let name = parts.next().unwrap();
        let thread_part = parts.next().unwrap();
        let seq_part = parts.next().unwrap();
        let payload = parts.next().unwrap();
        assert!(parts.next().is_none(), "interleaved line: {}", line);

        let t: usize = thread_part.trim_start_matches("thread=").parse().unwrap();
        assert_eq!(name, format!("service.worker{}", t));
        assert_eq!(payload, format!("payload={}", "x".repeat(40)));
        assert!(seen.insert((t, seq_part.to_string())), "duplicate line: {}", line);
    }
    assert_eq!(registry.metrics().records_written(), (THREADS * RECORDS_PER_THREAD) as u64);
}

/// Per-thread order is preserved on a shared in-memory sink
#[test]
fn test_concurrent_dispatch_preserves_per_thread_order() {
    let registry = Registry::new();
    let root = registry.resolve_root();
    let buffer = MemoryWriter::new();
    root.set_formatter(Formatter::new("%m", "TS", true));
    root.set_writer("memory", buffer.clone());
    root.set_level(LogLevel::Debug);

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = registry.resolve(&format!("order.t{}", t));
            thread::spawn(move || {
                for i in 0..RECORDS_PER_THREAD {
                    logger.debug(format_args!("{}:{}", t, i));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    let mut next = vec![0usize; THREADS];
    for line in buffer.lines() {
        let (t, i) = line.split_once(':').unwrap();
        let t: usize = t.parse().unwrap();
        let i: usize = i.parse().unwrap();
        assert_eq!(i, next[t], "thread {} out of order", t);
        next[t] += 1;
    }
    assert!(next.iter().all(|count| *count == RECORDS_PER_THREAD));
}

/// Loggers resolved and released concurrently under a shared parent
#[test]
fn test_concurrent_resolve_and_release() {
    let registry = Registry::new();
    let parent = registry.resolve("churn");
    let iterations = 500;

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let registry = registry.clone();
            thread::spawn(move || {
                for i in 0..iterations {
                    // a few names are shared between threads to race create and destroy
                    let name = format!("churn.n{}.leaf{}", i % 4, (t + i) % 3);
                    let logger = registry.resolve(&name);
                    assert_eq!(logger.path(), name);
                    let again = registry.resolve(&name);
                    assert!(logger.ptr_eq(&again));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    assert!(parent.children().is_empty());
    assert_eq!(registry.live_loggers(), vec!["churn"]);
    let metrics = registry.metrics();
    assert_eq!(metrics.live_nodes(), 2);
    assert_eq!(metrics.nodes_created() - metrics.nodes_destroyed(), 2);
}

/// Level, propagation and formatter changes racing with dispatch
#[test]
fn test_reconfiguration_during_dispatch() {
    let registry = Registry::new();
    let app = registry.resolve("app");
    let buffer = MemoryWriter::new();
    app.set_formatter(Formatter::new("%L %m", "TS", true));
    app.set_writer("memory", buffer.clone());
    app.set_level(LogLevel::Debug);

    let written = Arc::new(AtomicUsize::new(0));
    let writers: Vec<_> = (0..4)
        .map(|t| {
            let logger = registry.resolve(&format!("app.part{}", t));
            let written = Arc::clone(&written);
            thread::spawn(move || {
                for i in 0..RECORDS_PER_THREAD {
                    if logger.is_enabled_for(LogLevel::Error) {
                        logger.error(format_args!("{} {}", t, i));
                        written.fetch_add(1, Ordering::Relaxed);
                    }
                }
            })
        })
        .collect();

    let reconfigure = {
        let app = app.clone();
        thread::spawn(move || {
            for i in 0..200 {
                app.set_level(if i % 2 == 0 { LogLevel::Info } else { LogLevel::Debug });
                app.formatter().set_time_format(if i % 2 == 0 { "%H" } else { "TS" });
            }
        })
    };

    for handle in writers {
        handle.join().expect("Thread panicked");
    }
    reconfigure.join().expect("Thread panicked");

    let lines = buffer.lines();
    assert_eq!(lines.len(), written.load(Ordering::Relaxed));
    assert!(lines.iter().all(|line| line.starts_with("ERROR ")));
}
