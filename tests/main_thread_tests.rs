//! Main thread handling for the `%I` directive
//!
//! Designating the main thread is process-wide and can only happen once, so
//! these tests live in their own test binary.

use rust_logger_tree::core::thread_info::{is_main_thread, thread_tag};
use rust_logger_tree::prelude::*;
use rust_logger_tree::designate_main_thread;
use std::thread;

#[test]
fn test_thread_tag_omitted_on_designated_main_thread() {
    assert!(designate_main_thread());
    assert!(is_main_thread());
    // a second designation is refused
    assert!(!designate_main_thread());

    let registry = Registry::new();
    let logger = registry.resolve("x");
    let buffer = MemoryWriter::new();
    logger.set_formatter(Formatter::new("%t %I[%l] %N%m", "TS", true));
    logger.set_writer("capture", buffer.clone());

    logger.error("boom");

    let worker = logger.clone();
    let (tag, worker_is_main) = thread::spawn(move || {
        worker.error("boom");
        (thread_tag(), is_main_thread())
    })
    .join()
    .expect("Thread panicked");

    assert!(!worker_is_main);
    let lines = buffer.lines();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "TS [error] x: boom");
    assert!(lines[1].starts_with("TS ("));
    assert_eq!(lines[1], format!("TS ({}) [error] x: boom", tag));
}
