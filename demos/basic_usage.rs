//! Basic logger usage example
//!
//! Demonstrates the logger tree: level inheritance, propagation and record
//! templates, all written to the console.
//!
//! Run with: cargo run --example basic_usage

use rust_logger_tree::prelude::*;
use rust_logger_tree::{debug, info, warning};

fn main() -> Result<()> {
    println!("=== Rust Logger Tree - Basic Usage Example ===\n");
    rust_logger_tree::designate_main_thread();

    let root = root_logger();
    root.set_stream(StreamTarget::Stdout);
    root.set_level(LogLevel::Info);

    // Log messages at different levels
    println!("1. Logging on the root at INFO:");
    root.debug("This is a debug message (hidden)");
    root.info("This is an info message");
    root.warning("This is a warning message");
    root.error("This is an error message");
    root.critical("This is a critical message");

    println!("\n2. Children inherit their ancestor's level:");
    let app = get_logger("app");
    let db = get_logger("app.db");
    println!("   app.db effective level: {}", db.effective_level());
    app.set_level(LogLevel::Debug);
    debug!(db, "Connection pool sized to {}", 8);
    println!("   app.db effective level: {}", db.effective_level());

    println!("\n3. Records propagate up to the root:");
    app.set_stream(StreamTarget::Stdout);
    // a private formatter; set_record_format would change the shared default
    app.set_formatter(Formatter::new("   app sink -> [%L] %N%m", "%H:%M:%S", true));
    info!(db, "Query finished in {}ms", 12);

    println!("\n4. Stopping propagation at app:");
    app.set_propagation(false);
    warning!(db, "Slow query: {}ms", 950);

    println!("\n5. Worker threads are tagged by %I:");
    let worker = get_logger("app.worker");
    std::thread::spawn(move || worker.info("Hello from a worker thread"))
        .join()
        .expect("worker thread panicked");

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
