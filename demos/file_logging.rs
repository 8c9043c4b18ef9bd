//! File logging example
//!
//! Demonstrates per-logger log files, file switching and configuration
//! loaded from JSON.
//!
//! Run with: cargo run --example file_logging

use rust_logger_tree::prelude::*;
use rust_logger_tree::info;

const CONFIG: &str = r#"{
    "formatter": { "record_format": "%t [%L] %N%m" },
    "root": { "level": "info", "stream": "stdout", "file": "application.log" },
    "loggers": {
        "audit": { "file": "audit.log", "propagate": false },
        "net": { "level": "debug" }
    }
}"#;

fn main() -> Result<()> {
    println!("=== Rust Logger Tree - File Logging Example ===\n");

    let registry = Registry::new();
    let config = LoggingConfig::from_json_str(CONFIG)?;
    let loggers = registry.apply_config(&config)?;

    println!("1. Logging to both console and application.log:");
    let app = loggers.root();
    app.info("Application started");
    app.debug("Loading configuration... (hidden)");
    app.warning("Using default settings for some options");

    println!("\n2. net is configured at debug and propagates to the root:");
    let http = registry.resolve("net.http");
    for i in 1..=3 {
        info!(http, "Processing request {}/3", i);
    }
    http.debug("Keep-alive connection reused");

    println!("\n3. audit writes only to audit.log:");
    if let Some(audit) = loggers.get("audit") {
        audit.warning("User admin changed the retention policy");

        println!("\n4. A failed switch keeps the current file:");
        if let Err(err) = audit.set_logfile("/nonexistent/dir/audit.log") {
            println!("   switch refused: {}", err);
        }
        if let Some(path) = audit.logfile() {
            println!("   still writing to {}", path.display());
        }
    }

    let metrics = registry.metrics();
    println!(
        "\nRecords written: {}, filtered: {}, failures: {}",
        metrics.records_written(),
        metrics.records_filtered(),
        metrics.write_failures()
    );

    println!("\n=== Example completed successfully! ===");
    println!("Check 'application.log' and 'audit.log' for the file output");
    Ok(())
}
