//! Logging Infrastructure
//!
//! Console output goes to stderr so stdout carries only command results.

use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize the logger with optional file output
///
/// `RUST_LOG`, when set, overrides `log_level`.
pub fn init_logger(log_level: &str, log_dir: Option<&Path>) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    if let Some(dir) = log_dir {
        if dir.is_dir() {
            let file_appender = tracing_appender::rolling::daily(dir, "catalog-tool");
            subscriber.with_ansi(false).with_writer(file_appender).init();
            return;
        }
        eprintln!("Log directory {} does not exist, logging to stderr", dir.display());
    }

    subscriber.with_writer(std::io::stderr).init();
}
