//! Logging configuration for scylla-kit.
//!
//! Logs go to stderr so that stdout only carries command output (the
//! release version, JSON responses, load summaries) and stays pipeable.

use tracing_subscriber::EnvFilter;

/// Level used when neither `--log` nor `RUST_LOG` is set.
const DEFAULT_LEVEL: &str = "info";

/// Builds the filter: an explicit level wins, then `RUST_LOG`, then `info`.
pub fn build_filter(level: Option<&str>) -> EnvFilter {
    if let Some(level) = level {
        if let Ok(filter) = EnvFilter::try_new(level) {
            return filter;
        }
        eprintln!("Warning: invalid log level '{level}', falling back to defaults");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
}

/// Initializes logging to stderr.
pub fn init_stderr_logging(level: Option<&str>) {
    tracing_subscriber::fmt()
        .with_env_filter(build_filter(level))
        .with_writer(std::io::stderr)
        .init();
}
