//! Diagnostic logging to stderr.
//!
//! `HOOKGATE_DEBUG=1` turns on debug-level acquire/release/backoff events.
//! Otherwise `RUST_LOG` applies, defaulting to warnings only so hook output
//! stays clean.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub fn init(debug: bool) -> WorkerGuard {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(false)
        .init();

    guard
}
