//! Tracing subscribers. `RUST_LOG` takes precedence over the configured level.

use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Compact, human readable output for development.
pub fn init_dbg_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .without_time()
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_env_filter(env_filter(default_level))
        .compact()
        .init();
}

/// JSON lines for production log collection.
pub fn init_production_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .json()
        .with_current_span(true)
        .with_env_filter(env_filter(default_level))
        .init();
}
