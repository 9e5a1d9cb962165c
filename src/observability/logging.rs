//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once per process
//! - Accept a bare level or a full filter directive
//! - Switch between compact and JSON output
//!
//! `RUST_LOG` wins over the configured level when set.

use std::str::FromStr;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Build the filter for a configured level.
///
/// A bare level such as `debug` quiets the HTTP transport crates; a string
/// with `,` or `=` is used verbatim.
pub fn build_filter(log_level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    let normalized = log_level.trim();
    let spec = if normalized.contains(',') || normalized.contains('=') {
        normalized.to_string()
    } else {
        format!(
            "{},hyper=info,hyper_util=info,reqwest=info,alloy_transport_http=info",
            normalized
        )
    };
    EnvFilter::from_str(&spec).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber.
pub fn init_logging(log_level: &str, json: bool) {
    let subscriber = tracing_subscriber::registry().with(build_filter(log_level));

    if json {
        subscriber
            .with(fmt::layer().json().with_target(false).with_current_span(false))
            .init();
    } else {
        subscriber.with(fmt::layer().with_target(true).compact()).init();
    }

    tracing::debug!(
        level = log_level,
        format = if json { "json" } else { "compact" },
        "Logging initialized"
    );
}
