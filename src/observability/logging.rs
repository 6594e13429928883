//! # Structured Logging
//!
//! Logging setup on top of the tracing ecosystem. `RUST_LOG` wins when set;
//! otherwise the configured level (or `debug` when verbose) is used.

use tracing_subscriber::EnvFilter;

use crate::config::{LoggingConfig, Settings};

/// Create a tracing span for one analysis run.
#[macro_export]
macro_rules! analysis_span {
    ($contract:expr) => {
        tracing::info_span!("coverage_analysis", contract = %$contract)
    };
    ($contract:expr, $($field:tt)*) => {
        tracing::info_span!("coverage_analysis", contract = %$contract, $($field)*)
    };
}

/// Filter directive used when `RUST_LOG` is unset.
pub fn default_directive(config: &LoggingConfig, verbose: bool) -> String {
    if verbose {
        "debug".to_string()
    } else {
        config.level.clone()
    }
}

/// Install the global subscriber. Logs go to stderr so that reports written
/// to stdout stay machine-readable.
pub fn init_logging(config: &LoggingConfig, verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config, verbose)));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);

    // A subscriber may already be installed by an embedding test harness.
    let _ = if config.json { builder.json().try_init() } else { builder.try_init() };
}

/// Log the effective settings at startup
pub fn log_settings(settings: &Settings) {
    tracing::info!(
        contract = %settings.contract,
        observations = ?settings.observations,
        filter = %settings.filter,
        format = ?settings.format,
        fail_under = ?settings.fail_under,
        "restcov configuration"
    );
}
