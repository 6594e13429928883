//! # Observability Infrastructure
//!
//! Structured logging for restcov runs.

pub mod logging;

pub use logging::{init_logging, log_settings};
