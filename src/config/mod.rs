//! # Configuration Management
//!
//! Layered run configuration for restcov. See [`Settings`].

pub mod settings;

pub use settings::{LoggingConfig, Settings, ENV_PREFIX};
