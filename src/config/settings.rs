//! # Configuration Settings
//!
//! Run settings for a coverage analysis. Values are layered: defaults, then an
//! optional TOML file, then `RESTCOV_*` environment variables, then CLI flags.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use validator::Validate;

use crate::errors::{Error, Result};
use crate::report::ReportFormat;

/// Prefix shared by every environment variable the settings read.
pub const ENV_PREFIX: &str = "RESTCOV_";

/// Main run configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Settings {
    /// Path of the Swagger contract
    #[validate(length(min = 1, message = "Contract path cannot be empty"))]
    pub contract: String,

    /// Optional JSON Lines observation log
    pub observations: Option<String>,

    /// Path prefix filter applied after lower-casing
    pub filter: String,

    /// Report output format
    pub format: ReportFormat,

    /// Report destination; stdout when unset
    pub output: Option<String>,

    /// Minimum overall coverage percentage
    #[validate(range(min = 0.0, max = 100.0, message = "fail_under must be between 0 and 100"))]
    pub fail_under: Option<f64>,

    /// Logging configuration
    #[validate(nested)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub level: String,

    /// Emit JSON log lines
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}

impl Settings {
    /// Load settings from an optional TOML file and the process environment.
    /// A missing file is not an error.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut settings = match file {
            Some(path) if path.exists() => Self::from_toml_file(path)?,
            Some(path) => {
                debug!(config = %path.display(), "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };
        settings.apply_env(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    /// Parse settings from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|err| {
            Error::io(err, format!("Failed to read config file: {}", path.display()))
        })?;
        toml::from_str(&contents).map_err(|err| {
            Error::config(format!("Failed to parse config file {}: {}", path.display(), err))
        })
    }

    /// Override fields from `RESTCOV_*` variables resolved through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(&format!("{}{}", ENV_PREFIX, name))
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(contract) = var("CONTRACT") {
            self.contract = contract;
        }
        if let Some(observations) = var("OBSERVATIONS") {
            self.observations = Some(observations);
        }
        if let Some(filter) = var("FILTER") {
            self.filter = filter;
        }
        if let Some(format) = var("FORMAT") {
            self.format = format.parse()?;
        }
        if let Some(output) = var("OUTPUT") {
            self.output = Some(output);
        }
        if let Some(fail_under) = var("FAIL_UNDER") {
            let value = fail_under.parse::<f64>().map_err(|e| {
                Error::config(format!("Invalid {}FAIL_UNDER: {}", ENV_PREFIX, e))
            })?;
            self.fail_under = Some(value);
        }
        if let Some(level) = var("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(json) = var("LOG_JSON") {
            self.logging.json = matches!(json.to_lowercase().as_str(), "1" | "true" | "yes" | "on");
        }
        Ok(())
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(Error::from)?;

        if self.filter.chars().any(char::is_uppercase) {
            return Err(Error::validation_field(
                "Filter is matched against lower-cased paths and must be lower case",
                "filter",
            ));
        }

        Ok(())
    }

    pub fn contract_path(&self) -> PathBuf {
        PathBuf::from(&self.contract)
    }

    /// Whether `percent` falls below the configured threshold.
    pub fn is_below_threshold(&self, percent: f64) -> bool {
        self.fail_under.is_some_and(|minimum| percent < minimum)
    }
}
