//! # Coverage reports
//!
//! Renders an aggregated [`Coverage`] as JSON, YAML or a plain-text table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::str::FromStr;

use crate::coverage::Coverage;
use crate::errors::{Error, Result};

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

impl FromStr for ReportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "yaml" => Ok(ReportFormat::Yaml),
            "table" => Ok(ReportFormat::Table),
            _ => Err(Error::validation_field(
                format!("Unsupported output format: '{}'. Use 'json', 'yaml', or 'table'.", s),
                "format",
            )),
        }
    }
}

/// A serializable report: run metadata plus the aggregated model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageReport {
    pub generated_at: DateTime<Utc>,
    pub filter: String,
    pub observed_calls: u64,
    pub unmatched_calls: u64,
    pub coverage: Coverage,
}

impl CoverageReport {
    pub fn new<S: Into<String>>(coverage: Coverage, filter: S) -> Self {
        Self {
            generated_at: Utc::now(),
            filter: filter.into(),
            observed_calls: 0,
            unmatched_calls: 0,
            coverage,
        }
    }

    pub fn with_calls(mut self, matched: u64, unmatched: u64) -> Self {
        self.observed_calls = matched + unmatched;
        self.unmatched_calls = unmatched;
        self
    }

    /// Render in the requested format.
    pub fn render(&self, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            ReportFormat::Yaml => Ok(serde_yaml::to_string(self)?),
            ReportFormat::Table => Ok(self.render_table()),
        }
    }

    fn render_table(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:<8} {:<48} {:>8} {:>8} {:>8}",
            "METHOD", "PATH", "HITS", "UNIQUE", "PERCENT"
        );
        let _ = writeln!(out, "{}", "-".repeat(84));

        for endpoint in self.coverage.iter_endpoints() {
            let _ = writeln!(
                out,
                "{:<8} {:<48} {:>8} {:>8} {:>7.2}%",
                endpoint.method.to_uppercase(),
                truncate(&endpoint.path, 48),
                endpoint.hits,
                format!("{}/{}", endpoint.unique_hits, endpoint.expected_unique_hits),
                endpoint.percent
            );
            for (name, count) in &endpoint.params_hits_details.query {
                let _ = writeln!(out, "{:<8}   query {:<40} {:>8}", "", truncate(name, 40), count);
            }
            for (name, count) in &endpoint.params_hits_details.body {
                let _ = writeln!(out, "{:<8}   body  {:<40} {:>8}", "", truncate(name, 40), count);
            }
        }

        let _ = writeln!(out, "{}", "-".repeat(84));
        let _ = writeln!(
            out,
            "TOTAL {}/{} units, {:.2}% ({} calls observed, {} unmatched)",
            self.coverage.unique_hits,
            self.coverage.expected_unique_hits,
            self.coverage.percent,
            self.observed_calls,
            self.unmatched_calls
        );
        out
    }
}

/// Truncate string to maximum length with ellipsis
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
