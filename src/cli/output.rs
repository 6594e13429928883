//! Report output for CLI commands
//!
//! Writes a rendered [`CoverageReport`] to stdout or to a file.

use anyhow::{Context, Result};
use std::path::Path;

use crate::report::{CoverageReport, ReportFormat};

/// Render `report` and write it to `output`, or print it when `output` is `None`.
pub fn write_report(
    report: &CoverageReport,
    format: ReportFormat,
    output: Option<&Path>,
) -> Result<()> {
    let rendered = report.render(format).context("Failed to render coverage report")?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write report: {}", path.display()))?;
            tracing::info!(report = %path.display(), format = ?format, "Wrote coverage report");
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::Coverage;

    #[test]
    fn writes_report_into_nested_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("reports").join("coverage.json");
        let report = CoverageReport::new(Coverage::new(), "");

        write_report(&report, ReportFormat::Json, Some(&path)).expect("write");

        let written = std::fs::read_to_string(&path).expect("read");
        let parsed: serde_json::Value = serde_json::from_str(&written).expect("json");
        assert_eq!(parsed["coverage"]["percent"], serde_json::json!(0.0));
    }
}
