//! # Command Line Interface
//!
//! `restcov analyze` builds the coverage model for a contract, replays an
//! observation log through the recorder and writes a report. `restcov model`
//! prints the expected-coverage skeleton without any observations.

pub mod output;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn, Instrument};

use crate::config::Settings;
use crate::contract::SwaggerDocument;
use crate::coverage::build_model;
use crate::observability::{init_logging, log_settings};
use crate::observations::read_observations;
use crate::recorder::HitRecorder;
use crate::report::{CoverageReport, ReportFormat};

/// Exit code used when coverage is below `--fail-under`.
pub const EXIT_BELOW_THRESHOLD: i32 = 4;

#[derive(Parser, Debug)]
#[command(name = "restcov")]
#[command(about = "REST API test coverage from Swagger contracts")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "restcov.toml")]
    pub config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute coverage from a contract and an observation log
    Analyze {
        #[command(flatten)]
        run: RunArgs,

        /// JSON Lines file of observed calls
        #[arg(long)]
        observations: Option<String>,

        /// Exit with a non-zero status when overall coverage is below this percentage
        #[arg(long)]
        fail_under: Option<f64>,
    },

    /// Print the expected coverage model for a contract
    Model {
        #[command(flatten)]
        run: RunArgs,
    },
}

/// Flags shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Swagger contract (JSON or YAML)
    #[arg(long)]
    pub contract: Option<String>,

    /// Only count paths starting with this prefix
    #[arg(long)]
    pub filter: Option<String>,

    /// Report format
    #[arg(long, value_enum)]
    pub format: Option<ReportFormat>,

    /// Write the report to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RunOutcome {
    Completed { percent: f64 },
    BelowThreshold { percent: f64, minimum: f64 },
}

impl RunOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::Completed { .. } => 0,
            RunOutcome::BelowThreshold { .. } => EXIT_BELOW_THRESHOLD,
        }
    }
}

impl Cli {
    /// Layer CLI flags over file and environment settings.
    pub fn settings(&self) -> crate::Result<Settings> {
        let mut settings = Settings::load(Some(self.config.as_path()))?;
        self.apply_overrides(&mut settings);
        Ok(settings)
    }

    fn apply_overrides(&self, settings: &mut Settings) {
        let run = match &self.command {
            Commands::Analyze { run, observations, fail_under } => {
                if let Some(observations) = observations {
                    settings.observations = Some(observations.clone());
                }
                if let Some(fail_under) = fail_under {
                    settings.fail_under = Some(*fail_under);
                }
                run
            }
            Commands::Model { run } => {
                settings.observations = None;
                settings.fail_under = None;
                run
            }
        };

        if let Some(contract) = &run.contract {
            settings.contract = contract.clone();
        }
        if let Some(filter) = &run.filter {
            settings.filter = filter.clone();
        }
        if let Some(format) = run.format {
            settings.format = format;
        }
        if let Some(output) = &run.output {
            settings.output = Some(output.clone());
        }
    }
}

/// Run CLI commands
pub async fn run_cli() -> anyhow::Result<RunOutcome> {
    let cli = Cli::parse();
    run(cli).await
}

/// Execute a parsed command line.
pub async fn run(cli: Cli) -> anyhow::Result<RunOutcome> {
    let settings = cli.settings()?;
    init_logging(&settings.logging, cli.verbose);
    settings.validate()?;
    log_settings(&settings);

    let span = crate::analysis_span!(settings.contract, filter = %settings.filter);
    analyze(&settings).instrument(span).await
}

async fn analyze(settings: &Settings) -> anyhow::Result<RunOutcome> {
    let document = SwaggerDocument::from_path(settings.contract_path())
        .with_context(|| format!("Failed to load contract {}", settings.contract))?;
    let coverage = build_model(&document, &settings.filter)?;

    let calls = match &settings.observations {
        Some(path) => read_observations(path)
            .with_context(|| format!("Failed to read observations {}", path))?,
        None => Vec::new(),
    };

    let recorder = HitRecorder::spawn(coverage);
    for call in calls {
        recorder.record(call)?;
    }
    let summary = recorder.finish().await?;

    let mut coverage = summary.coverage;
    coverage.aggregate();
    report_unmatched(summary.unmatched, document.base_path.as_deref());
    info!(
        percent = coverage.percent,
        unique_hits = coverage.unique_hits,
        expected_unique_hits = coverage.expected_unique_hits,
        "Coverage computed"
    );

    let percent = coverage.percent;
    let report = CoverageReport::new(coverage, settings.filter.clone())
        .with_calls(summary.matched, summary.unmatched);
    output::write_report(&report, settings.format, settings.output.as_deref().map(Path::new))?;

    match settings.fail_under {
        Some(minimum) if settings.is_below_threshold(percent) => {
            warn!(percent, minimum, "Coverage is below the required minimum");
            Ok(RunOutcome::BelowThreshold { percent, minimum })
        }
        _ => Ok(RunOutcome::Completed { percent }),
    }
}

/// Warn about observed calls that matched no endpoint. Contract paths are
/// keyed without `basePath`, so a declared base path is the usual culprit.
fn report_unmatched(unmatched: u64, base_path: Option<&str>) {
    if unmatched == 0 {
        return;
    }
    match base_path.filter(|base| !base.is_empty() && *base != "/") {
        Some(base_path) => warn!(
            unmatched,
            base_path,
            "Some observed calls match no contract endpoint; paths are matched without basePath"
        ),
        None => warn!(unmatched, "Some observed calls match no contract endpoint"),
    }
}
