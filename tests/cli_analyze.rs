//! End-to-end runs of the `analyze` and `model` commands.

use clap::Parser;
use restcov::cli::{run, Cli, RunOutcome};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const CONTRACT: &str = r##"{
  "swagger": "2.0",
  "paths": {
    "/widgets": {
      "get": {},
      "post": {
        "parameters": [
          {"name": "limit", "in": "query", "type": "integer"},
          {"name": "body", "in": "body", "schema": {"$ref": "#/definitions/Widget"}}
        ]
      }
    }
  },
  "definitions": {
    "Widget": {"properties": {"name": {"type": "string"}, "size": {"type": "integer"}}}
  }
}"##;

const OBSERVATIONS: &str = r#"{"method":"GET","path":"/widgets"}
{"method":"POST","path":"/widgets?limit=5","body":{"name":"sprocket"}}
{"method":"GET","path":"/gadgets"}
"#;

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().expect("temp dir");
        std::fs::write(dir.path().join("swagger.json"), CONTRACT).expect("write contract");
        std::fs::write(dir.path().join("calls.jsonl"), OBSERVATIONS).expect("write observations");
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn arg(&self, name: &str) -> String {
        self.path(name).display().to_string()
    }

    fn cli(&self, command: &str, extra: &[&str]) -> Cli {
        let mut args = vec![
            "restcov".to_string(),
            command.to_string(),
            "--config".to_string(),
            self.arg("missing.toml"),
            "--contract".to_string(),
            self.arg("swagger.json"),
        ];
        args.extend(extra.iter().map(|s| s.to_string()));
        Cli::try_parse_from(args).expect("parse args")
    }
}

fn read_json(path: &Path) -> serde_json::Value {
    let contents = std::fs::read_to_string(path).expect("read report");
    serde_json::from_str(&contents).expect("report is json")
}

#[tokio::test]
async fn analyze_writes_json_report() {
    let fixture = Fixture::new();
    let report_path = fixture.path("out/report.json");
    let cli = fixture.cli(
        "analyze",
        &[
            "--observations",
            &fixture.arg("calls.jsonl"),
            "--format",
            "json",
            "--output",
            &report_path.display().to_string(),
        ],
    );

    let outcome = run(cli).await.expect("analyze");
    assert_eq!(outcome, RunOutcome::Completed { percent: 80.0 });

    let report = read_json(&report_path);
    assert_eq!(report["observedCalls"], 3);
    assert_eq!(report["unmatchedCalls"], 1);
    assert_eq!(report["coverage"]["percent"], 80.0);
    assert_eq!(report["coverage"]["endpoints"]["/widgets"]["post"]["uniqueHits"], 3);
    assert_eq!(
        report["coverage"]["endpoints"]["/widgets"]["post"]["paramsHitsDetails"]["body"]
            ["body.size"],
        0
    );
}

#[tokio::test]
async fn analyze_reports_threshold_failure() {
    let fixture = Fixture::new();
    let cli = fixture.cli(
        "analyze",
        &[
            "--observations",
            &fixture.arg("calls.jsonl"),
            "--fail-under",
            "90",
            "--output",
            &fixture.arg("report.txt"),
        ],
    );

    let outcome = run(cli).await.expect("analyze");
    assert_eq!(outcome, RunOutcome::BelowThreshold { percent: 80.0, minimum: 90.0 });
    assert_eq!(outcome.exit_code(), 4);

    let table = std::fs::read_to_string(fixture.path("report.txt")).expect("read table");
    assert!(table.contains("TOTAL 4/5 units, 80.00% (3 calls observed, 1 unmatched)"));
}

#[tokio::test]
async fn model_command_reports_zero_coverage() {
    let fixture = Fixture::new();
    let report_path = fixture.path("model.yaml");
    let cli = fixture.cli(
        "model",
        &["--format", "yaml", "--output", &report_path.display().to_string()],
    );

    let outcome = run(cli).await.expect("model");
    assert_eq!(outcome, RunOutcome::Completed { percent: 0.0 });

    let contents = std::fs::read_to_string(&report_path).expect("read report");
    let report: serde_yaml::Value = serde_yaml::from_str(&contents).expect("report is yaml");
    assert_eq!(report["coverage"]["expectedUniqueHits"].as_u64(), Some(5));
    assert_eq!(report["observedCalls"].as_u64(), Some(0));
}

#[tokio::test]
async fn missing_contract_is_a_contract_error() {
    let fixture = Fixture::new();
    let cli = Cli::try_parse_from([
        "restcov".to_string(),
        "model".to_string(),
        "--config".to_string(),
        fixture.arg("missing.toml"),
        "--contract".to_string(),
        fixture.arg("nope.json"),
    ])
    .expect("parse args");

    let err = run(cli).await.expect_err("missing contract");
    let contract_err = err.downcast_ref::<restcov::Error>().expect("restcov error");
    assert!(matches!(contract_err, restcov::Error::Contract { .. }));
    assert_eq!(contract_err.exit_code(), 3);
}
