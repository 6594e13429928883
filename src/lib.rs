//! # restcov
//!
//! REST API test coverage: of all the (path, method, parameter) units an API
//! contract declares, how many did a test run exercise?
//!
//! ## Architecture
//!
//! ```text
//! Swagger contract ──▶ Model Builder ──▶ Coverage skeleton
//!                                             │
//! observed calls ──▶ HitRecorder ─────────────┤
//!                                             ▼
//!                         Aggregator ──▶ CoverageReport (json / yaml / table)
//! ```
//!
//! A coverage unit is either "this endpoint was called" or "this query
//! parameter / body leaf field was present on a call". Body leaf fields are
//! discovered by following `$ref` pointers through the contract's local
//! `definitions`.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use restcov::{build_model, ObservedCall, Result, SwaggerDocument};
//!
//! fn main() -> Result<()> {
//!     let document = SwaggerDocument::from_path("swagger.json")?;
//!     let mut coverage = build_model(&document, "/api")?;
//!     coverage.record_call(&ObservedCall::new("GET", "/api/widgets?limit=5"));
//!     coverage.aggregate();
//!     println!("{:.2}%", coverage.percent);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod contract;
pub mod coverage;
pub mod errors;
pub mod observability;
pub mod observations;
pub mod recorder;
pub mod report;

// Re-export commonly used types and traits
pub use config::Settings;
pub use contract::{ContractSource, Parameter, ParameterLocation, Schema, SwaggerDocument};
pub use coverage::{build_model, Coverage, Endpoint, ParamsHitsDetails, Resolution};
pub use errors::{Error, Result};
pub use observations::ObservedCall;
pub use recorder::{HitRecorder, RecordOutcome, RecordingSummary};
pub use report::{CoverageReport, ReportFormat};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
