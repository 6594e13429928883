//! # Coverage engine
//!
//! ```text
//! contract ──build_model──▶ Coverage (expected units, counts at 0)
//!                               │  record_call / HitRecorder
//!                               ▼
//!                           Coverage (raw counts) ──aggregate──▶ percentages
//! ```
//!
//! - `model`: the [`Coverage`] and [`Endpoint`] data model
//! - `builder`: expected-unit discovery from a [`crate::contract::ContractSource`]
//! - `resolver`: `$ref` expansion into dotted body leaf paths
//! - `aggregate`: saturation and percentage computation

pub mod aggregate;
pub mod builder;
pub mod model;
pub mod resolver;

pub use aggregate::percentage;
pub use builder::build_model;
pub use model::{Coverage, Endpoint, EndpointMap, ParamsHitsDetails};
pub use resolver::{decode_reference, Resolution, SchemaResolver, UnsupportedReference};
