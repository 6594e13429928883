//! # Error Handling
//!
//! Error types for coverage analysis. The only failure the model builder
//! raises is [`Error::InvalidOperationFormat`]; unresolvable references and
//! unknown parameter locations are absorbed as under-counting.

pub mod types;

pub use types::{Error, Result};
