//! API contract model
//!
//! The coverage engine reads contracts through the [`ContractSource`] trait so
//! it does not depend on how a document was loaded. [`SwaggerDocument`] is the
//! serde model of a single-file Swagger 2.0 document with a local
//! `definitions` table.

pub mod swagger;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use swagger::{Operation, ParameterOrRef, PathItem, SwaggerDocument};

/// Name of the document section that holds reusable schemas.
pub const DEFINITIONS_SECTION: &str = "definitions";

/// Named schema definitions keyed by definition name.
pub type Definitions = BTreeMap<String, Schema>;

/// Read access to a parsed API contract.
pub trait ContractSource {
    /// Every declared operation as a `"METHOD PATH"` descriptor.
    fn operation_method_paths(&self) -> Vec<String>;

    /// Parameters declared for one operation, path-level parameters included.
    fn params_for(&self, method: &str, path: &str) -> Vec<Parameter>;

    /// The document's local definitions table.
    fn definitions(&self) -> &Definitions;
}

/// Where a parameter is carried in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterLocation {
    Query,
    Body,
    Header,
    Path,
    FormData,
    #[serde(other)]
    Other,
}

/// A declared operation parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

impl Parameter {
    pub fn query<S: Into<String>>(name: S) -> Self {
        Self { name: name.into(), location: ParameterLocation::Query, schema: None }
    }

    pub fn body<S: Into<String>>(name: S, schema: Option<Schema>) -> Self {
        Self { name: name.into(), location: ParameterLocation::Body, schema }
    }
}

/// The subset of a JSON schema that coverage needs: an optional `$ref`
/// pointer and the named properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Schema>,
}

impl Schema {
    /// Schema that points at a local definition: `#/definitions/<name>`.
    pub fn reference_to<S: AsRef<str>>(definition: S) -> Self {
        Self {
            reference: Some(format!("#/{}/{}", DEFINITIONS_SECTION, definition.as_ref())),
            properties: BTreeMap::new(),
        }
    }

    /// Object schema with the given properties and no reference.
    pub fn object<I, K>(properties: I) -> Self
    where
        I: IntoIterator<Item = (K, Schema)>,
        K: Into<String>,
    {
        Self {
            reference: None,
            properties: properties.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Whether the schema carries a non-empty `$ref`.
    pub fn has_reference(&self) -> bool {
        self.reference.as_deref().is_some_and(|r| !r.is_empty())
    }
}
