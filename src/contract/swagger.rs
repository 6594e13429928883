//! Swagger 2.0 document model and loader.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

use super::{ContractSource, Definitions, Parameter};
use crate::errors::{Error, Result};

const PARAMETERS_REF_PREFIX: &str = "#/parameters/";
const EXTENSION_PREFIX: &str = "x-";

/// A parsed single-file Swagger 2.0 document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwaggerDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swagger: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    #[serde(default, deserialize_with = "deserialize_paths")]
    pub paths: BTreeMap<String, PathItem>,
    #[serde(default)]
    pub definitions: Definitions,
    /// Reusable parameters addressed by `#/parameters/<name>`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, Parameter>,
}

/// Operations declared for one path template.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    /// Parameters shared by every operation of the path.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterOrRef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterOrRef>,
}

/// A parameter declared inline or referenced from the document's
/// `parameters` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterOrRef {
    Reference {
        #[serde(rename = "$ref")]
        reference: String,
    },
    Item(Parameter),
}

/// Parse the Paths Object, skipping `x-` vendor extensions, which may hold
/// any value.
fn deserialize_paths<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, PathItem>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
    raw.into_iter()
        .filter(|(key, _)| !key.starts_with(EXTENSION_PREFIX))
        .map(|(key, value)| {
            serde_json::from_value(value)
                .map(|item| (key.clone(), item))
                .map_err(|err| serde::de::Error::custom(format!("path '{}': {}", key, err)))
        })
        .collect()
}

impl PathItem {
    /// Declared operations paired with their lower-case method name.
    pub fn operations(&self) -> impl Iterator<Item = (&'static str, &Operation)> {
        [
            ("get", &self.get),
            ("put", &self.put),
            ("post", &self.post),
            ("delete", &self.delete),
            ("options", &self.options),
            ("head", &self.head),
            ("patch", &self.patch),
        ]
        .into_iter()
        .filter_map(|(method, op)| op.as_ref().map(|op| (method, op)))
    }

    /// Look up an operation by method, ignoring case.
    pub fn operation(&self, method: &str) -> Option<&Operation> {
        let method = method.to_ascii_lowercase();
        self.operations().find(|(name, _)| *name == method).map(|(_, op)| op)
    }
}

impl SwaggerDocument {
    /// Parse a document from a JSON string.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|err| {
            Error::contract_with_source("Failed to parse JSON contract", Box::new(err))
        })
    }

    /// Parse a document from a YAML string.
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        serde_yaml::from_str(raw).map_err(|err| {
            Error::contract_with_source("Failed to parse YAML contract", Box::new(err))
        })
    }

    /// Load a document from disk. Files ending in `.json` are parsed as JSON,
    /// everything else as YAML.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| {
            Error::contract_with_source(
                format!("Failed to read contract {}", path.display()),
                Box::new(err),
            )
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let document = if is_json { Self::from_json_str(&raw)? } else { Self::from_yaml_str(&raw)? };

        match document.swagger.as_deref() {
            Some("2.0") => {}
            Some(other) => warn!(
                contract = %path.display(),
                version = other,
                "Contract is not Swagger 2.0, coverage may be under-counted"
            ),
            None => warn!(contract = %path.display(), "Contract does not declare a swagger version"),
        }

        debug!(
            contract = %path.display(),
            paths = document.paths.len(),
            definitions = document.definitions.len(),
            "Loaded API contract"
        );

        Ok(document)
    }

    fn resolve_parameter(&self, param: &ParameterOrRef) -> Option<Parameter> {
        match param {
            ParameterOrRef::Item(param) => Some(param.clone()),
            ParameterOrRef::Reference { reference } => {
                let resolved = reference
                    .strip_prefix(PARAMETERS_REF_PREFIX)
                    .and_then(|name| self.parameters.get(name))
                    .cloned();
                if resolved.is_none() {
                    debug!(reference = %reference, "Skipping unresolvable parameter reference");
                }
                resolved
            }
        }
    }
}

impl ContractSource for SwaggerDocument {
    fn operation_method_paths(&self) -> Vec<String> {
        self.paths
            .iter()
            .flat_map(|(path, item)| {
                item.operations()
                    .map(move |(method, _)| format!("{} {}", method.to_ascii_uppercase(), path))
            })
            .collect()
    }

    fn params_for(&self, method: &str, path: &str) -> Vec<Parameter> {
        let Some(item) = self.paths.get(path) else {
            return Vec::new();
        };

        // Operation parameters override path-level ones with the same (in, name).
        let mut merged: Vec<Parameter> = Vec::new();
        let declared = item.parameters.iter().chain(
            item.operation(method).map(|op| op.parameters.as_slice()).unwrap_or_default(),
        );
        for param in declared.filter_map(|p| self.resolve_parameter(p)) {
            match merged
                .iter_mut()
                .find(|existing| existing.name == param.name && existing.location == param.location)
            {
                Some(existing) => *existing = param,
                None => merged.push(param),
            }
        }
        merged
    }

    fn definitions(&self) -> &Definitions {
        &self.definitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{ParameterLocation, Schema};
    use serde_json::json;

    fn sample() -> SwaggerDocument {
        serde_json::from_value(json!({
            "swagger": "2.0",
            "parameters": {
                "pretty": {"name": "pretty", "in": "query"}
            },
            "paths": {
                "/widgets": {
                    "parameters": [
                        {"$ref": "#/parameters/pretty"},
                        {"name": "limit", "in": "query"}
                    ],
                    "get": {"operationId": "listWidgets"},
                    "post": {
                        "parameters": [
                            {"name": "limit", "in": "query"},
                            {"name": "body", "in": "body", "schema": {"$ref": "#/definitions/Widget"}},
                            {"$ref": "#/parameters/missing"}
                        ]
                    }
                }
            },
            "definitions": {
                "Widget": {"properties": {"name": {"type": "string"}}}
            }
        }))
        .expect("parse swagger")
    }

    #[test]
    fn enumerates_method_path_descriptors() {
        let doc = sample();
        let mut ops = doc.operation_method_paths();
        ops.sort();
        assert_eq!(ops, vec!["GET /widgets".to_string(), "POST /widgets".to_string()]);
    }

    #[test]
    fn merges_path_and_operation_parameters() {
        let doc = sample();

        let get_params = doc.params_for("GET", "/widgets");
        let names: Vec<&str> = get_params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["pretty", "limit"]);

        let post_params = doc.params_for("post", "/widgets");
        assert_eq!(post_params.len(), 3);
        let body = post_params
            .iter()
            .find(|p| p.location == ParameterLocation::Body)
            .expect("body parameter");
        assert_eq!(body.schema, Some(Schema::reference_to("Widget")));
    }

    #[test]
    fn vendor_extensions_in_paths_are_skipped() {
        let json = SwaggerDocument::from_json_str(
            r#"{"swagger":"2.0","paths":{"x-internal":"ignored by tools","/widgets":{"get":{}}}}"#,
        )
        .expect("load json");
        assert_eq!(json.operation_method_paths(), vec!["GET /widgets".to_string()]);

        let yaml = SwaggerDocument::from_yaml_str(
            "swagger: '2.0'\npaths:\n  x-owner: [team-a, team-b]\n  /ping:\n    get: {}\n",
        )
        .expect("load yaml");
        assert_eq!(yaml.paths.len(), 1);
        assert!(yaml.paths.contains_key("/ping"));
    }

    #[test]
    fn malformed_path_item_names_the_path() {
        let err = SwaggerDocument::from_json_str(r#"{"paths":{"/widgets":{"get":42}}}"#)
            .expect_err("invalid operation");
        let source = std::error::Error::source(&err).map(ToString::to_string).unwrap_or_default();
        assert!(source.contains("/widgets"), "unexpected error: {}", source);
    }

    #[test]
    fn unknown_path_has_no_parameters() {
        assert!(sample().params_for("GET", "/nothing").is_empty());
    }

    #[test]
    fn loads_yaml_and_json_files() {
        let dir = tempfile::tempdir().expect("tempdir");

        let yaml_path = dir.path().join("contract.yaml");
        std::fs::write(
            &yaml_path,
            "swagger: '2.0'\npaths:\n  /ping:\n    get: {}\ndefinitions: {}\n",
        )
        .expect("write yaml");
        let yaml = SwaggerDocument::from_path(&yaml_path).expect("load yaml");
        assert_eq!(yaml.operation_method_paths(), vec!["GET /ping".to_string()]);

        let json_path = dir.path().join("contract.json");
        std::fs::write(&json_path, r#"{"swagger":"2.0","paths":{"/ping":{"head":{}}}}"#)
            .expect("write json");
        let json = SwaggerDocument::from_path(&json_path).expect("load json");
        assert_eq!(json.operation_method_paths(), vec!["HEAD /ping".to_string()]);
    }

    #[test]
    fn reports_missing_and_malformed_files() {
        let missing = SwaggerDocument::from_path("/definitely/not/here.json");
        assert!(matches!(missing, Err(Error::Contract { .. })));
        assert_eq!(missing.map(|_| ()).map_err(|err| err.exit_code()), Err(3));

        let malformed = SwaggerDocument::from_json_str("{not json");
        assert!(matches!(malformed, Err(Error::Contract { .. })));
    }
}
