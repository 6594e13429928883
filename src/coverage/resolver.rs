//! `$ref` resolution into body leaf fields
//!
//! A body schema is expanded into dotted field paths rooted at the parameter
//! name: `body` referencing `Widget{name, size}` yields `body.name` and
//! `body.size`. References are followed through the document's local
//! `definitions` table only. Anything else resolves to zero units and is
//! reported as [`Resolution::Unsupported`] rather than failing the build.

use std::fmt;
use tracing::debug;

use crate::contract::{Definitions, Schema, DEFINITIONS_SECTION};

/// Outcome of resolving one schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The schema expanded into this many leaf units.
    Resolved(usize),
    /// The reference could not be followed; it contributes no units.
    Unsupported(UnsupportedReference),
}

impl Resolution {
    /// Leaf units contributed by this resolution.
    pub fn units(&self) -> usize {
        match self {
            Resolution::Resolved(count) => *count,
            Resolution::Unsupported(_) => 0,
        }
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Resolution::Unsupported(_))
    }
}

/// Why a reference could not be resolved locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsupportedReference {
    /// Points into another document.
    External { reference: String },
    /// Fewer than two pointer segments, or not a JSON pointer at all.
    Malformed { reference: String },
    /// Points into a section other than `definitions`.
    ForeignSection { reference: String, section: String },
    /// Names a definition the document does not declare.
    MissingDefinition { reference: String, name: String },
}

impl fmt::Display for UnsupportedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnsupportedReference::External { reference } => {
                write!(f, "external reference '{}'", reference)
            }
            UnsupportedReference::Malformed { reference } => {
                write!(f, "malformed reference '{}'", reference)
            }
            UnsupportedReference::ForeignSection { reference, section } => {
                write!(f, "reference '{}' points into '{}'", reference, section)
            }
            UnsupportedReference::MissingDefinition { reference, name } => {
                write!(f, "reference '{}' names unknown definition '{}'", reference, name)
            }
        }
    }
}

/// Decode a `$ref` value into JSON pointer segments.
///
/// Only same-document references (`#/...`) are accepted. `~1` and `~0`
/// escapes are decoded.
pub fn decode_reference(reference: &str) -> Result<Vec<String>, UnsupportedReference> {
    let Some((document, fragment)) = reference.split_once('#') else {
        return Err(UnsupportedReference::External { reference: reference.to_string() });
    };
    if !document.is_empty() {
        return Err(UnsupportedReference::External { reference: reference.to_string() });
    }
    if fragment.is_empty() {
        return Ok(Vec::new());
    }
    let Some(pointer) = fragment.strip_prefix('/') else {
        return Err(UnsupportedReference::Malformed { reference: reference.to_string() });
    };

    Ok(pointer.split('/').map(|token| token.replace("~1", "/").replace("~0", "~")).collect())
}

/// Expands body schemas into leaf field paths against one definitions table.
pub struct SchemaResolver<'a> {
    definitions: &'a Definitions,
}

impl<'a> SchemaResolver<'a> {
    pub fn new(definitions: &'a Definitions) -> Self {
        Self { definitions }
    }

    /// Resolve `schema` rooted at `path`, appending every leaf path to `leaves`.
    pub fn resolve(&self, schema: &Schema, path: &str, leaves: &mut Vec<String>) -> Resolution {
        let mut visiting = Vec::new();
        self.resolve_inner(schema, path, leaves, &mut visiting)
    }

    fn resolve_inner(
        &self,
        schema: &Schema,
        path: &str,
        leaves: &mut Vec<String>,
        visiting: &mut Vec<String>,
    ) -> Resolution {
        let Some(reference) = schema.reference.as_deref().filter(|r| !r.is_empty()) else {
            leaves.push(path.to_string());
            return Resolution::Resolved(1);
        };

        let name = match self.definition_name(reference) {
            Ok(name) => name,
            Err(reason) => return Resolution::Unsupported(reason),
        };
        let Some(definition) = self.definitions.get(&name) else {
            return Resolution::Unsupported(UnsupportedReference::MissingDefinition {
                reference: reference.to_string(),
                name,
            });
        };

        if visiting.contains(&name) {
            debug!(path = %path, definition = %name, "Cyclic definition reference, counting as leaf");
            leaves.push(path.to_string());
            return Resolution::Resolved(1);
        }

        if definition.properties.is_empty() {
            leaves.push(path.to_string());
            return Resolution::Resolved(1);
        }

        visiting.push(name);
        let mut count = 0;
        for (property, property_schema) in &definition.properties {
            let property_path = format!("{}.{}", path, property);
            match self.resolve_inner(property_schema, &property_path, leaves, visiting) {
                Resolution::Resolved(units) => count += units,
                Resolution::Unsupported(reason) => {
                    debug!(path = %property_path, reason = %reason, "Skipping unsupported property reference");
                }
            }
        }
        visiting.pop();

        Resolution::Resolved(count)
    }

    fn definition_name(&self, reference: &str) -> Result<String, UnsupportedReference> {
        let mut tokens = decode_reference(reference)?;
        if tokens.len() < 2 {
            return Err(UnsupportedReference::Malformed { reference: reference.to_string() });
        }
        if tokens[0] != DEFINITIONS_SECTION {
            return Err(UnsupportedReference::ForeignSection {
                reference: reference.to_string(),
                section: tokens.swap_remove(0),
            });
        }
        Ok(tokens.swap_remove(1))
    }
}
