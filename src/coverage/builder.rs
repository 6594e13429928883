//! Model builder
//!
//! Walks every operation of a contract and produces the expected-coverage
//! skeleton: one [`Endpoint`] per retained (path, method), seeded with every
//! query parameter and body leaf field at a hit count of 0.

use tracing::{debug, info, warn};

use super::model::{Coverage, Endpoint};
use super::resolver::{Resolution, SchemaResolver};
use crate::contract::{ContractSource, Definitions, Parameter, ParameterLocation};
use crate::errors::{Error, Result};

/// Build the coverage model for `document`, keeping only paths that start
/// with `filter` after lower-casing.
///
/// Fails with [`Error::InvalidOperationFormat`] when an operation descriptor
/// is not exactly `"METHOD PATH"`; no partial model is returned.
pub fn build_model<C: ContractSource + ?Sized>(document: &C, filter: &str) -> Result<Coverage> {
    let mut coverage = Coverage::new();
    let definitions = document.definitions();
    let mut skipped = 0usize;

    for descriptor in document.operation_method_paths() {
        let (raw_method, raw_path) = split_descriptor(&descriptor)?;
        let method = raw_method.to_lowercase();
        let path = raw_path.to_lowercase();

        if !path.starts_with(filter) {
            skipped += 1;
            continue;
        }

        let endpoint = coverage.endpoint_entry(&path, &method);
        add_params(endpoint, &document.params_for(raw_method, raw_path), definitions);
    }

    info!(
        endpoints = coverage.endpoint_count(),
        filtered_out = skipped,
        filter = %filter,
        "Built coverage model"
    );

    Ok(coverage)
}

fn split_descriptor(descriptor: &str) -> Result<(&str, &str)> {
    let mut tokens = descriptor.split(' ');
    match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(method), Some(path), None) => Ok((method, path)),
        _ => Err(Error::invalid_operation(descriptor)),
    }
}

/// Register the coverage units of `params` on `endpoint`.
fn add_params(endpoint: &mut Endpoint, params: &[Parameter], definitions: &Definitions) {
    let resolver = SchemaResolver::new(definitions);

    for param in params {
        match param.location {
            ParameterLocation::Query => {
                endpoint.register_query(param.name.as_str());
            }
            ParameterLocation::Body => match &param.schema {
                Some(schema) => {
                    let mut leaves = Vec::new();
                    match resolver.resolve(schema, &param.name, &mut leaves) {
                        Resolution::Resolved(count) => {
                            debug!(
                                method = %endpoint.method,
                                path = %endpoint.path,
                                param = %param.name,
                                leaves = count,
                                "Resolved body schema"
                            );
                        }
                        Resolution::Unsupported(reason) => {
                            warn!(
                                method = %endpoint.method,
                                path = %endpoint.path,
                                param = %param.name,
                                reason = %reason,
                                "Body schema reference not supported, parameter not counted"
                            );
                        }
                    }
                    for leaf in leaves {
                        endpoint.register_body(leaf);
                    }
                }
                None => {
                    endpoint.register_body(param.name.as_str());
                }
            },
            ParameterLocation::Header
            | ParameterLocation::Path
            | ParameterLocation::FormData
            | ParameterLocation::Other => {}
        }
    }
}
