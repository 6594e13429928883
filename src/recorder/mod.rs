//! # Hit recording
//!
//! Applies [`ObservedCall`]s to a [`Coverage`] model. Endpoints are located by
//! lower-cased method and path, falling back to path templates where a
//! `{param}` segment matches any single segment. Only units declared by the
//! contract are ever incremented.
//!
//! [`HitRecorder`] wraps the same logic in a single-writer tokio task so that
//! concurrent observers never touch the counters directly.

pub mod actor;

use serde_json::Value;
use std::collections::BTreeSet;
use tracing::trace;

use crate::coverage::{Coverage, Endpoint};
use crate::observations::ObservedCall;

pub use actor::{HitRecorder, ObservationSender, RecordingSummary};

/// Result of applying one observed call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Matched {
        path: String,
        method: String,
        /// Query names on the call that the contract does not declare.
        undeclared_query: usize,
    },
    Unmatched,
}

impl RecordOutcome {
    pub fn is_matched(&self) -> bool {
        matches!(self, RecordOutcome::Matched { .. })
    }
}

impl Coverage {
    /// Apply one observed call to the model.
    pub fn record_call(&mut self, call: &ObservedCall) -> RecordOutcome {
        let method = call.method.to_lowercase();
        let path = normalize_path(call.path_only());

        let Some(template) = self.find_template(&path, &method) else {
            trace!(method = %method, path = %path, "Observed call matches no endpoint");
            return RecordOutcome::Unmatched;
        };
        let Some(endpoint) = self.endpoint_mut(&template, &method) else {
            return RecordOutcome::Unmatched;
        };

        endpoint.method_called = true;
        endpoint.hits += 1;

        let names: BTreeSet<String> = call.query_names().into_iter().collect();
        let undeclared_query = record_query(endpoint, &names);
        if let Some(body) = call.body.as_ref().filter(|body| !body.is_null()) {
            record_body(endpoint, body);
        }

        RecordOutcome::Matched { path: template, method, undeclared_query }
    }

    /// Template key of the endpoint serving `path` for `method`. An exact key
    /// wins; otherwise the template with the fewest `{param}` segments.
    fn find_template(&self, path: &str, method: &str) -> Option<String> {
        if self.endpoints.get(path).is_some_and(|methods| methods.contains_key(method)) {
            return Some(path.to_string());
        }

        self.endpoints
            .iter()
            .filter(|(_, methods)| methods.contains_key(method))
            .filter_map(|(template, _)| {
                template_wildcards(template, path).map(|wildcards| (wildcards, template))
            })
            .min_by_key(|(wildcards, _)| *wildcards)
            .map(|(_, template)| template.clone())
    }
}

fn normalize_path(path: &str) -> String {
    let lowered = path.to_lowercase();
    match lowered.trim_end_matches('/') {
        "" => "/".to_string(),
        trimmed => trimmed.to_string(),
    }
}

/// Number of `{param}` segments used when `template` matches `path`.
fn template_wildcards(template: &str, path: &str) -> Option<usize> {
    let template_segments: Vec<&str> = template.trim_end_matches('/').split('/').collect();
    let path_segments: Vec<&str> = path.split('/').collect();
    if template_segments.len() != path_segments.len() {
        return None;
    }

    let mut wildcards = 0;
    for (expected, actual) in template_segments.iter().zip(&path_segments) {
        if expected.starts_with('{') && expected.ends_with('}') {
            if actual.is_empty() {
                return None;
            }
            wildcards += 1;
        } else if expected != actual {
            return None;
        }
    }
    Some(wildcards)
}

fn record_query(endpoint: &mut Endpoint, names: &BTreeSet<String>) -> usize {
    let mut undeclared = 0;
    for name in names {
        match endpoint.params_hits_details.query.get_mut(name) {
            Some(count) => *count += 1,
            None => undeclared += 1,
        }
    }
    undeclared
}

fn record_body(endpoint: &mut Endpoint, body: &Value) {
    for (key, count) in endpoint.params_hits_details.body.iter_mut() {
        let present = match key.split_once('.') {
            // The unit is the body parameter itself.
            None => true,
            Some((_, field_path)) => contains_field(body, field_path),
        };
        if present {
            *count += 1;
        }
    }
}

/// Whether `value` carries the dotted `field_path`. Arrays match when any
/// element does.
fn contains_field(value: &Value, field_path: &str) -> bool {
    let (head, rest) = match field_path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (field_path, None),
    };

    match value {
        Value::Object(map) => match (map.get(head), rest) {
            (Some(child), None) => !child.is_null(),
            (Some(child), Some(rest)) => contains_field(child, rest),
            (None, _) => false,
        },
        Value::Array(items) => items.iter().any(|item| contains_field(item, field_path)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn model() -> Coverage {
        let mut coverage = Coverage::new();
        let post = coverage.endpoint_entry("/widgets", "post");
        post.register_query("limit");
        post.register_body("body.name");
        post.register_body("body.size");
        post.register_body("body.owner.id");
        coverage.endpoint_entry("/widgets/{id}", "get");
        coverage.endpoint_entry("/widgets/special", "get");
        coverage.endpoint_entry("/", "get");
        coverage.endpoint_entry("/upload", "put").register_body("payload");
        coverage
    }

    #[test]
    fn records_query_and_body_fields() {
        let mut coverage = model();
        let call = ObservedCall::new("POST", "/Widgets?limit=10&debug=1")
            .with_body(json!({"name": "bolt", "size": null, "owner": {"id": 7}}));

        let outcome = coverage.record_call(&call);
        assert_eq!(
            outcome,
            RecordOutcome::Matched {
                path: "/widgets".to_string(),
                method: "post".to_string(),
                undeclared_query: 1,
            }
        );

        let endpoint = coverage.endpoint("/widgets", "post").expect("endpoint");
        assert!(endpoint.method_called);
        assert_eq!(endpoint.hits, 1);
        assert_eq!(endpoint.params_hits_details.query["limit"], 1);
        assert_eq!(endpoint.params_hits_details.body["body.name"], 1);
        assert_eq!(endpoint.params_hits_details.body["body.size"], 0);
        assert_eq!(endpoint.params_hits_details.body["body.owner.id"], 1);
        assert!(!endpoint.params_hits_details.query.contains_key("debug"));
    }

    #[test]
    fn encoded_query_names_hit_declared_units() {
        let mut coverage = Coverage::new();
        coverage.endpoint_entry("/widgets", "get").register_query("filter[name]");

        let outcome = coverage.record_call(&ObservedCall::new("GET", "/widgets?filter%5Bname%5D=x"));
        assert_eq!(
            outcome,
            RecordOutcome::Matched {
                path: "/widgets".to_string(),
                method: "get".to_string(),
                undeclared_query: 0,
            }
        );
        assert!(coverage.record_call(&ObservedCall::new("GET", "/widgets#top")).is_matched());

        let endpoint = coverage.endpoint("/widgets", "get").expect("endpoint");
        assert_eq!(endpoint.hits, 2);
        assert_eq!(endpoint.params_hits_details.query["filter[name]"], 1);
    }

    #[test]
    fn routes_templated_paths() {
        let mut coverage = model();
        assert!(coverage.record_call(&ObservedCall::new("get", "/widgets/42/")).is_matched());
        assert!(coverage.record_call(&ObservedCall::new("get", "/widgets/special")).is_matched());
        assert!(coverage.record_call(&ObservedCall::new("get", "/")).is_matched());

        assert_eq!(coverage.endpoint("/widgets/{id}", "get").map(|e| e.hits), Some(1));
        assert_eq!(coverage.endpoint("/widgets/special", "get").map(|e| e.hits), Some(1));
        assert_eq!(coverage.endpoint("/", "get").map(|e| e.hits), Some(1));
    }

    #[test]
    fn unknown_calls_change_nothing() {
        let mut coverage = model();
        let before = coverage.clone();
        assert_eq!(
            coverage.record_call(&ObservedCall::new("DELETE", "/widgets")),
            RecordOutcome::Unmatched
        );
        assert_eq!(
            coverage.record_call(&ObservedCall::new("GET", "/widgets/1/parts")),
            RecordOutcome::Unmatched
        );
        assert_eq!(coverage, before);
    }

    #[test]
    fn bare_body_parameter_hit_by_any_body() {
        let mut coverage = model();
        coverage.record_call(&ObservedCall::new("PUT", "/upload").with_body(json!("raw")));
        coverage.record_call(&ObservedCall::new("PUT", "/upload").with_body(Value::Null));
        let endpoint = coverage.endpoint("/upload", "put").expect("endpoint");
        assert_eq!(endpoint.params_hits_details.body["payload"], 1);
        assert_eq!(endpoint.hits, 2);
    }

    #[test]
    fn array_bodies_match_any_element() {
        assert!(contains_field(&json!([{"a": 1}, {"b": {"c": true}}]), "b.c"));
        assert!(!contains_field(&json!([{"a": 1}]), "b"));
        assert!(!contains_field(&json!("scalar"), "a"));
    }

    #[test]
    fn template_matching_rules() {
        assert_eq!(template_wildcards("/a/{id}/b", "/a/1/b"), Some(1));
        assert_eq!(template_wildcards("/a/{id}", "/a/"), None);
        assert_eq!(template_wildcards("/a/{id}", "/a/1/2"), None);
        assert_eq!(template_wildcards("/a/b", "/a/b"), Some(0));
    }
}
