//! Observed calls and the JSON Lines observation log
//!
//! Each line of an observation log is one [`ObservedCall`]:
//!
//! ```text
//! {"method":"POST","path":"/widgets?limit=5","body":{"name":"bolt"}}
//! {"method":"GET","path":"/widgets","query":["page"]}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::BufRead;
use std::path::Path;
use tracing::debug;

use crate::errors::{Error, Result};

/// One HTTP call seen during a test run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservedCall {
    pub method: String,
    /// Request path, optionally with a `?query` string.
    pub path: String,
    /// Query parameter names present on the call.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub query: Vec<String>,
    /// Decoded JSON request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl ObservedCall {
    pub fn new<M: Into<String>, P: Into<String>>(method: M, path: P) -> Self {
        Self { method: method.into(), path: path.into(), query: Vec::new(), body: None }
    }

    pub fn with_query<S: Into<String>>(mut self, name: S) -> Self {
        self.query.push(name.into());
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Path without its query string or fragment.
    pub fn path_only(&self) -> &str {
        let (path, _) = self.split_target();
        path
    }

    /// Every query parameter name: the explicit list plus the percent-decoded,
    /// non-empty names parsed from the path's query string.
    pub fn query_names(&self) -> Vec<String> {
        let mut names = self.query.clone();
        if let (_, Some(query)) = self.split_target() {
            names.extend(
                url::form_urlencoded::parse(query.as_bytes())
                    .map(|(name, _)| name.trim().to_string())
                    .filter(|name| !name.is_empty()),
            );
        }
        names
    }

    fn split_target(&self) -> (&str, Option<&str>) {
        let target = self.path.split('#').next().unwrap_or_default();
        match target.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (target, None),
        }
    }
}

/// Parse a JSON Lines stream of observed calls. Blank lines are skipped.
pub fn parse_observations<R: BufRead>(reader: R) -> Result<Vec<ObservedCall>> {
    let mut calls = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|err| Error::io(err, "Failed to read observation log"))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let call = serde_json::from_str(trimmed).map_err(|err| {
            Error::serialization_with_source(
                format!("Invalid observation on line {}", index + 1),
                Box::new(err),
            )
        })?;
        calls.push(call);
    }
    Ok(calls)
}

/// Read an observation log from disk.
pub fn read_observations<P: AsRef<Path>>(path: P) -> Result<Vec<ObservedCall>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|err| {
        Error::io(err, format!("Failed to open observation log {}", path.display()))
    })?;
    let calls = parse_observations(std::io::BufReader::new(file))?;
    debug!(log = %path.display(), calls = calls.len(), "Read observation log");
    Ok(calls)
}
