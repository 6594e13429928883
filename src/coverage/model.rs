//! Coverage data model
//!
//! A [`Coverage`] is created once per contract by the model builder, receives
//! hit increments from the recorder while a test run progresses, and is turned
//! into percentages by [`Coverage::aggregate`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Endpoints keyed by lower-cased path, then lower-cased method.
pub type EndpointMap = BTreeMap<String, BTreeMap<String, Endpoint>>;

/// Root aggregate for one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coverage {
    pub endpoints: EndpointMap,
    pub expected_unique_hits: u64,
    pub unique_hits: u64,
    pub percent: f64,
}

/// Hit counters for the parameter units of one endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamsHitsDetails {
    /// Query parameter name to hit count.
    pub query: BTreeMap<String, u64>,
    /// Dotted body field path to hit count.
    pub body: BTreeMap<String, u64>,
}

impl ParamsHitsDetails {
    /// Number of declared units that were hit at least once.
    pub fn hit_units(&self) -> u64 {
        self.query.values().chain(self.body.values()).filter(|count| **count > 0).count() as u64
    }

    /// Number of declared parameter units.
    pub fn declared_units(&self) -> u64 {
        (self.query.len() + self.body.len()) as u64
    }
}

/// One (path, method) coverage unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub path: String,
    pub method: String,
    pub expected_unique_hits: u64,
    pub unique_hits: u64,
    pub method_called: bool,
    /// Total observed calls routed to this endpoint.
    #[serde(default)]
    pub hits: u64,
    pub params_hits_details: ParamsHitsDetails,
    pub percent: f64,
}

impl Endpoint {
    /// A fresh endpoint whose only expected unit is the invocation itself.
    pub fn new<P: Into<String>, M: Into<String>>(path: P, method: M) -> Self {
        Self {
            path: path.into(),
            method: method.into(),
            expected_unique_hits: 1,
            unique_hits: 0,
            method_called: false,
            hits: 0,
            params_hits_details: ParamsHitsDetails::default(),
            percent: 0.0,
        }
    }

    /// Register a query parameter unit. Returns false if it was already known.
    pub fn register_query<S: Into<String>>(&mut self, name: S) -> bool {
        register_unit(&mut self.params_hits_details.query, &mut self.expected_unique_hits, name)
    }

    /// Register a body field unit. Returns false if it was already known.
    pub fn register_body<S: Into<String>>(&mut self, path: S) -> bool {
        register_unit(&mut self.params_hits_details.body, &mut self.expected_unique_hits, path)
    }
}

// A unit that was already declared keeps its count and is not counted twice.
fn register_unit<S: Into<String>>(
    units: &mut BTreeMap<String, u64>,
    expected: &mut u64,
    key: S,
) -> bool {
    match units.entry(key.into()) {
        std::collections::btree_map::Entry::Occupied(_) => false,
        std::collections::btree_map::Entry::Vacant(slot) => {
            slot.insert(0);
            *expected += 1;
            true
        }
    }
}

impl Coverage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn endpoint(&self, path: &str, method: &str) -> Option<&Endpoint> {
        self.endpoints.get(path).and_then(|methods| methods.get(method))
    }

    pub fn endpoint_mut(&mut self, path: &str, method: &str) -> Option<&mut Endpoint> {
        self.endpoints.get_mut(path).and_then(|methods| methods.get_mut(method))
    }

    /// Get the endpoint for (path, method), creating it on first use.
    pub fn endpoint_entry(&mut self, path: &str, method: &str) -> &mut Endpoint {
        self.endpoints
            .entry(path.to_string())
            .or_default()
            .entry(method.to_string())
            .or_insert_with(|| Endpoint::new(path, method))
    }

    /// Iterate over every endpoint.
    pub fn iter_endpoints(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.values().flat_map(|methods| methods.values())
    }

    pub fn iter_endpoints_mut(&mut self) -> impl Iterator<Item = &mut Endpoint> {
        self.endpoints.values_mut().flat_map(|methods| methods.values_mut())
    }

    pub fn endpoint_count(&self) -> usize {
        self.endpoints.values().map(BTreeMap::len).sum()
    }
}
