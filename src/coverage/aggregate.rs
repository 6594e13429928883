//! Aggregation of raw hit counters into unique hits and percentages.
//!
//! Aggregation is a projection: `unique_hits` is recomputed from
//! `method_called` and the parameter counters on every call, so it can run
//! as often as a report is needed without double counting.

use super::model::{Coverage, Endpoint};

/// `hits * 100 / expected`, or 0 when nothing is expected.
pub fn percentage(hits: u64, expected: u64) -> f64 {
    if expected == 0 {
        0.0
    } else {
        hits as f64 * 100.0 / expected as f64
    }
}

impl Endpoint {
    /// Units hit before saturation: the invocation plus every parameter unit
    /// with a non-zero count.
    pub fn raw_unique_hits(&self) -> u64 {
        u64::from(self.method_called) + self.params_hits_details.hit_units()
    }

    /// Recompute `unique_hits` and `percent`, clamping hits to the expected
    /// total.
    pub fn aggregate(&mut self) {
        self.unique_hits = self.raw_unique_hits().min(self.expected_unique_hits);
        self.percent = percentage(self.unique_hits, self.expected_unique_hits);
    }
}

impl Coverage {
    /// Recompute every endpoint and the overall totals.
    pub fn aggregate(&mut self) {
        let mut expected = 0;
        let mut unique = 0;

        for endpoint in self.iter_endpoints_mut() {
            endpoint.aggregate();
            if endpoint.expected_unique_hits > 0 {
                expected += endpoint.expected_unique_hits;
                unique += endpoint.unique_hits;
            }
        }

        self.expected_unique_hits = expected;
        self.unique_hits = unique;
        self.percent = percentage(unique, expected);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_of_nothing_is_zero() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(5, 0), 0.0);
        assert_eq!(percentage(3, 4), 75.0);
    }

    #[test]
    fn method_call_credits_base_unit() {
        let mut endpoint = Endpoint::new("/widgets", "get");
        endpoint.method_called = true;
        endpoint.aggregate();
        assert_eq!(endpoint.unique_hits, 1);
        assert_eq!(endpoint.percent, 100.0);
    }

    #[test]
    fn hits_saturate_at_expected() {
        let mut endpoint = Endpoint::new("/widgets", "get");
        endpoint.method_called = true;
        // Counters outside the declared model, as a hand-built endpoint might carry.
        endpoint.params_hits_details.query.insert("a".into(), 3);
        endpoint.params_hits_details.query.insert("b".into(), 1);
        endpoint.aggregate();
        assert_eq!(endpoint.raw_unique_hits(), 3);
        assert_eq!(endpoint.unique_hits, 1);
        assert_eq!(endpoint.percent, 100.0);
    }

    #[test]
    fn zero_expected_endpoint_contributes_nothing() {
        let mut coverage = Coverage::new();
        coverage.endpoint_entry("/widgets", "get").method_called = true;
        let empty = coverage.endpoint_entry("/empty", "get");
        empty.expected_unique_hits = 0;
        empty.method_called = true;

        coverage.aggregate();

        let empty = coverage.endpoint("/empty", "get").expect("endpoint");
        assert_eq!(empty.percent, 0.0);
        assert_eq!(empty.unique_hits, 0);
        assert_eq!(coverage.expected_unique_hits, 1);
        assert_eq!(coverage.unique_hits, 1);
        assert_eq!(coverage.percent, 100.0);
    }

    #[test]
    fn empty_coverage_is_zero_percent() {
        let mut coverage = Coverage::new();
        coverage.aggregate();
        assert_eq!(coverage.percent, 0.0);
        assert_eq!(coverage.expected_unique_hits, 0);
    }

    #[test]
    fn aggregation_is_repeatable() {
        let mut coverage = Coverage::new();
        let endpoint = coverage.endpoint_entry("/widgets", "post");
        endpoint.register_query("limit");
        endpoint.method_called = true;

        coverage.aggregate();
        let first = coverage.clone();
        coverage.aggregate();

        assert_eq!(coverage, first);
        assert_eq!(coverage.unique_hits, 1);
        assert_eq!(coverage.percent, 50.0);
    }
}
