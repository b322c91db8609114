//! Scrape failure counter.
//!
//! Incremented whenever an extractor has to skip a resource object. The
//! process-wide instance is registered next to the collector; tests and
//! embedders can hand a private instance to a collector instead.

use std::sync::OnceLock;

use garden_state::ResourceKind;
use prometheus::{IntCounterVec, Opts};

pub const SCRAPE_FAILURES: &str = "garden_scrape_failure_total";

static GLOBAL: OnceLock<ScrapeFailures> = OnceLock::new();

/// `garden_scrape_failure_total{kind, reason}`.
#[derive(Clone)]
pub struct ScrapeFailures {
    counter: IntCounterVec,
}

impl Default for ScrapeFailures {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrapeFailures {
    /// Create an unregistered counter.
    pub fn new() -> Self {
        let opts = Opts::new(
            SCRAPE_FAILURES,
            "Total count of scraping failures, grouped by resource kind and reason.",
        );
        let counter = IntCounterVec::new(opts, &["kind", "reason"])
            .expect("failed to build scrape failure counter");
        Self { counter }
    }

    /// The process-wide counter.
    pub fn global() -> &'static ScrapeFailures {
        GLOBAL.get_or_init(ScrapeFailures::new)
    }

    /// Count one skipped object.
    pub fn record(&self, kind: ResourceKind, reason: &str) {
        self.counter.with_label_values(&[kind.as_str(), reason]).inc();
    }

    /// Current count for one `(kind, reason)` pair.
    pub fn count(&self, kind: ResourceKind, reason: &str) -> u64 {
        self.counter.with_label_values(&[kind.as_str(), reason]).get()
    }

    /// Current count for a kind, summed over all reasons.
    pub fn total(&self, kind: ResourceKind) -> u64 {
        use prometheus::core::Collector;

        self.counter
            .collect()
            .iter()
            .flat_map(|family| family.get_metric())
            .filter(|metric| {
                metric
                    .get_label()
                    .iter()
                    .any(|l| l.get_name() == "kind" && l.get_value() == kind.as_str())
            })
            .map(|metric| metric.get_counter().get_value() as u64)
            .sum()
    }

    /// The underlying counter, for registration.
    pub fn counter(&self) -> &IntCounterVec {
        &self.counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_and_count() {
        let failures = ScrapeFailures::new();
        failures.record(ResourceKind::Plant, "missing_cluster_info");
        failures.record(ResourceKind::Plant, "missing_cluster_info");
        failures.record(ResourceKind::Plant, "missing_name");
        failures.record(ResourceKind::Shoot, "missing_name");

        assert_eq!(failures.count(ResourceKind::Plant, "missing_cluster_info"), 2);
        assert_eq!(failures.total(ResourceKind::Plant), 3);
        assert_eq!(failures.total(ResourceKind::Shoot), 1);
        assert_eq!(failures.total(ResourceKind::Seed), 0);
    }

    #[test]
    fn concurrent_increments() {
        let failures = ScrapeFailures::new();
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..250 {
                        failures.record(ResourceKind::Seed, "missing_provider");
                    }
                });
            }
        });
        assert_eq!(failures.count(ResourceKind::Seed, "missing_provider"), 1000);
    }

    #[test]
    fn global_is_shared() {
        assert!(std::ptr::eq(ScrapeFailures::global(), ScrapeFailures::global()));
    }
}
