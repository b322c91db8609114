//! garden-metrics — derives Prometheus metrics from the garden snapshot.
//!
//! On every scrape the collector lists the four resource caches, runs one
//! extractor per kind, and exposes the resulting samples as gauges. Objects
//! that cannot be turned into samples are skipped, logged and counted on
//! `garden_scrape_failure_total`; they never fail the scrape.
//!
//! # Architecture
//!
//! ```text
//! SnapshotReaders (Lister<T> per kind)
//!   │
//! GardenCollector::collect()
//!   ├── extract::projects   → garden_projects_status, garden_users_total
//!   ├── extract::shoots     → garden_shoot_*, garden_shoot_operations_total
//!   ├── customizations      → configured shoot group counts
//!   ├── extract::seeds      → garden_seed_info, garden_seed_condition
//!   └── extract::plants     → garden_plant_info, garden_plant_condition
//!   │
//! GaugeVec families → Registry → render_prometheus()
//! ```
//!
//! The catalog of descriptors is fixed at startup. A collector whose
//! extractors disagree with it cannot be built.

pub mod catalog;
pub mod collector;
pub mod condition;
pub mod customization;
pub mod error;
pub mod exposition;
pub mod extract;
pub mod failures;
pub mod response;
pub mod sample;

#[cfg(test)]
mod testing;

pub use catalog::Descriptor;
pub use collector::{GardenCollector, SnapshotReaders};
pub use condition::ConditionStatus;
pub use customization::{
    Customization, CustomizationRegistry, ShootCustomizationConfig, ShootField, ShootGroupCount,
};
pub use error::{ExtractError, MetricsError, MetricsResult};
pub use exposition::{render_prometheus, setup_metrics_collector};
pub use failures::{SCRAPE_FAILURES, ScrapeFailures};
pub use response::{RecordedDurations, ResponseDurations};
pub use sample::Sample;
