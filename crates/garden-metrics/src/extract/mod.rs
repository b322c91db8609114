//! Per-kind metric extractors.
//!
//! Each extractor walks the snapshot of one resource kind and turns every
//! object into samples. Objects are validated before any of their samples
//! are kept, so a skipped object contributes nothing to the scrape.

pub mod plants;
pub mod projects;
pub mod seeds;
pub mod shoots;

use garden_state::ResourceKind;
use tracing::warn;

use crate::error::ExtractError;
use crate::failures::ScrapeFailures;

pub use plants::collect_plant_metrics;
pub use projects::collect_project_metrics;
pub use seeds::collect_seed_metrics;
pub use shoots::collect_shoot_metrics;

/// The `(metric, labels)` pairs emitted by all extractors.
pub fn schemas() -> impl Iterator<Item = &'static [(&'static str, &'static [&'static str])]> {
    [
        projects::SCHEMA,
        shoots::SCHEMA,
        seeds::SCHEMA,
        plants::SCHEMA,
    ]
    .into_iter()
}

/// Count and log an object that could not be turned into samples.
fn skip_object(failures: &ScrapeFailures, kind: ResourceKind, name: &str, err: &ExtractError) {
    warn!(%kind, %name, reason = err.reason(), error = %err, "skipping object in scrape");
    failures.record(kind, err.reason());
}

fn require_name(name: &str) -> Result<(), ExtractError> {
    if name.is_empty() {
        return Err(ExtractError::MissingName);
    }
    Ok(())
}
