//! Registration and text exposition.

use prometheus::{Encoder, Registry, TextEncoder};
use tracing::{info, warn};

use crate::collector::GardenCollector;
use crate::error::{MetricsError, MetricsResult};

/// Register `collector` and its scrape failure counter with `registry`.
///
/// Registering a second garden collector on the same registry fails with
/// [`MetricsError::AlreadyRegistered`]. A failed setup leaves nothing
/// registered.
pub fn setup_metrics_collector(registry: &Registry, collector: GardenCollector) -> MetricsResult<()> {
    let failures = collector.failures().counter().clone();
    let described = collector.describe().len();

    registry
        .register(Box::new(failures.clone()))
        .map_err(|e| already_registered(e, crate::failures::SCRAPE_FAILURES))?;
    if let Err(e) = registry.register(Box::new(collector)) {
        if let Err(undo) = registry.unregister(Box::new(failures)) {
            warn!(error = %undo, "failed to unregister scrape failure counter");
        }
        return Err(already_registered(e, "garden collector"));
    }

    info!(metrics = described, "garden metrics collector registered");
    Ok(())
}

fn already_registered(err: prometheus::Error, what: &str) -> MetricsError {
    match err {
        prometheus::Error::AlreadyReg => MetricsError::AlreadyRegistered(what.to_string()),
        other => MetricsError::Prometheus(other),
    }
}

/// Gather `registry` and render it in the Prometheus text format.
pub fn render_prometheus(registry: &Registry) -> MetricsResult<String> {
    let families = registry.gather();
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| MetricsError::Encode(e.to_string()))
}
