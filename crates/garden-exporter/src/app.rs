//! Exporter assembly: caches, collector, probe monitor and router.

use std::sync::Arc;

use axum::Router;
use garden_api::{ApiState, build_router};
use garden_metrics::{CustomizationRegistry, GardenCollector, SnapshotReaders, setup_metrics_collector};
use garden_probe::{ApiProber, ResponseTimeMonitor};
use garden_state::SnapshotCaches;
use prometheus::Registry;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

use crate::config::ExporterConfig;
use crate::refresh::spawn_refresh_loop;

/// A fully wired exporter, ready to serve.
pub struct Exporter {
    pub caches: SnapshotCaches,
    pub registry: Registry,
    pub monitor: Option<ResponseTimeMonitor>,
    pub router: Router,
}

impl Exporter {
    /// Build the collector from `config` and register it with `registry`.
    ///
    /// Fails on schema errors in the customizations and when a garden
    /// collector is already registered with `registry`.
    pub fn build(config: &ExporterConfig, registry: Registry) -> anyhow::Result<Self> {
        let caches = SnapshotCaches::new();
        let readers = SnapshotReaders::from(&caches);

        let customizations = CustomizationRegistry::from_config(&config.customization.shoot)?;
        let mut collector = GardenCollector::new(readers.clone())?.with_customizations(customizations)?;

        let monitor = if config.probe.enabled {
            let prober = ApiProber::new(&config.probe.endpoint, config.probe.timeout()?)?;
            let monitor = ResponseTimeMonitor::new(readers.shoots.clone(), prober, config.probe.interval()?);
            collector = collector.with_response_durations(Arc::new(monitor.clone()));
            Some(monitor)
        } else {
            None
        };

        let described = collector.describe().len();
        setup_metrics_collector(&registry, collector)?;
        info!(
            metrics = described,
            customizations = config.customization.shoot.len(),
            probe = config.probe.enabled,
            "garden collector ready"
        );

        let router = build_router(ApiState {
            registry: registry.clone(),
            caches: caches.clone(),
        });

        Ok(Self {
            caches,
            registry,
            monitor,
            router,
        })
    }

    /// Start the refresh loop and, if enabled, the probe monitor.
    pub fn spawn_background(
        &self,
        config: &ExporterConfig,
        shutdown: watch::Receiver<bool>,
    ) -> anyhow::Result<Vec<JoinHandle<()>>> {
        let mut handles = vec![spawn_refresh_loop(
            config.snapshot.path.clone(),
            config.snapshot.refresh_interval()?,
            self.caches.clone(),
            shutdown.clone(),
        )];
        if let Some(monitor) = &self.monitor {
            handles.push(monitor.spawn(shutdown));
        }
        Ok(handles)
    }
}
