//! The Prometheus collector over the snapshot caches.
//!
//! `Describe` lists the fixed catalog plus any customizations. `Collect`
//! runs the extractors in a fixed order (projects, shoots, shoot
//! customizations, seeds, plants) against the current cache listings and
//! turns the resulting samples into gauge families. Customizations only
//! see the shoots the shoot extractor accepted. Nothing in here touches
//! the network.

use std::collections::HashMap;
use std::sync::Arc;

use garden_state::{Lister, Plant, Project, Seed, Shoot, SnapshotCaches};
use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{GaugeVec, Opts};
use tracing::{debug, error};

use crate::catalog::{self, Descriptor};
use crate::customization::CustomizationRegistry;
use crate::error::MetricsResult;
use crate::extract;
use crate::failures::ScrapeFailures;
use crate::response::{RecordedDurations, ResponseDurations};
use crate::sample::Sample;

/// Reader handles for the four resource kinds.
#[derive(Clone)]
pub struct SnapshotReaders {
    pub shoots: Arc<dyn Lister<Shoot>>,
    pub seeds: Arc<dyn Lister<Seed>>,
    pub projects: Arc<dyn Lister<Project>>,
    pub plants: Arc<dyn Lister<Plant>>,
}

impl From<&SnapshotCaches> for SnapshotReaders {
    fn from(caches: &SnapshotCaches) -> Self {
        Self {
            shoots: Arc::new(caches.shoots.clone()),
            seeds: Arc::new(caches.seeds.clone()),
            projects: Arc::new(caches.projects.clone()),
            plants: Arc::new(caches.plants.clone()),
        }
    }
}

pub struct GardenCollector {
    readers: SnapshotReaders,
    durations: Arc<dyn ResponseDurations>,
    failures: ScrapeFailures,
    customizations: CustomizationRegistry,
    descs: Vec<Desc>,
}

impl GardenCollector {
    /// Build a collector over `readers`.
    ///
    /// Fails with [`MetricsError::Schema`](crate::MetricsError::Schema) if
    /// any extractor's declared labels disagree with the catalog.
    pub fn new(readers: SnapshotReaders) -> MetricsResult<Self> {
        for schema in extract::schemas() {
            catalog::validate_schema(schema)?;
        }
        let descs = catalog::definitions()
            .values()
            .map(Descriptor::to_desc)
            .collect::<MetricsResult<Vec<_>>>()?;

        Ok(Self {
            readers,
            durations: Arc::new(RecordedDurations),
            failures: ScrapeFailures::global().clone(),
            customizations: CustomizationRegistry::new(),
            descs,
        })
    }

    pub fn with_response_durations(mut self, durations: Arc<dyn ResponseDurations>) -> Self {
        self.durations = durations;
        self
    }

    /// Count skipped objects on `failures` instead of the process-wide counter.
    pub fn with_failures(mut self, failures: ScrapeFailures) -> Self {
        self.failures = failures;
        self
    }

    pub fn with_customizations(mut self, customizations: CustomizationRegistry) -> MetricsResult<Self> {
        for descriptor in customizations.descriptors() {
            self.descs.push(descriptor.to_desc()?);
        }
        self.customizations = customizations;
        Ok(self)
    }

    /// Every descriptor this collector can emit samples for.
    pub fn describe(&self) -> Vec<&Descriptor> {
        catalog::definitions()
            .values()
            .chain(self.customizations.descriptors())
            .collect()
    }

    /// Derive all samples from the current snapshot.
    pub fn collect_samples(&self) -> Vec<Sample> {
        let projects = self.readers.projects.list();
        let shoots = self.readers.shoots.list();
        let seeds = self.readers.seeds.list();
        let plants = self.readers.plants.list();

        let mut samples = extract::collect_project_metrics(&projects, &self.failures);
        samples.extend(extract::collect_shoot_metrics(
            &shoots,
            self.durations.as_ref(),
            &self.failures,
        ));
        if !self.customizations.is_empty() {
            let accepted: Vec<Arc<Shoot>> = shoots
                .iter()
                .filter(|shoot| extract::shoots::validate(shoot).is_ok())
                .cloned()
                .collect();
            samples.extend(self.customizations.collect(&accepted));
        }
        samples.extend(extract::collect_seed_metrics(&seeds, &self.failures));
        samples.extend(extract::collect_plant_metrics(&plants, &self.failures));

        debug!(
            projects = projects.len(),
            shoots = shoots.len(),
            seeds = seeds.len(),
            plants = plants.len(),
            samples = samples.len(),
            "scrape collected"
        );
        samples
    }

    pub fn failures(&self) -> &ScrapeFailures {
        &self.failures
    }
}

impl Collector for GardenCollector {
    fn desc(&self) -> Vec<&Desc> {
        self.descs.iter().collect()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let samples = self.collect_samples();

        let mut by_name: HashMap<&str, Vec<&Sample>> = HashMap::new();
        for sample in &samples {
            by_name.entry(sample.name.as_str()).or_default().push(sample);
        }

        let mut families = Vec::with_capacity(by_name.len());
        for descriptor in self.describe() {
            let Some(samples) = by_name.get(descriptor.name.as_str()) else {
                continue;
            };
            match gauge_family(descriptor, samples) {
                Ok(mut family) => families.append(&mut family),
                Err(e) => error!(metric = %descriptor.name, error = %e, "failed to encode metric"),
            }
        }
        families
    }
}

fn gauge_family(descriptor: &Descriptor, samples: &[&Sample]) -> prometheus::Result<Vec<MetricFamily>> {
    let labels: Vec<&str> = descriptor.labels.iter().map(String::as_str).collect();
    let gauges = GaugeVec::new(Opts::new(&descriptor.name, &descriptor.help), &labels)?;
    for sample in samples {
        gauges
            .get_metric_with_label_values(&sample.label_refs())?
            .set(sample.value);
    }
    Ok(gauges.collect())
}
