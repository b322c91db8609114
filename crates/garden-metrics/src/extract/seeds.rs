//! Seed info and condition samples.

use std::sync::Arc;

use garden_state::{ResourceKind, Seed};

use crate::catalog::{SEED_CONDITION, SEED_INFO};
use crate::condition::ConditionStatus;
use crate::error::ExtractError;
use crate::failures::ScrapeFailures;
use crate::sample::{Sample, bool_label};

use super::{require_name, skip_object};

pub(crate) const SCHEMA: &[(&str, &[&str])] = &[
    (SEED_INFO, &["name", "namespace", "iaas", "region", "visible", "protected"]),
    (SEED_CONDITION, &["name", "condition"]),
];

pub fn collect_seed_metrics(seeds: &[Arc<Seed>], failures: &ScrapeFailures) -> Vec<Sample> {
    let mut samples = Vec::new();
    for seed in seeds {
        match seed_samples(seed) {
            Ok(mut seed_samples) => samples.append(&mut seed_samples),
            Err(e) => skip_object(failures, ResourceKind::Seed, &seed.name, &e),
        }
    }
    samples
}

fn seed_samples(seed: &Seed) -> Result<Vec<Sample>, ExtractError> {
    require_name(&seed.name)?;
    if seed.provider.provider_type.is_empty() {
        return Err(ExtractError::MissingProvider);
    }

    let mut samples = Vec::with_capacity(1 + seed.conditions.len());
    samples.push(Sample::new(
        SEED_INFO,
        &[
            seed.name.as_str(),
            seed.namespace.as_deref().unwrap_or_default(),
            seed.provider.provider_type.as_str(),
            seed.provider.region.as_str(),
            bool_label(seed.visible),
            bool_label(seed.protected),
        ],
        1.0,
    ));

    for condition in &seed.conditions {
        samples.push(Sample::new(
            SEED_CONDITION,
            &[seed.name.as_str(), condition.condition_type.as_str()],
            ConditionStatus::from(condition).value(),
        ));
    }
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use garden_state::Condition;

    fn collect(seeds: Vec<Seed>) -> (Vec<Sample>, ScrapeFailures) {
        let failures = ScrapeFailures::new();
        let seeds: Vec<Arc<Seed>> = seeds.into_iter().map(Arc::new).collect();
        (collect_seed_metrics(&seeds, &failures), failures)
    }

    #[test]
    fn info_sample() {
        let mut s = seed("aws-eu");
        s.protected = true;

        let (samples, _) = collect(vec![s]);
        let info = only(&samples, SEED_INFO);
        assert_eq!(
            info.labels,
            vec!["aws-eu", "garden", "aws", "eu-west-1", "true", "true"]
        );
        assert_eq!(info.value, 1.0);
    }

    #[test]
    fn missing_namespace_is_an_empty_label() {
        let mut s = seed("aws-eu");
        s.namespace = None;

        let (samples, failures) = collect(vec![s]);
        assert_eq!(only(&samples, SEED_INFO).labels[1], "");
        assert_eq!(failures.total(ResourceKind::Seed), 0);
    }

    #[test]
    fn one_condition_sample_per_condition() {
        let mut s = seed("aws-eu");
        s.conditions = vec![
            Condition::new("GardenletReady", "True"),
            Condition::new("BackupBucketsReady", "False"),
            Condition::new("ExtensionsReady", "Unknown"),
        ];

        let (samples, _) = collect(vec![s, seed("gcp-eu")]);
        let conditions = named(&samples, SEED_CONDITION);
        assert_eq!(conditions.len(), 4);
        assert_eq!(conditions[1].labels, vec!["aws-eu", "BackupBucketsReady"]);
        assert_eq!(conditions[1].value, 0.0);
        assert_eq!(conditions[2].value, -1.0);
    }

    #[test]
    fn seed_without_conditions_has_info_only() {
        let mut s = seed("aws-eu");
        s.conditions.clear();

        let (samples, _) = collect(vec![s]);
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].name, SEED_INFO);
    }

    #[test]
    fn seed_without_provider_is_skipped() {
        let mut broken = seed("broken");
        broken.provider.provider_type.clear();

        let (samples, failures) = collect(vec![broken, seed("aws-eu")]);
        assert_eq!(named(&samples, SEED_INFO).len(), 1);
        assert!(samples.iter().all(|s| s.labels[0] == "aws-eu"));
        assert_eq!(failures.count(ResourceKind::Seed, "missing_provider"), 1);
    }
}
