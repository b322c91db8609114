//! Plant info and condition samples.

use std::sync::Arc;

use garden_state::{Plant, ResourceKind};

use crate::catalog::{PLANT_CONDITION, PLANT_INFO};
use crate::condition::ConditionStatus;
use crate::error::ExtractError;
use crate::failures::ScrapeFailures;
use crate::sample::Sample;

use super::{require_name, skip_object};

pub(crate) const SCHEMA: &[(&str, &[&str])] = &[
    (PLANT_INFO, &["name", "project", "provider", "region", "version"]),
    (PLANT_CONDITION, &["name", "project", "condition"]),
];

pub fn collect_plant_metrics(plants: &[Arc<Plant>], failures: &ScrapeFailures) -> Vec<Sample> {
    let mut samples = Vec::new();
    for plant in plants {
        match plant_samples(plant) {
            Ok(mut plant_samples) => samples.append(&mut plant_samples),
            Err(e) => skip_object(failures, ResourceKind::Plant, &plant.name, &e),
        }
    }
    samples
}

fn plant_samples(plant: &Plant) -> Result<Vec<Sample>, ExtractError> {
    require_name(&plant.name)?;
    if plant.project.is_empty() {
        return Err(ExtractError::MissingProject);
    }
    let info = plant
        .cluster_info
        .as_ref()
        .ok_or(ExtractError::MissingClusterInfo)?;

    let mut samples = Vec::with_capacity(1 + plant.conditions.len());
    samples.push(Sample::new(
        PLANT_INFO,
        &[
            plant.name.as_str(),
            plant.project.as_str(),
            info.provider.as_str(),
            info.region.as_str(),
            info.version.as_str(),
        ],
        1.0,
    ));

    for condition in &plant.conditions {
        samples.push(Sample::new(
            PLANT_CONDITION,
            &[
                plant.name.as_str(),
                plant.project.as_str(),
                condition.condition_type.as_str(),
            ],
            ConditionStatus::from(condition).value(),
        ));
    }
    Ok(samples)
}
