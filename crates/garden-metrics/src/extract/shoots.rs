//! Shoot metrics, including the aggregated operations count.
//!
//! Per-shoot metrics are emitted for every shoot, also for shoots that are
//! registered as seeds. `garden_shoot_operations_total` leaves those out so
//! seed-oriented dashboards do not count their operations twice.

use std::collections::BTreeMap;
use std::sync::Arc;

use garden_state::{LastOperation, ResourceKind, Shoot};

use crate::catalog::*;
use crate::condition::ConditionStatus;
use crate::error::ExtractError;
use crate::failures::ScrapeFailures;
use crate::response::{ResponseDurations, as_millis_f64};
use crate::sample::{Sample, bool_label};

use super::{require_name, skip_object};

/// Purpose assumed when a shoot does not declare one.
pub(crate) const DEFAULT_PURPOSE: &str = "evaluation";

pub(crate) const SCHEMA: &[(&str, &[&str])] = &[
    (SHOOT_INFO, &["name", "project", "iaas", "version", "region", "seed", "is_seed"]),
    (SHOOT_OPERATION_STATE, &["name", "project", "operation"]),
    (SHOOT_OPERATION_PROGRESS, &["name", "project", "operation"]),
    (
        SHOOT_CONDITION,
        &["name", "project", "condition", "operation", "purpose", "is_seed", "iaas", "uid"],
    ),
    (SHOOT_NODE_MAX_TOTAL, &["name", "project"]),
    (SHOOT_NODE_MIN_TOTAL, &["name", "project"]),
    (SHOOT_HIBERNATED, &["name", "project", "uid"]),
    (SHOOT_CREATION, &["name", "project", "uid"]),
    (SHOOT_RESPONSE_DURATION, &["name", "project"]),
    (OPERATIONS_TOTAL, &["operation", "state", "iaas", "seed", "version", "region"]),
];

/// State of the last operation, exported on `garden_shoot_operation_states`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationState {
    Unknown,
    Processing,
    Succeeded,
    Error,
    Failed,
    Pending,
    Aborted,
}

impl OperationState {
    /// Case-sensitive mapping of the raw state string.
    pub fn from_state(raw: &str) -> Self {
        match raw {
            "Processing" => OperationState::Processing,
            "Succeeded" => OperationState::Succeeded,
            "Error" => OperationState::Error,
            "Failed" => OperationState::Failed,
            "Pending" => OperationState::Pending,
            "Aborted" => OperationState::Aborted,
            _ => OperationState::Unknown,
        }
    }

    pub fn value(self) -> f64 {
        match self {
            OperationState::Unknown => 0.0,
            OperationState::Processing => 1.0,
            OperationState::Succeeded => 2.0,
            OperationState::Error => 3.0,
            OperationState::Failed => 4.0,
            OperationState::Pending => 5.0,
            OperationState::Aborted => 6.0,
        }
    }
}

/// Label tuple of one `garden_shoot_operations_total` series.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct OperationKey {
    operation: String,
    state: String,
    iaas: String,
    seed: String,
    version: String,
    region: String,
}

impl OperationKey {
    fn new(shoot: &Shoot, operation: &LastOperation) -> Self {
        Self {
            operation: operation.operation_type.clone(),
            state: operation.state.clone(),
            iaas: shoot.provider.provider_type.clone(),
            seed: shoot.seed_name.clone().unwrap_or_default(),
            version: shoot.kubernetes_version.clone(),
            region: shoot.region.clone(),
        }
    }

    fn sample(&self, count: u64) -> Sample {
        Sample::new(
            OPERATIONS_TOTAL,
            &[
                self.operation.as_str(),
                self.state.as_str(),
                self.iaas.as_str(),
                self.seed.as_str(),
                self.version.as_str(),
                self.region.as_str(),
            ],
            count as f64,
        )
    }
}

/// Emit the samples of all shoots in the snapshot.
pub fn collect_shoot_metrics(
    shoots: &[Arc<Shoot>],
    durations: &dyn ResponseDurations,
    failures: &ScrapeFailures,
) -> Vec<Sample> {
    let mut samples = Vec::new();
    let mut operations: BTreeMap<OperationKey, u64> = BTreeMap::new();

    for shoot in shoots {
        match shoot_samples(shoot, durations) {
            Ok(mut shoot_samples) => {
                samples.append(&mut shoot_samples);
                if shoot.is_seed {
                    continue;
                }
                if let Some(op) = active_operation(shoot) {
                    *operations.entry(OperationKey::new(shoot, op)).or_default() += 1;
                }
            }
            Err(e) => skip_object(failures, ResourceKind::Shoot, &shoot.name, &e),
        }
    }

    samples.extend(operations.iter().map(|(key, count)| key.sample(*count)));
    samples
}

pub(crate) fn active_operation(shoot: &Shoot) -> Option<&LastOperation> {
    shoot.last_operation.as_ref().filter(|op| !op.is_empty())
}

pub(crate) fn validate(shoot: &Shoot) -> Result<(), ExtractError> {
    require_name(&shoot.name)?;
    if shoot.project.is_empty() {
        return Err(ExtractError::MissingProject);
    }
    if shoot.provider.provider_type.is_empty() {
        return Err(ExtractError::MissingProvider);
    }
    if shoot.creation_timestamp.is_none() {
        return Err(ExtractError::MissingCreationTimestamp);
    }
    if let Some(op) = active_operation(shoot) {
        if !(0..=100).contains(&op.progress) {
            return Err(ExtractError::InvalidProgress(op.progress));
        }
    }
    for worker in &shoot.provider.workers {
        if worker.minimum > worker.maximum {
            return Err(ExtractError::InvalidWorkerBounds {
                pool: worker.name.clone(),
                minimum: worker.minimum,
                maximum: worker.maximum,
            });
        }
    }
    Ok(())
}

fn shoot_samples(
    shoot: &Shoot,
    durations: &dyn ResponseDurations,
) -> Result<Vec<Sample>, ExtractError> {
    validate(shoot)?;

    let name = shoot.name.as_str();
    let project = shoot.project.as_str();
    let uid = shoot.uid.as_str();
    let iaas = shoot.provider.provider_type.as_str();
    let is_seed = bool_label(shoot.is_seed);
    let seed = shoot.seed_name.as_deref().unwrap_or_default();
    let purpose = shoot.purpose.as_deref().unwrap_or(DEFAULT_PURPOSE);

    let mut samples = vec![Sample::new(
        SHOOT_INFO,
        &[
            name,
            project,
            iaas,
            shoot.kubernetes_version.as_str(),
            shoot.region.as_str(),
            seed,
            is_seed,
        ],
        1.0,
    )];

    let operation = match active_operation(shoot) {
        Some(op) => {
            let op_type = op.operation_type.as_str();
            samples.push(Sample::new(
                SHOOT_OPERATION_STATE,
                &[name, project, op_type],
                OperationState::from_state(&op.state).value(),
            ));
            samples.push(Sample::new(
                SHOOT_OPERATION_PROGRESS,
                &[name, project, op_type],
                f64::from(op.progress),
            ));
            op_type
        }
        None => "",
    };

    for condition in &shoot.conditions {
        samples.push(Sample::new(
            SHOOT_CONDITION,
            &[
                name,
                project,
                condition.condition_type.as_str(),
                operation,
                purpose,
                is_seed,
                iaas,
                uid,
            ],
            ConditionStatus::from(condition).value(),
        ));
    }

    let workers = &shoot.provider.workers;
    if !workers.is_empty() {
        let max: u64 = workers.iter().map(|w| u64::from(w.maximum)).sum();
        let min: u64 = workers.iter().map(|w| u64::from(w.minimum)).sum();
        samples.push(Sample::new(SHOOT_NODE_MAX_TOTAL, &[name, project], max as f64));
        samples.push(Sample::new(SHOOT_NODE_MIN_TOTAL, &[name, project], min as f64));
    }

    samples.push(Sample::new(
        SHOOT_HIBERNATED,
        &[name, project, uid],
        if shoot.hibernated { 1.0 } else { 0.0 },
    ));

    if let Some(created) = shoot.creation_timestamp {
        samples.push(Sample::new(
            SHOOT_CREATION,
            &[name, project, uid],
            created.timestamp() as f64,
        ));
    }

    if let Some(duration) = durations.response_duration(shoot) {
        samples.push(Sample::new(
            SHOOT_RESPONSE_DURATION,
            &[name, project],
            as_millis_f64(duration),
        ));
    }

    Ok(samples)
}
