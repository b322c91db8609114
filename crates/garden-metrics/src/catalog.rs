//! Metric catalog: the fixed set of garden metric descriptors.
//!
//! Built once on first use and read-only for the rest of the process.
//! Every extractor declares the `(metric, labels)` pairs it emits; those
//! declarations are checked against this table when a collector is built,
//! so a label mismatch aborts startup instead of surfacing during a scrape.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::OnceLock;

use prometheus::core::Desc;

use crate::error::{MetricsError, MetricsResult};

pub const OPERATIONS_TOTAL: &str = "garden_shoot_operations_total";
pub const PLANT_CONDITION: &str = "garden_plant_condition";
pub const PLANT_INFO: &str = "garden_plant_info";
pub const PROJECTS_STATUS: &str = "garden_projects_status";
pub const SEED_CONDITION: &str = "garden_seed_condition";
pub const SEED_INFO: &str = "garden_seed_info";
pub const SHOOT_CONDITION: &str = "garden_shoot_condition";
pub const SHOOT_CREATION: &str = "garden_shoot_creation_timestamp";
pub const SHOOT_HIBERNATED: &str = "garden_shoot_hibernated";
pub const SHOOT_INFO: &str = "garden_shoot_info";
pub const SHOOT_NODE_MAX_TOTAL: &str = "garden_shoot_node_max_total";
pub const SHOOT_NODE_MIN_TOTAL: &str = "garden_shoot_node_min_total";
pub const SHOOT_OPERATION_PROGRESS: &str = "garden_shoot_operation_progress_percent";
pub const SHOOT_OPERATION_STATE: &str = "garden_shoot_operation_states";
pub const SHOOT_RESPONSE_DURATION: &str = "garden_shoot_response_duration_milliseconds";
pub const USERS_TOTAL: &str = "garden_users_total";

/// Name, help text and ordered label names of one metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub name: String,
    pub help: String,
    pub labels: Vec<String>,
}

impl Descriptor {
    pub fn new(name: &str, help: &str, labels: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            help: help.to_string(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
        }
    }

    /// Whether `labels` names exactly this descriptor's labels, in order.
    pub fn matches(&self, labels: &[&str]) -> bool {
        self.labels.len() == labels.len() && self.labels.iter().zip(labels).all(|(a, b)| a == b)
    }

    /// Build the Prometheus descriptor used for registration.
    pub fn to_desc(&self) -> MetricsResult<Desc> {
        Ok(Desc::new(
            self.name.clone(),
            self.help.clone(),
            self.labels.clone(),
            HashMap::new(),
        )?)
    }
}

static DEFINITIONS: OnceLock<BTreeMap<&'static str, Descriptor>> = OnceLock::new();

/// The garden metric catalog keyed by metric name.
pub fn definitions() -> &'static BTreeMap<&'static str, Descriptor> {
    DEFINITIONS.get_or_init(build_definitions)
}

fn build_definitions() -> BTreeMap<&'static str, Descriptor> {
    let table: [(&'static str, &str, &[&str]); 16] = [
        (
            OPERATIONS_TOTAL,
            "Count of ongoing operations.",
            &["operation", "state", "iaas", "seed", "version", "region"],
        ),
        (
            PLANT_CONDITION,
            "Condition state of a Plant. Possible values: -1=Unknown|0=Unhealthy|1=Healthy|2=Progressing",
            &["name", "project", "condition"],
        ),
        (
            PLANT_INFO,
            "Information about a plant. The value is always 1.",
            &["name", "project", "provider", "region", "version"],
        ),
        (
            PROJECTS_STATUS,
            "Status of projects. Possible values: -1=Unknown|0=Pending|1=Ready|2=Terminating|3=Failed",
            &["name", "cluster", "phase"],
        ),
        (
            SEED_CONDITION,
            "Condition state of a Seed. Possible values: -1=Unknown|0=Unhealthy|1=Healthy|2=Progressing",
            &["name", "condition"],
        ),
        (
            SEED_INFO,
            "Information about a Seed. The value is always 1.",
            &["name", "namespace", "iaas", "region", "visible", "protected"],
        ),
        (
            SHOOT_CONDITION,
            "Condition state of a Shoot. Possible values: -1=Unknown|0=Unhealthy|1=Healthy|2=Progressing",
            &["name", "project", "condition", "operation", "purpose", "is_seed", "iaas", "uid"],
        ),
        (
            SHOOT_CREATION,
            "Timestamp of the shoot creation.",
            &["name", "project", "uid"],
        ),
        (
            SHOOT_HIBERNATED,
            "Hibernation status of a shoot.",
            &["name", "project", "uid"],
        ),
        (
            SHOOT_INFO,
            "Information about a Shoot. The value is always 1.",
            &["name", "project", "iaas", "version", "region", "seed", "is_seed"],
        ),
        (
            SHOOT_NODE_MAX_TOTAL,
            "Max node count of a Shoot.",
            &["name", "project"],
        ),
        (
            SHOOT_NODE_MIN_TOTAL,
            "Min node count of a Shoot.",
            &["name", "project"],
        ),
        (
            SHOOT_OPERATION_PROGRESS,
            "Operation progress percent of a Shoot.",
            &["name", "project", "operation"],
        ),
        (
            SHOOT_OPERATION_STATE,
            "Operation state of a Shoot. Possible values: 0=Unknown|1=Processing|2=Succeeded|3=Error|4=Failed|5=Pending|6=Aborted",
            &["name", "project", "operation"],
        ),
        (
            SHOOT_RESPONSE_DURATION,
            "Response time of the Shoot API server. Not provided when not reachable.",
            &["name", "project"],
        ),
        (USERS_TOTAL, "Count of users.", &["kind"]),
    ];

    table
        .into_iter()
        .map(|(name, help, labels)| (name, Descriptor::new(name, help, labels)))
        .collect()
}

/// Check a producer's declared `(metric, labels)` pairs against the catalog.
pub fn validate_schema(schema: &[(&str, &[&str])]) -> MetricsResult<()> {
    let defs = definitions();
    for (name, labels) in schema {
        let desc = defs
            .get(*name)
            .ok_or_else(|| MetricsError::Schema(format!("{name} is not in the metric catalog")))?;
        if !desc.matches(labels) {
            return Err(MetricsError::Schema(format!(
                "{name} declares labels {labels:?}, catalog has {:?}",
                desc.labels
            )));
        }
    }
    Ok(())
}
