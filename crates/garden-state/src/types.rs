//! Domain types for the garden resource snapshot.
//!
//! These types mirror the subset of the Gardener API that the metrics
//! exporter reads: shoots, seeds, projects and plants. All types are
//! serializable to/from JSON (camelCase) so a snapshot document can be
//! loaded into the caches. Every field has a default, so any JSON object
//! decodes; deciding whether an object is usable is left to the metric
//! extractors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four resource kinds tracked by the exporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Project,
    Shoot,
    Seed,
    Plant,
}

impl ResourceKind {
    /// Lowercase name, used as the `kind` label of the scrape failure counter.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Project => "project",
            ResourceKind::Shoot => "shoot",
            ResourceKind::Seed => "seed",
            ResourceKind::Plant => "plant",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cached resource with a stable identity inside its kind.
pub trait Resource: Clone + Send + Sync + 'static {
    const KIND: ResourceKind;

    /// Identity key: `{project}/{name}` for project-scoped kinds, `{name}` otherwise.
    fn cache_key(&self) -> String;
}

// ── Conditions ────────────────────────────────────────────────────

/// A named health dimension attached to a shoot, seed or plant.
///
/// `status` is kept as the raw string reported by the control plane
/// (`True`, `False`, `Progressing`, `Unknown`, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type", default)]
    pub condition_type: String,
    /// Missing statuses decode as `""` and export as Unknown.
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Condition {
    pub fn new(condition_type: &str, status: &str) -> Self {
        Self {
            condition_type: condition_type.to_string(),
            status: status.to_string(),
            reason: None,
            message: None,
        }
    }
}

// ── Shoot ─────────────────────────────────────────────────────────

/// A managed tenant cluster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Shoot {
    #[serde(default)]
    pub name: String,
    /// Owning project name.
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub uid: String,
    /// Shoot purpose (`evaluation`, `testing`, `development`, `production`, ...).
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub provider: ShootProvider,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub kubernetes_version: String,
    /// Seed hosting the control plane; absent until the shoot is scheduled.
    #[serde(default)]
    pub seed_name: Option<String>,
    #[serde(default)]
    pub hibernated: bool,
    #[serde(default)]
    pub creation_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub last_operation: Option<LastOperation>,
    /// Whether this shoot is registered as a seed itself.
    #[serde(default)]
    pub is_seed: bool,
    /// Address of the shoot API server, probed by the response-time monitor.
    #[serde(default)]
    pub api_server_url: Option<String>,
    /// API server response time recorded by another component, in milliseconds.
    #[serde(default)]
    pub api_response_duration_millis: Option<u64>,
}

/// Infrastructure provider settings of a shoot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ShootProvider {
    /// IaaS identifier (`aws`, `gcp`, `azure`, `openstack`, ...).
    #[serde(rename = "type", default)]
    pub provider_type: String,
    #[serde(default)]
    pub workers: Vec<Worker>,
}

/// A worker pool with autoscaler bounds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub minimum: u32,
    #[serde(default)]
    pub maximum: u32,
}

/// The last (or currently running) lifecycle operation of a shoot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct LastOperation {
    /// `Create`, `Reconcile`, `Delete`, `Migrate`, `Restore`.
    #[serde(rename = "type", default)]
    pub operation_type: String,
    /// `Processing`, `Succeeded`, `Error`, `Failed`, `Pending`, `Aborted`.
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub progress: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl LastOperation {
    /// An operation without a type carries no information.
    pub fn is_empty(&self) -> bool {
        self.operation_type.is_empty()
    }
}

impl Resource for Shoot {
    const KIND: ResourceKind = ResourceKind::Shoot;

    fn cache_key(&self) -> String {
        format!("{}/{}", self.project, self.name)
    }
}

// ── Seed ──────────────────────────────────────────────────────────

/// An infrastructure cluster hosting shoot control planes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Seed {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub provider: SeedProvider,
    /// Whether shoots may be scheduled onto this seed by default.
    #[serde(default)]
    pub visible: bool,
    /// Whether the seed only accepts shoots in the garden namespace.
    #[serde(default)]
    pub protected: bool,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SeedProvider {
    #[serde(rename = "type", default)]
    pub provider_type: String,
    #[serde(default)]
    pub region: String,
}

impl Resource for Seed {
    const KIND: ResourceKind = ResourceKind::Seed;

    fn cache_key(&self) -> String {
        self.name.clone()
    }
}

// ── Project ───────────────────────────────────────────────────────

/// A tenant grouping owning shoots and plants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub name: String,
    /// Namespace in the garden cluster backing this project.
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub phase: String,
    #[serde(default)]
    pub members: Vec<ProjectMember>,
}

/// An RBAC subject that is a member of a project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMember {
    /// `User`, `Group` or `ServiceAccount`.
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl Resource for Project {
    const KIND: ResourceKind = ResourceKind::Project;

    fn cache_key(&self) -> String {
        self.name.clone()
    }
}

// ── Plant ─────────────────────────────────────────────────────────

/// An externally managed cluster registered for observability.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Plant {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub project: String,
    /// Discovered cluster facts; absent until the plant controller reported them.
    #[serde(default)]
    pub cluster_info: Option<ClusterInfo>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClusterInfo {
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub version: String,
}

impl Resource for Plant {
    const KIND: ResourceKind = ResourceKind::Plant;

    fn cache_key(&self) -> String {
        format!("{}/{}", self.project, self.name)
    }
}
