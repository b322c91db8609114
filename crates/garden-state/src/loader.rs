//! Snapshot documents: a JSON dump of all four resource kinds.
//!
//! Objects are decoded one by one so a single undecodable entry does not
//! discard the rest of its kind. Only entries of the wrong JSON shape (not
//! an object, a string where a number belongs) are dropped here. Missing
//! fields decode to their defaults and are rejected by the extractors.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{StateError, StateResult};
use crate::types::*;

/// Decoded contents of a snapshot document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SnapshotDocument {
    #[serde(default)]
    pub shoots: Vec<Shoot>,
    #[serde(default)]
    pub seeds: Vec<Seed>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub plants: Vec<Plant>,
}

/// Outcome counters of a document load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped: usize,
}

#[derive(Deserialize)]
struct RawDocument {
    #[serde(default)]
    shoots: Vec<serde_json::Value>,
    #[serde(default)]
    seeds: Vec<serde_json::Value>,
    #[serde(default)]
    projects: Vec<serde_json::Value>,
    #[serde(default)]
    plants: Vec<serde_json::Value>,
}

impl SnapshotDocument {
    /// Read and decode a snapshot document from disk.
    pub fn load(path: &Path) -> StateResult<(Self, LoadReport)> {
        let content = std::fs::read(path).map_err(|e| StateError::Read(e.to_string()))?;
        let (doc, report) = Self::parse(&content)?;
        debug!(?path, loaded = report.loaded, skipped = report.skipped, "snapshot document loaded");
        Ok((doc, report))
    }

    /// Decode a snapshot document from raw JSON bytes.
    pub fn parse(bytes: &[u8]) -> StateResult<(Self, LoadReport)> {
        let raw: RawDocument =
            serde_json::from_slice(bytes).map_err(|e| StateError::Deserialize(e.to_string()))?;

        let mut report = LoadReport::default();
        let doc = SnapshotDocument {
            shoots: decode_all(ResourceKind::Shoot, raw.shoots, &mut report),
            seeds: decode_all(ResourceKind::Seed, raw.seeds, &mut report),
            projects: decode_all(ResourceKind::Project, raw.projects, &mut report),
            plants: decode_all(ResourceKind::Plant, raw.plants, &mut report),
        };
        Ok((doc, report))
    }
}

fn decode_all<T: DeserializeOwned>(
    kind: ResourceKind,
    values: Vec<serde_json::Value>,
    report: &mut LoadReport,
) -> Vec<T> {
    let mut out = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<T>(value) {
            Ok(object) => {
                report.loaded += 1;
                out.push(object);
            }
            Err(e) => {
                report.skipped += 1;
                warn!(%kind, index, error = %e, "skipping undecodable object");
            }
        }
    }
    out
}
