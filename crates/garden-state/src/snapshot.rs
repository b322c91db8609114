//! The four resource caches as one unit.

use crate::cache::ResourceCache;
use crate::loader::SnapshotDocument;
use crate::types::{Plant, Project, Seed, Shoot};

/// One cache per resource kind. Cloning shares the underlying caches.
#[derive(Clone, Default)]
pub struct SnapshotCaches {
    pub shoots: ResourceCache<Shoot>,
    pub seeds: ResourceCache<Seed>,
    pub projects: ResourceCache<Project>,
    pub plants: ResourceCache<Plant>,
}

impl SnapshotCaches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Relist every kind from a decoded document.
    pub fn replace_all(&self, doc: SnapshotDocument) {
        self.shoots.replace(doc.shoots);
        self.seeds.replace(doc.seeds);
        self.projects.replace(doc.projects);
        self.plants.replace(doc.plants);
    }

    /// True once every kind has been relisted at least once.
    pub fn all_synced(&self) -> bool {
        self.shoots.has_synced()
            && self.seeds.has_synced()
            && self.projects.has_synced()
            && self.plants.has_synced()
    }
}
