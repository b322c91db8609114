//! In-memory snapshot of one resource kind.
//!
//! The writer side (`replace`, `apply`) is driven by whatever keeps the
//! snapshot fresh; the reader side is the [`Lister`] trait used by the
//! metric extractors. Objects are stored behind `Arc` so a scrape can hold
//! on to a listing while the cache is being refreshed.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::types::Resource;

/// Read access to the current snapshot of one resource kind.
pub trait Lister<T>: Send + Sync {
    /// All currently known objects, ordered by identity key.
    ///
    /// A snapshot that has not been populated yet lists as empty.
    fn list(&self) -> Vec<Arc<T>>;
}

/// A single change to a cached kind.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchEvent<T> {
    /// The object was created or updated.
    Applied(T),
    /// The object with this identity key was removed.
    Deleted(String),
}

struct Inner<T> {
    objects: BTreeMap<String, Arc<T>>,
    synced: bool,
}

/// Thread-safe keyed snapshot of one resource kind.
#[derive(Clone)]
pub struct ResourceCache<T> {
    inner: Arc<RwLock<Inner<T>>>,
}

impl<T: Resource> Default for ResourceCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Resource> ResourceCache<T> {
    /// Create an empty, not yet synced cache.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                objects: BTreeMap::new(),
                synced: false,
            })),
        }
    }

    /// Replace the whole contents (a full relist) and mark the cache synced.
    pub fn replace(&self, objects: Vec<T>) {
        let objects: BTreeMap<String, Arc<T>> = objects
            .into_iter()
            .map(|o| (o.cache_key(), Arc::new(o)))
            .collect();
        let count = objects.len();

        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.objects = objects;
        inner.synced = true;
        debug!(kind = %T::KIND, count, "cache replaced");
    }

    /// Apply a single upsert or delete event.
    pub fn apply(&self, event: WatchEvent<T>) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        match event {
            WatchEvent::Applied(object) => {
                inner.objects.insert(object.cache_key(), Arc::new(object));
            }
            WatchEvent::Deleted(key) => {
                inner.objects.remove(&key);
            }
        }
    }

    /// Look up a single object by identity key.
    pub fn get(&self, key: &str) -> Option<Arc<T>> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.objects.get(key).cloned()
    }

    /// Number of cached objects.
    pub fn len(&self) -> usize {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether at least one full relist has been applied.
    pub fn has_synced(&self) -> bool {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.synced
    }
}

impl<T: Resource> Lister<T> for ResourceCache<T> {
    fn list(&self) -> Vec<Arc<T>> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        if !inner.synced {
            return Vec::new();
        }
        inner.objects.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Seed, Shoot};

    fn shoot(project: &str, name: &str) -> Shoot {
        Shoot {
            name: name.to_string(),
            project: project.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn unsynced_cache_lists_empty() {
        let cache: ResourceCache<Shoot> = ResourceCache::new();
        cache.apply(WatchEvent::Applied(shoot("a", "one")));

        assert!(!cache.has_synced());
        assert_eq!(cache.len(), 1);
        assert!(cache.list().is_empty());
    }

    #[test]
    fn replace_marks_synced_and_orders_by_key() {
        let cache = ResourceCache::new();
        cache.replace(vec![shoot("b", "x"), shoot("a", "y"), shoot("a", "x")]);

        assert!(cache.has_synced());
        let keys: Vec<String> = cache.list().iter().map(|s| s.cache_key()).collect();
        assert_eq!(keys, vec!["a/x", "a/y", "b/x"]);
    }

    #[test]
    fn replace_drops_previous_contents() {
        let cache = ResourceCache::new();
        cache.replace(vec![shoot("a", "old")]);
        cache.replace(vec![shoot("a", "new")]);

        assert!(cache.get("a/old").is_none());
        assert!(cache.get("a/new").is_some());
    }

    #[test]
    fn apply_upserts_and_deletes() {
        let cache = ResourceCache::new();
        cache.replace(Vec::new());

        let mut seed = Seed {
            name: "aws-eu".into(),
            ..Default::default()
        };
        cache.apply(WatchEvent::Applied(seed.clone()));
        seed.visible = true;
        cache.apply(WatchEvent::Applied(seed));

        assert_eq!(cache.len(), 1);
        assert!(cache.get("aws-eu").unwrap().visible);

        cache.apply(WatchEvent::Deleted("aws-eu".into()));
        assert!(cache.is_empty());
    }

    #[test]
    fn listing_survives_refresh() {
        let cache = ResourceCache::new();
        cache.replace(vec![shoot("a", "one")]);

        let listed = cache.list();
        cache.replace(Vec::new());

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "one");
    }
}
