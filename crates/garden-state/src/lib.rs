//! garden-state — resource model and snapshot caches for the garden exporter.
//!
//! Holds the in-memory view of shoots, seeds, projects and plants that the
//! metrics collector reads on every scrape.
//!
//! # Architecture
//!
//! ```text
//! SnapshotDocument (JSON)
//!   └── load() → per-kind object lists
//!
//! ResourceCache<T>
//!   ├── replace() / apply() ← refresh loop (writer side)
//!   └── list()              → Lister<T> (reader side, used at scrape time)
//!
//! SnapshotCaches
//!   └── one ResourceCache per kind, relisted together by replace_all()
//! ```
//!
//! Caches are `Clone` + `Send` + `Sync` (backed by `Arc<RwLock<..>>`) and
//! never block on anything but their own lock.

pub mod cache;
pub mod error;
pub mod loader;
pub mod snapshot;
pub mod types;

pub use cache::{Lister, ResourceCache, WatchEvent};
pub use error::{StateError, StateResult};
pub use loader::{LoadReport, SnapshotDocument};
pub use snapshot::SnapshotCaches;
pub use types::*;
