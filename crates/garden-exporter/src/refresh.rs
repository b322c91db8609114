//! Snapshot refresh loop.
//!
//! Reloads the snapshot document on an interval and relists all four
//! caches from it. A failed reload leaves the previous contents in place.

use std::path::{Path, PathBuf};
use std::time::Duration;

use garden_state::{LoadReport, SnapshotCaches, SnapshotDocument};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Load `path` once and relist the caches from it.
pub fn refresh_once(path: &Path, caches: &SnapshotCaches) -> anyhow::Result<LoadReport> {
    let (doc, report) = SnapshotDocument::load(path)?;
    caches.replace_all(doc);
    if report.skipped > 0 {
        warn!(path = %path.display(), skipped = report.skipped, "snapshot contained undecodable objects");
    }
    Ok(report)
}

/// Refresh the caches every `interval` until `shutdown` flips.
pub fn spawn_refresh_loop(
    path: PathBuf,
    interval: Duration,
    caches: SnapshotCaches,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(path = %path.display(), ?interval, "snapshot refresh loop started");
        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {
                    match refresh_once(&path, &caches) {
                        Ok(report) => debug!(loaded = report.loaded, "snapshot refreshed"),
                        Err(e) => warn!(error = %e, "snapshot refresh failed, keeping previous contents"),
                    }
                }
                _ = shutdown.changed() => {
                    debug!("snapshot refresh loop shutting down");
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use garden_state::Lister;

    const DOC: &str = r#"{
        "shoots": [{"name": "dev", "project": "team-a"}],
        "seeds": [{"name": "aws-eu"}, "not an object"],
        "projects": [],
        "plants": []
    }"#;

    #[test]
    fn refresh_populates_every_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        std::fs::write(&path, DOC).unwrap();

        let caches = SnapshotCaches::new();
        let report = refresh_once(&path, &caches).unwrap();
        assert_eq!(report, LoadReport { loaded: 2, skipped: 1 });
        assert!(caches.all_synced());
        assert_eq!(caches.shoots.list().len(), 1);
    }

    #[test]
    fn failed_refresh_keeps_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        std::fs::write(&path, DOC).unwrap();

        let caches = SnapshotCaches::new();
        refresh_once(&path, &caches).unwrap();

        std::fs::write(&path, "{ truncated").unwrap();
        assert!(refresh_once(&path, &caches).is_err());
        assert_eq!(caches.seeds.list().len(), 1);

        std::fs::remove_file(&path).unwrap();
        assert!(refresh_once(&path, &caches).is_err());
        assert_eq!(caches.shoots.list().len(), 1);
    }

    #[tokio::test]
    async fn loop_picks_up_changes_and_stops() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        std::fs::write(&path, r#"{"seeds": []}"#).unwrap();

        let caches = SnapshotCaches::new();
        refresh_once(&path, &caches).unwrap();
        std::fs::write(&path, DOC).unwrap();

        let (tx, rx) = watch::channel(false);
        let handle = spawn_refresh_loop(path, Duration::from_millis(20), caches.clone(), rx);

        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        while caches.seeds.list().is_empty() && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(caches.seeds.list().len(), 1);

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
