//! Background task that probes shoot API servers.
//!
//! Each round lists the shoot cache, probes every shoot with an API server
//! URL, and stores the outcome keyed by `project/name`. Scrapes only read
//! the stored outcomes.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use garden_metrics::{RecordedDurations, ResponseDurations};
use garden_state::{Lister, Resource, Shoot};
use tokio::sync::{Semaphore, watch};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

use crate::checker::ApiProber;
use crate::error::ProbeError;

/// Upper bound on probes in flight during one round.
const MAX_CONCURRENT_PROBES: usize = 16;

/// Outcome counters of one probe round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProbeRound {
    pub measured: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Last probe outcome per shoot. `None` marks an unreachable API server.
type Outcomes = HashMap<String, Option<Duration>>;

/// Periodically measures API server response times of all shoots.
#[derive(Clone)]
pub struct ResponseTimeMonitor {
    shoots: Arc<dyn Lister<Shoot>>,
    prober: ApiProber,
    interval: Duration,
    outcomes: Arc<RwLock<Outcomes>>,
}

impl ResponseTimeMonitor {
    pub fn new(shoots: Arc<dyn Lister<Shoot>>, prober: ApiProber, interval: Duration) -> Self {
        Self {
            shoots,
            prober,
            interval,
            outcomes: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Run probe rounds until `shutdown` flips.
    pub fn spawn(&self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        let monitor = self.clone();
        tokio::spawn(async move {
            info!(interval = ?monitor.interval, timeout = ?monitor.prober.timeout(), "response time monitor started");
            loop {
                let round = monitor.probe_all().await;
                debug!(
                    measured = round.measured,
                    failed = round.failed,
                    skipped = round.skipped,
                    "probe round finished"
                );

                tokio::select! {
                    _ = tokio::time::sleep(monitor.interval) => {}
                    _ = shutdown.changed() => {
                        debug!("response time monitor shutting down");
                        break;
                    }
                }
            }
        })
    }

    /// Probe every listed shoot once and replace the stored outcomes.
    ///
    /// Hibernated shoots and shoots without an API server URL are not
    /// probed and keep no outcome.
    pub async fn probe_all(&self) -> ProbeRound {
        let mut round = ProbeRound::default();
        let limit = Arc::new(Semaphore::new(MAX_CONCURRENT_PROBES));
        let mut probes = JoinSet::new();

        for shoot in self.shoots.list() {
            let url = match shoot.api_server_url.as_deref() {
                Some(url) if !shoot.hibernated && !url.is_empty() => url.to_string(),
                _ => {
                    round.skipped += 1;
                    continue;
                }
            };
            let key = shoot.cache_key();
            let prober = self.prober.clone();
            let limit = limit.clone();
            probes.spawn(async move {
                let _permit = limit.acquire_owned().await;
                let result = prober.probe(&url).await;
                (key, result)
            });
        }

        let mut outcomes = Outcomes::new();
        while let Some(joined) = probes.join_next().await {
            let Ok((key, result)) = joined else {
                round.failed += 1;
                continue;
            };
            match result {
                Ok(elapsed) => {
                    round.measured += 1;
                    outcomes.insert(key, Some(elapsed));
                }
                Err(e) => {
                    round.failed += 1;
                    log_failure(&key, &e);
                    outcomes.insert(key, None);
                }
            }
        }

        *self.outcomes.write().unwrap_or_else(PoisonError::into_inner) = outcomes;
        round
    }

    /// The stored outcome for a shoot key, if it was probed last round.
    pub fn outcome(&self, key: &str) -> Option<Option<Duration>> {
        let outcomes = self.outcomes.read().unwrap_or_else(PoisonError::into_inner);
        outcomes.get(key).copied()
    }
}

fn log_failure(key: &str, err: &ProbeError) {
    match err {
        ProbeError::InvalidUrl(_) | ProbeError::UnsupportedScheme(_) => {
            warn!(shoot = %key, error = %err, "api server url cannot be probed")
        }
        _ => debug!(shoot = %key, error = %err, "api server probe failed"),
    }
}

impl ResponseDurations for ResponseTimeMonitor {
    /// The last probe measurement. Shoots the monitor has not probed fall
    /// back to the duration recorded on the object.
    fn response_duration(&self, shoot: &Shoot) -> Option<Duration> {
        match self.outcome(&shoot.cache_key()) {
            Some(measured) => measured,
            None => RecordedDurations.response_duration(shoot),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::tests::serve_status;
    use garden_state::ResourceCache;

    fn shoot(name: &str, url: Option<String>) -> Shoot {
        Shoot {
            name: name.to_string(),
            project: "team-a".to_string(),
            api_server_url: url,
            ..Default::default()
        }
    }

    fn monitor(cache: &ResourceCache<Shoot>) -> ResponseTimeMonitor {
        let prober = ApiProber::new("/healthz", Duration::from_secs(2)).unwrap();
        ResponseTimeMonitor::new(Arc::new(cache.clone()), prober, Duration::from_secs(60))
    }

    #[tokio::test]
    async fn reachable_shoot_is_measured() {
        let url = serve_status("200 OK", Duration::from_millis(10)).await;
        let cache = ResourceCache::new();
        cache.replace(vec![shoot("dev", Some(url))]);

        let m = monitor(&cache);
        let round = m.probe_all().await;
        assert_eq!(round.measured, 1);

        let duration = m.response_duration(&shoot("dev", None)).unwrap();
        assert!(duration >= Duration::from_millis(10));
    }

    #[tokio::test]
    async fn failed_probe_emits_no_duration() {
        let url = serve_status("500 Internal Server Error", Duration::ZERO).await;
        let cache = ResourceCache::new();
        let mut broken = shoot("dev", Some(url));
        broken.api_response_duration_millis = Some(40);
        cache.replace(vec![broken.clone()]);

        let m = monitor(&cache);
        assert_eq!(m.probe_all().await.failed, 1);
        assert_eq!(m.outcome("team-a/dev"), Some(None));
        assert_eq!(m.response_duration(&broken), None);
    }

    #[tokio::test]
    async fn unprobed_shoot_falls_back_to_recorded_value() {
        let cache = ResourceCache::new();
        let mut sleeping = shoot("sleepy", Some("http://127.0.0.1:1".into()));
        sleeping.hibernated = true;
        sleeping.api_response_duration_millis = Some(75);
        cache.replace(vec![sleeping.clone(), shoot("no-url", None)]);

        let m = monitor(&cache);
        let round = m.probe_all().await;
        assert_eq!(round, ProbeRound { measured: 0, failed: 0, skipped: 2 });
        assert_eq!(m.response_duration(&sleeping), Some(Duration::from_millis(75)));
        assert_eq!(m.response_duration(&shoot("no-url", None)), None);
    }

    #[tokio::test]
    async fn outcomes_of_removed_shoots_are_dropped() {
        let url = serve_status("200 OK", Duration::ZERO).await;
        let cache = ResourceCache::new();
        cache.replace(vec![shoot("dev", Some(url))]);

        let m = monitor(&cache);
        m.probe_all().await;
        assert!(m.outcome("team-a/dev").is_some());

        cache.replace(Vec::new());
        m.probe_all().await;
        assert_eq!(m.outcome("team-a/dev"), None);
    }

    #[tokio::test]
    async fn spawned_monitor_stops_on_shutdown() {
        let cache = ResourceCache::new();
        cache.replace(Vec::new());
        let (tx, rx) = watch::channel(false);

        let handle = monitor(&cache).spawn(rx);
        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
