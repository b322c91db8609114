//! garden-api — HTTP surface of the garden exporter.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/metrics` | Prometheus text exposition of the registry |
//! | GET | `/healthz` | Liveness, always `ok` |
//! | GET | `/readyz` | 200 once every snapshot cache has synced, 503 before |

pub mod handlers;

use axum::Router;
use axum::routing::get;
use garden_state::SnapshotCaches;
use prometheus::Registry;

/// Shared state for the handlers.
#[derive(Clone)]
pub struct ApiState {
    pub registry: Registry,
    pub caches: SnapshotCaches,
}

/// Build the exporter router.
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/metrics", get(handlers::prometheus_metrics))
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        .with_state(state)
}
