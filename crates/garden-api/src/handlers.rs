//! HTTP handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;
use tracing::error;

use crate::ApiState;

const TEXT_FORMAT: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Per-kind sync state reported by `/readyz`.
#[derive(Debug, Serialize)]
struct Readiness {
    ready: bool,
    shoots: bool,
    seeds: bool,
    projects: bool,
    plants: bool,
}

/// GET /metrics
pub async fn prometheus_metrics(State(state): State<ApiState>) -> impl IntoResponse {
    match garden_metrics::render_prometheus(&state.registry) {
        Ok(body) => (StatusCode::OK, [("content-type", TEXT_FORMAT)], body).into_response(),
        Err(e) => {
            error!(error = %e, "failed to render metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// GET /healthz
pub async fn healthz() -> &'static str {
    "ok"
}

/// GET /readyz
pub async fn readyz(State(state): State<ApiState>) -> impl IntoResponse {
    let caches = &state.caches;
    let readiness = Readiness {
        ready: caches.all_synced(),
        shoots: caches.shoots.has_synced(),
        seeds: caches.seeds.has_synced(),
        projects: caches.projects.has_synced(),
        plants: caches.plants.has_synced(),
    };
    let status = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(readiness))
}
