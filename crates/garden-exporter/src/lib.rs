//! garden-exporter — serves garden metrics over HTTP.
//!
//! # Architecture
//!
//! ```text
//! snapshot.json ──refresh loop──▶ SnapshotCaches
//!                                   │
//!                 ResponseTimeMonitor (optional, probes API servers)
//!                                   │
//!                     GardenCollector ─▶ Registry ─▶ GET /metrics
//! ```

pub mod app;
pub mod config;
pub mod refresh;

pub use app::Exporter;
pub use config::ExporterConfig;
