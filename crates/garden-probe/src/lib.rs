//! garden-probe — API server response times for the garden exporter.
//!
//! Probing happens in a background task on its own interval, never during
//! a scrape. The collector reads the latest measurements through the
//! `ResponseDurations` trait implemented by [`ResponseTimeMonitor`].
//!
//! # Architecture
//!
//! ```text
//! ResponseTimeMonitor
//!   ├── background task (interval, watch-channel shutdown)
//!   │   └── ApiProber::probe() per shoot → Duration | ProbeError
//!   └── outcomes: project/name → last measurement (read at scrape time)
//! ```

pub mod checker;
pub mod error;
pub mod monitor;

pub use checker::ApiProber;
pub use error::ProbeError;
pub use monitor::{ProbeRound, ResponseTimeMonitor};
