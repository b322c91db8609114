//! Response-duration providers for `garden_shoot_response_duration_milliseconds`.

use std::time::Duration;

use garden_state::Shoot;

/// Supplies the measured API server response time of a shoot.
///
/// Implementations must answer from memory; they are called during a scrape.
/// `None` means the API server was not reachable (or never measured) and
/// the shoot gets no response-duration sample.
pub trait ResponseDurations: Send + Sync {
    fn response_duration(&self, shoot: &Shoot) -> Option<Duration>;
}

/// Uses the measurement recorded on the shoot object itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordedDurations;

impl ResponseDurations for RecordedDurations {
    fn response_duration(&self, shoot: &Shoot) -> Option<Duration> {
        shoot.api_response_duration_millis.map(Duration::from_millis)
    }
}

/// Milliseconds with sub-millisecond precision.
pub(crate) fn as_millis_f64(duration: Duration) -> f64 {
    duration.as_micros() as f64 / 1000.0
}
