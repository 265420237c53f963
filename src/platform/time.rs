//! Embassy-based time source
//!
//! Calibration timeouts read the Embassy time driver through `TimeSource`.

use accelcal_core::traits::TimeSource;

/// Monotonic time from `embassy_time::Instant`.
///
/// ```ignore
/// use accelcal::platform::EmbassyTime;
/// use accelcal::subsystems::accel_cal::AccelCalRunner;
///
/// let runner = AccelCalRunner::from_params(EmbassyTime, &store);
/// ```
#[derive(Clone, Copy, Default)]
pub struct EmbassyTime;

impl TimeSource for EmbassyTime {
    fn now_ms(&self) -> u64 {
        embassy_time::Instant::now().as_millis()
    }

    fn now_us(&self) -> u64 {
        embassy_time::Instant::now().as_micros()
    }
}
