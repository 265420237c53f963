//! Time abstraction traits for platform-agnostic timing operations.
//!
//! Calibration timeouts are expressed in elapsed time, so everything that
//! needs "now" goes through `TimeSource` instead of counting control-loop
//! iterations. This keeps timeouts correct when the loop rate varies and
//! lets host tests drive time by hand.

use core::cell::Cell;

/// Platform-agnostic monotonic time source.
///
/// - An Embassy/HAL timer wrapper on embedded targets
/// - `MockTime` for host testing with controllable time
///
/// # Example
///
/// ```
/// use accelcal_core::traits::{MockTime, TimeSource};
///
/// fn step_expired<T: TimeSource>(time: &T, entered_ms: u64, timeout_ms: u64) -> bool {
///     time.now_ms().saturating_sub(entered_ms) > timeout_ms
/// }
///
/// let time = MockTime::new();
/// assert!(!step_expired(&time, 0, 30_000));
/// time.advance_ms(30_001);
/// assert!(step_expired(&time, 0, 30_000));
/// ```
pub trait TimeSource: Clone + Send + Sync {
    /// Returns current time in milliseconds since system start.
    fn now_ms(&self) -> u64;

    /// Returns current time in microseconds since system start.
    fn now_us(&self) -> u64;
}

/// Borrowed time sources share the underlying clock.
impl<T: TimeSource> TimeSource for &T {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }

    fn now_us(&self) -> u64 {
        (**self).now_us()
    }
}

// ============================================================================
// Mock Implementation (always available for testing)
// ============================================================================

/// Mock time source for testing with controllable time advancement.
///
/// Cloning copies the current value; share one clock between a test and the
/// code under test by passing `&MockTime`.
///
/// ```
/// use accelcal_core::traits::{MockTime, TimeSource};
///
/// let time = MockTime::new();
/// time.advance_ms(250);
/// assert_eq!(time.now_ms(), 250);
/// assert_eq!(time.now_us(), 250_000);
/// ```
#[derive(Clone, Default)]
pub struct MockTime {
    current_us: Cell<u64>,
}

// Safety: MockTime is only used in single-threaded test contexts
// where Cell is safe. The Send+Sync bounds on TimeSource trait
// are required for embedded contexts, but MockTime is not used there.
unsafe impl Send for MockTime {}
unsafe impl Sync for MockTime {}

impl MockTime {
    /// Creates a new `MockTime` starting at time 0.
    pub fn new() -> Self {
        Self {
            current_us: Cell::new(0),
        }
    }

    /// Creates a new `MockTime` starting at the specified time in milliseconds.
    pub fn with_initial_ms(ms: u64) -> Self {
        Self {
            current_us: Cell::new(ms * 1000),
        }
    }

    /// Sets the current time to an absolute value in milliseconds.
    pub fn set_ms(&self, ms: u64) {
        self.current_us.set(ms * 1000);
    }

    /// Advances the current time by the specified number of milliseconds.
    pub fn advance_ms(&self, ms: u64) {
        self.current_us.set(self.current_us.get() + ms * 1000);
    }
}

impl TimeSource for MockTime {
    fn now_ms(&self) -> u64 {
        self.current_us.get() / 1000
    }

    fn now_us(&self) -> u64 {
        self.current_us.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_time_initial_value() {
        let time = MockTime::new();
        assert_eq!(time.now_us(), 0);
        assert_eq!(time.now_ms(), 0);
    }

    #[test]
    fn mock_time_with_initial() {
        let time = MockTime::with_initial_ms(5_000);
        assert_eq!(time.now_us(), 5_000_000);
        assert_eq!(time.now_ms(), 5_000);
    }

    #[test]
    fn mock_time_set_and_advance() {
        let time = MockTime::new();
        time.set_ms(1_000);
        time.advance_ms(500);
        assert_eq!(time.now_ms(), 1_500);
    }

    #[test]
    fn borrowed_source_tracks_the_same_clock() {
        fn read<T: TimeSource>(time: T) -> u64 {
            time.now_ms()
        }

        let time = MockTime::new();
        let borrowed = &time;
        time.advance_ms(42);
        assert_eq!(read(borrowed), 42);

        // A clone is a snapshot, not a shared clock
        let snapshot = time.clone();
        time.advance_ms(8);
        assert_eq!(snapshot.now_ms(), 42);
        assert_eq!(read(&time), 50);
    }
}
