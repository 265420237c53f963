//! Calibrator client contract
//!
//! Defines what the orchestrator may ask of a module that owns
//! calibrators. Modeled after ArduPilot's AP_AccelCal_Client three-callback
//! interface:
//! - `_acal_get_calibrator` -> [`calibrator`](AccelCalClient::calibrator) /
//!   [`calibrator_mut`](AccelCalClient::calibrator_mut)
//! - `_acal_save_calibrations` -> [`save_calibrations`](AccelCalClient::save_calibrations)
//! - `_acal_event_cancellation` -> [`calibration_cancelled`](AccelCalClient::calibration_cancelled)

use super::calibrator::AccelCalibrator;

/// A module owning one or more accelerometer calibrators.
///
/// Calibrators are addressed by dense indices starting at 0; the first index
/// returning `None` ends the client's set. The orchestrator never owns a
/// calibrator and only ever borrows it for the duration of one call.
pub trait AccelCalClient {
    /// Calibrator at `index`, or `None` past the end.
    fn calibrator(&self, index: usize) -> Option<&AccelCalibrator>;

    /// Mutable calibrator at `index`, or `None` past the end.
    fn calibrator_mut(&mut self, index: usize) -> Option<&mut AccelCalibrator>;

    /// The whole session succeeded: persist every fitted correction.
    ///
    /// Called exactly once per successful session, before the calibrators
    /// are reset, so `AccelCalibrator::correction` is still available.
    fn save_calibrations(&mut self);

    /// The session failed or was cancelled while running.
    ///
    /// Called at most once per session. Default does nothing.
    fn calibration_cancelled(&mut self) {}

    /// Number of calibrators this client currently exposes.
    fn calibrator_count(&self) -> usize {
        let mut count = 0;
        while self.calibrator(count).is_some() {
            count += 1;
        }
        count
    }
}
