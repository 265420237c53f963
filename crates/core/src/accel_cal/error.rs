//! Accelerometer Calibration Error Types
//!
//! Every error is handled locally: it is returned to the caller and
//! narrated through the status reporter, and none of them is fatal. A failed
//! session returns to `NotStarted` and can be restarted.

use core::fmt;

/// Reasons the least-squares fit did not produce a usable correction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitError {
    /// Fewer samples than unknowns
    NotEnoughSamples,
    /// Normal equations could not be solved (degenerate sample geometry)
    Singular,
    /// Solution contains NaN or infinity
    NonFinite,
    /// RMS residual stayed above the configured tolerance
    ResidualTooLarge,
    /// Fitted offset magnitude is implausibly large
    OffsetOutOfRange,
    /// A fitted scale factor lies outside the accepted range
    ScaleOutOfRange,
}

impl FitError {
    /// Short description suitable for status text and log lines
    pub fn as_str(self) -> &'static str {
        match self {
            FitError::NotEnoughSamples => "not enough samples",
            FitError::Singular => "degenerate sample geometry",
            FitError::NonFinite => "non-finite solution",
            FitError::ResidualTooLarge => "fit did not converge",
            FitError::OffsetOutOfRange => "offset out of range",
            FitError::ScaleOutOfRange => "scale out of range",
        }
    }
}

impl fmt::Display for FitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a single calibrator ended in `Failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibratorFailure {
    /// Stalled in WaitingForOrientation or CollectingSample past its bound
    StepTimeout,
    /// The fit rejected the collected samples
    Fit(FitError),
}

impl fmt::Display for CalibratorFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalibratorFailure::StepTimeout => write!(f, "timed out"),
            CalibratorFailure::Fit(err) => write!(f, "fit failure: {}", err),
        }
    }
}

/// Errors surfaced by the calibration orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccelCalError {
    /// Client registry is at capacity; registration ignored
    RegistrationOverflow,
    /// Client object is already registered
    DuplicateClient,
    /// `start` called while a session is running
    AlreadyRunning,
    /// `start` called with no calibrators registered
    NoCalibrators,
    /// `collect_sample` called while not every calibrator is waiting
    NotReady,
    /// A calibrator stalled past the configured bound
    StepTimeout,
    /// A calibrator's fit failed
    FitFailure(FitError),
    /// Calibrators disagree on which orientation step they are on
    StepMismatch,
}

impl AccelCalError {
    /// Short name for log lines (fit causes are not included)
    pub fn as_str(self) -> &'static str {
        match self {
            AccelCalError::RegistrationOverflow => "registration overflow",
            AccelCalError::DuplicateClient => "duplicate client",
            AccelCalError::AlreadyRunning => "already running",
            AccelCalError::NoCalibrators => "no calibrators",
            AccelCalError::NotReady => "not ready",
            AccelCalError::StepTimeout => "step timeout",
            AccelCalError::FitFailure(_) => "fit failure",
            AccelCalError::StepMismatch => "step mismatch",
        }
    }
}

impl fmt::Display for AccelCalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccelCalError::RegistrationOverflow => write!(f, "too many calibration clients"),
            AccelCalError::DuplicateClient => write!(f, "client already registered"),
            AccelCalError::AlreadyRunning => write!(f, "calibration already running"),
            AccelCalError::NoCalibrators => write!(f, "no accelerometers to calibrate"),
            AccelCalError::NotReady => write!(f, "not ready to collect sample"),
            AccelCalError::StepTimeout => write!(f, "timed out waiting for sample"),
            AccelCalError::FitFailure(err) => write!(f, "fit failure: {}", err),
            AccelCalError::StepMismatch => write!(f, "sensors out of step"),
        }
    }
}

impl From<CalibratorFailure> for AccelCalError {
    fn from(failure: CalibratorFailure) -> Self {
        match failure {
            CalibratorFailure::StepTimeout => AccelCalError::StepTimeout,
            CalibratorFailure::Fit(err) => AccelCalError::FitFailure(err),
        }
    }
}

impl From<FitError> for AccelCalError {
    fn from(err: FitError) -> Self {
        AccelCalError::FitFailure(err)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::format;

    use super::*;

    #[test]
    fn test_error_display_names_cause() {
        assert_eq!(
            format!("{}", AccelCalError::StepTimeout),
            "timed out waiting for sample"
        );
        assert_eq!(
            format!("{}", AccelCalError::FitFailure(FitError::Singular)),
            "fit failure: degenerate sample geometry"
        );
        assert_eq!(
            format!("{}", AccelCalError::NotReady),
            "not ready to collect sample"
        );
    }

    #[test]
    fn test_calibrator_failure_conversion() {
        assert_eq!(
            AccelCalError::from(CalibratorFailure::StepTimeout),
            AccelCalError::StepTimeout
        );
        assert_eq!(
            AccelCalError::from(CalibratorFailure::Fit(FitError::ScaleOutOfRange)),
            AccelCalError::FitFailure(FitError::ScaleOutOfRange)
        );
    }

    #[test]
    fn test_error_names_for_logs() {
        assert_eq!(AccelCalError::StepMismatch.as_str(), "step mismatch");
        assert_eq!(
            AccelCalError::FitFailure(FitError::Singular).as_str(),
            "fit failure"
        );
    }

    #[test]
    fn test_calibrator_failure_display() {
        assert_eq!(format!("{}", CalibratorFailure::StepTimeout), "timed out");
        assert_eq!(
            format!("{}", CalibratorFailure::Fit(FitError::ResidualTooLarge)),
            "fit failure: fit did not converge"
        );
    }
}
