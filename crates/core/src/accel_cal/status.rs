//! Calibration status values and the session aggregation rule

use core::fmt;

use super::reporter::Severity;

/// Status of one calibrator, or of the whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalibrationStatus {
    /// No session running (or calibrator reset)
    #[default]
    NotStarted,
    /// Ready for the operator to present the next orientation
    WaitingForOrientation,
    /// Averaging readings for the current orientation
    CollectingSample,
    /// All samples collected and fitted
    Success,
    /// Timed out or the fit failed
    Failed,
}

impl CalibrationStatus {
    /// Human-readable name used in status replies
    pub fn as_str(self) -> &'static str {
        match self {
            CalibrationStatus::NotStarted => "not started",
            CalibrationStatus::WaitingForOrientation => "waiting for orientation",
            CalibrationStatus::CollectingSample => "collecting sample",
            CalibrationStatus::Success => "success",
            CalibrationStatus::Failed => "failed",
        }
    }

    /// Severity used when this status is reported to the operator
    pub fn severity(self) -> Severity {
        match self {
            CalibrationStatus::Failed => Severity::Error,
            CalibrationStatus::Success => Severity::Notice,
            _ => Severity::Info,
        }
    }

    /// True for Success and Failed
    pub fn is_terminal(self) -> bool {
        matches!(self, CalibrationStatus::Success | CalibrationStatus::Failed)
    }
}

impl fmt::Display for CalibrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Running count of calibrator statuses, folded into the session status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusTally {
    total: usize,
    failed: usize,
    succeeded: usize,
    collecting: usize,
}

impl StatusTally {
    /// Count one calibrator
    pub fn record(&mut self, status: CalibrationStatus) {
        self.total += 1;
        match status {
            CalibrationStatus::Failed => self.failed += 1,
            CalibrationStatus::Success => self.succeeded += 1,
            CalibrationStatus::CollectingSample => self.collecting += 1,
            _ => {}
        }
    }

    /// Number of calibrators counted
    pub fn total(&self) -> usize {
        self.total
    }

    /// Session status for the counted calibrators.
    ///
    /// Precedence, first match wins:
    /// 1. session not started → `NotStarted`
    /// 2. any calibrator failed → `Failed`
    /// 3. every calibrator succeeded → `Success`
    /// 4. any calibrator collecting → `CollectingSample`
    /// 5. otherwise → `WaitingForOrientation`
    ///
    /// An empty tally never counts as success.
    pub fn aggregate(&self, started: bool) -> CalibrationStatus {
        if !started {
            CalibrationStatus::NotStarted
        } else if self.failed > 0 {
            CalibrationStatus::Failed
        } else if self.total > 0 && self.succeeded == self.total {
            CalibrationStatus::Success
        } else if self.collecting > 0 {
            CalibrationStatus::CollectingSample
        } else {
            CalibrationStatus::WaitingForOrientation
        }
    }
}

/// Derive the session status from the statuses of every calibrator.
///
/// See [`StatusTally::aggregate`] for the precedence rule.
pub fn aggregate_status<I>(started: bool, statuses: I) -> CalibrationStatus
where
    I: IntoIterator<Item = CalibrationStatus>,
{
    let mut tally = StatusTally::default();
    for status in statuses {
        tally.record(status);
    }
    tally.aggregate(started)
}

#[cfg(test)]
mod tests {
    use super::CalibrationStatus::*;
    use super::*;

    #[test]
    fn test_not_started_wins_over_everything() {
        assert_eq!(aggregate_status(false, [Failed, Success]), NotStarted);
    }

    #[test]
    fn test_any_failed_is_failed() {
        assert_eq!(
            aggregate_status(
                true,
                [WaitingForOrientation, Failed, CollectingSample, Success]
            ),
            Failed
        );
    }

    #[test]
    fn test_all_success() {
        assert_eq!(aggregate_status(true, [Success, Success]), Success);
    }

    #[test]
    fn test_partial_success_with_collecting() {
        assert_eq!(
            aggregate_status(true, [Success, CollectingSample]),
            CollectingSample
        );
    }

    #[test]
    fn test_collecting_blocks_waiting() {
        assert_eq!(
            aggregate_status(true, [WaitingForOrientation, CollectingSample]),
            CollectingSample
        );
    }

    #[test]
    fn test_waiting_is_the_fallback() {
        assert_eq!(
            aggregate_status(true, [WaitingForOrientation, Success]),
            WaitingForOrientation
        );
        assert_eq!(
            aggregate_status(true, [NotStarted]),
            WaitingForOrientation
        );
    }

    #[test]
    fn test_empty_tally_is_not_success() {
        assert_eq!(aggregate_status(true, []), WaitingForOrientation);
        assert_eq!(StatusTally::default().total(), 0);
    }

    #[test]
    fn test_status_helpers() {
        assert!(Success.is_terminal());
        assert!(Failed.is_terminal());
        assert!(!NotStarted.is_terminal());
        assert_eq!(Failed.severity(), Severity::Error);
        assert_eq!(CollectingSample.as_str(), "collecting sample");
    }
}
