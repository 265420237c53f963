//! Status reporting contract
//!
//! The orchestrator narrates every state transition and every rejected
//! command through a [`StatusReporter`]. The reporter decides how the text
//! reaches the operator (MAVLink STATUSTEXT queue, console, test recorder);
//! delivery failures are its own concern and never flow back.

use core::fmt;

/// Message severity, ordered from most to least urgent.
///
/// Values match the MAVLink `MAV_SEVERITY` enumeration so the application
/// crate can map them one-to-one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Severity {
    /// System is unusable
    Emergency = 0,
    /// Action must be taken immediately
    Alert = 1,
    /// Critical conditions
    Critical = 2,
    /// Error conditions
    Error = 3,
    /// Warning conditions
    Warning = 4,
    /// Normal but significant condition
    Notice = 5,
    /// Informational message
    Info = 6,
    /// Debug-level message
    Debug = 7,
}

/// Sink for human-readable calibration status text.
pub trait StatusReporter {
    /// Deliver one message.
    ///
    /// `message` is pre-formatted lazily; implementations render it into
    /// whatever buffer they own.
    fn report(&self, severity: Severity, message: fmt::Arguments<'_>);
}

#[cfg(test)]
pub(crate) mod testing {
    extern crate std;

    use super::*;
    use core::cell::RefCell;
    use std::string::String;
    use std::vec::Vec;

    /// Reporter that keeps every message for later assertions.
    #[derive(Default)]
    pub(crate) struct RecordingReporter {
        messages: RefCell<Vec<(Severity, String)>>,
    }

    impl RecordingReporter {
        pub(crate) fn messages(&self) -> Vec<(Severity, String)> {
            self.messages.borrow().clone()
        }

        pub(crate) fn contains(&self, needle: &str) -> bool {
            self.messages
                .borrow()
                .iter()
                .any(|(_, text)| text.contains(needle))
        }

        pub(crate) fn count_containing(&self, needle: &str) -> usize {
            self.messages
                .borrow()
                .iter()
                .filter(|(_, text)| text.contains(needle))
                .count()
        }

        pub(crate) fn clear(&self) {
            self.messages.borrow_mut().clear();
        }
    }

    impl StatusReporter for RecordingReporter {
        fn report(&self, severity: Severity, message: fmt::Arguments<'_>) {
            self.messages
                .borrow_mut()
                .push((severity, std::format!("{}", message)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingReporter;
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Emergency < Severity::Error);
        assert!(Severity::Warning < Severity::Info);
        assert_eq!(Severity::Debug as u8, 7);
    }

    #[test]
    fn test_recording_reporter_formats_arguments() {
        let reporter = RecordingReporter::default();
        reporter.report(Severity::Info, format_args!("step {} of {}", 2, 6));

        let messages = reporter.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].0, Severity::Info);
        assert_eq!(messages[0].1, "step 2 of 6");
    }
}
