//! MAVLink STATUSTEXT Notification Queue
//!
//! Centralized queue of operator-facing status messages. Calibration
//! narration reaches it through [`MavlinkReporter`], which implements the
//! core `StatusReporter` contract.
//!
//! # Architecture
//!
//! - **Global Static**: one queue shared by every reporter
//! - **Heapless Queue**: fixed capacity (16 messages), oldest dropped on overflow
//! - **Severity Mapping**: core severities map 1:1 onto MAV_SEVERITY
//!
//! The telemetry writer drains the queue with [`take_pending_messages`]
//! and owns the STATUSTEXT encoding.

use core::cell::RefCell;
use core::fmt::{self, Write};

use accelcal_core::accel_cal::{Severity, StatusReporter};
use critical_section::Mutex;
use heapless::{Deque, String, Vec};
use mavlink::ardupilotmega::MavSeverity;

/// Maximum message length (200 characters)
pub const MAX_MESSAGE_LEN: usize = 200;

/// Queue capacity (16 messages)
pub const QUEUE_CAPACITY: usize = 16;

/// Queued STATUSTEXT message with severity and text
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedMessage {
    pub severity: MavSeverity,
    pub text: String<MAX_MESSAGE_LEN>,
}

/// Pending STATUSTEXT messages
struct StatusNotifier {
    queue: Deque<QueuedMessage, QUEUE_CAPACITY>,
    dropped_count: u32,
}

impl StatusNotifier {
    const fn new() -> Self {
        Self {
            queue: Deque::new(),
            dropped_count: 0,
        }
    }

    /// Enqueue a message, dropping the oldest one when full.
    fn enqueue(&mut self, message: QueuedMessage) {
        if self.queue.is_full() {
            self.queue.pop_front();
            self.dropped_count += 1;
            crate::log_warn!(
                "STATUSTEXT queue full, dropped {} messages",
                self.dropped_count
            );
        }

        // Cannot fail: a slot was freed above
        let _ = self.queue.push_back(message);
    }
}

static NOTIFIER: Mutex<RefCell<StatusNotifier>> = Mutex::new(RefCell::new(StatusNotifier::new()));

/// Writer that keeps as much text as fits and silently drops the rest
struct TruncatingWriter<'a> {
    buf: &'a mut String<MAX_MESSAGE_LEN>,
    truncated: bool,
}

impl Write for TruncatingWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.buf.push(c).is_err() {
                self.truncated = true;
                break;
            }
        }
        Ok(())
    }
}

fn render(message: fmt::Arguments<'_>) -> String<MAX_MESSAGE_LEN> {
    let mut text = String::new();
    let mut writer = TruncatingWriter {
        buf: &mut text,
        truncated: false,
    };
    let _ = writer.write_fmt(message);
    if writer.truncated {
        crate::log_warn!("STATUSTEXT truncated to {} chars", MAX_MESSAGE_LEN);
    }
    text
}

fn send_statustext(severity: MavSeverity, message: fmt::Arguments<'_>) {
    let message = QueuedMessage {
        severity,
        text: render(message),
    };
    critical_section::with(|cs| {
        NOTIFIER.borrow(cs).borrow_mut().enqueue(message);
    });
}

/// Drain every pending message, oldest first.
pub fn take_pending_messages() -> Vec<QueuedMessage, QUEUE_CAPACITY> {
    critical_section::with(|cs| {
        let mut notifier = NOTIFIER.borrow(cs).borrow_mut();
        let mut messages = Vec::new();
        while let Some(message) = notifier.queue.pop_front() {
            let _ = messages.push(message);
        }
        messages
    })
}

/// Map a core severity onto MAV_SEVERITY
pub fn mav_severity(severity: Severity) -> MavSeverity {
    match severity {
        Severity::Emergency => MavSeverity::MAV_SEVERITY_EMERGENCY,
        Severity::Alert => MavSeverity::MAV_SEVERITY_ALERT,
        Severity::Critical => MavSeverity::MAV_SEVERITY_CRITICAL,
        Severity::Error => MavSeverity::MAV_SEVERITY_ERROR,
        Severity::Warning => MavSeverity::MAV_SEVERITY_WARNING,
        Severity::Notice => MavSeverity::MAV_SEVERITY_NOTICE,
        Severity::Info => MavSeverity::MAV_SEVERITY_INFO,
        Severity::Debug => MavSeverity::MAV_SEVERITY_DEBUG,
    }
}

/// `StatusReporter` feeding the global STATUSTEXT queue
#[derive(Debug, Clone, Copy, Default)]
pub struct MavlinkReporter;

impl StatusReporter for MavlinkReporter {
    fn report(&self, severity: Severity, message: fmt::Arguments<'_>) {
        send_statustext(mav_severity(severity), message);
    }
}

#[cfg(test)]
pub(crate) fn reset_notifier() {
    critical_section::with(|cs| {
        let mut notifier = NOTIFIER.borrow(cs).borrow_mut();
        notifier.queue.clear();
        notifier.dropped_count = 0;
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    // Use serial_test to prevent concurrent access to global NOTIFIER
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_enqueue_drain_cycle() {
        reset_notifier();

        MavlinkReporter.report(
            Severity::Error,
            format_args!("Calibration FAILED: sensors out of step"),
        );
        MavlinkReporter.report(
            Severity::Info,
            format_args!("Place vehicle level and press any key."),
        );

        let messages = take_pending_messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].severity, MavSeverity::MAV_SEVERITY_ERROR);
        assert_eq!(
            messages[0].text.as_str(),
            "Calibration FAILED: sensors out of step"
        );
        assert_eq!(
            messages[1].text.as_str(),
            "Place vehicle level and press any key."
        );
        assert!(take_pending_messages().is_empty());
    }

    #[test]
    #[serial]
    fn test_queue_overflow_drops_oldest() {
        reset_notifier();

        for i in 0..19 {
            MavlinkReporter.report(Severity::Info, format_args!("Message {}", i));
        }

        let messages = take_pending_messages();
        assert_eq!(messages.len(), QUEUE_CAPACITY);
        assert_eq!(messages[0].text.as_str(), "Message 3");
        assert_eq!(messages[15].text.as_str(), "Message 18");
        critical_section::with(|cs| {
            assert_eq!(NOTIFIER.borrow(cs).borrow().dropped_count, 3);
        });
    }

    #[test]
    #[serial]
    fn test_message_truncation() {
        reset_notifier();

        let long_message = "A".repeat(250);
        MavlinkReporter.report(Severity::Warning, format_args!("{}", long_message));

        let messages = take_pending_messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text.len(), MAX_MESSAGE_LEN);
    }

    #[test]
    #[serial]
    fn test_reporter_formats_and_maps_severity() {
        reset_notifier();

        MavlinkReporter.report(Severity::Notice, format_args!("Sample {} collected", 4));

        let messages = take_pending_messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].severity, MavSeverity::MAV_SEVERITY_NOTICE);
        assert_eq!(messages[0].text.as_str(), "Sample 4 collected");
    }

    #[test]
    fn test_severity_values_match_mavlink() {
        for severity in [Severity::Emergency, Severity::Warning, Severity::Debug] {
            assert_eq!(mav_severity(severity) as u8, severity as u8);
        }
    }
}
