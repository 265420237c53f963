//! Pending calibration commands
//!
//! MAVLink handlers run outside the control loop, so they cannot touch the
//! session directly. They submit commands here and the runner drains them
//! at the top of its next update.

use core::cell::RefCell;

use accelcal_core::accel_cal::AccelCalCommand;
use critical_section::Mutex;
use heapless::{Deque, Vec};

/// Commands held between two runner updates
pub const COMMAND_QUEUE_CAPACITY: usize = 4;

static COMMANDS: Mutex<RefCell<Deque<AccelCalCommand, COMMAND_QUEUE_CAPACITY>>> =
    Mutex::new(RefCell::new(Deque::new()));

/// Queue `command` for the next runner update.
///
/// Gives the command back when the queue is full.
pub fn submit(command: AccelCalCommand) -> Result<(), AccelCalCommand> {
    critical_section::with(|cs| COMMANDS.borrow(cs).borrow_mut().push_back(command))
}

/// Drain every queued command, oldest first.
pub fn take_pending() -> Vec<AccelCalCommand, COMMAND_QUEUE_CAPACITY> {
    critical_section::with(|cs| {
        let mut queue = COMMANDS.borrow(cs).borrow_mut();
        let mut commands = Vec::new();
        while let Some(command) = queue.pop_front() {
            let _ = commands.push(command);
        }
        commands
    })
}

/// Number of commands waiting
pub fn pending_count() -> usize {
    critical_section::with(|cs| COMMANDS.borrow(cs).borrow().len())
}

#[cfg(test)]
pub(crate) fn reset_queue() {
    critical_section::with(|cs| COMMANDS.borrow(cs).borrow_mut().clear());
}

#[cfg(test)]
mod tests {
    use super::*;
    use accelcal_core::accel_cal::VehiclePosition;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_submit_and_drain_in_order() {
        reset_queue();

        submit(AccelCalCommand::Start).unwrap();
        submit(AccelCalCommand::CollectSample {
            position: Some(VehiclePosition::Level),
        })
        .unwrap();

        assert_eq!(pending_count(), 2);
        let commands = take_pending();
        assert_eq!(
            commands.as_slice(),
            &[
                AccelCalCommand::Start,
                AccelCalCommand::CollectSample {
                    position: Some(VehiclePosition::Level)
                },
            ]
        );
        assert_eq!(pending_count(), 0);
    }

    #[test]
    #[serial]
    fn test_full_queue_returns_command() {
        reset_queue();

        for _ in 0..COMMAND_QUEUE_CAPACITY {
            submit(AccelCalCommand::Start).unwrap();
        }

        assert_eq!(
            submit(AccelCalCommand::Cancel),
            Err(AccelCalCommand::Cancel)
        );
        assert_eq!(take_pending().len(), COMMAND_QUEUE_CAPACITY);
    }
}
