//! Command Protocol Handler
//!
//! Handles COMMAND_LONG messages from the ground control station that drive
//! accelerometer calibration.
//!
//! # Supported Commands
//!
//! - **MAV_CMD_PREFLIGHT_CALIBRATION**: param5 = 1 starts a session,
//!   all-zero parameters cancel it
//! - **MAV_CMD_ACCELCAL_VEHICLE_POS**: param1 = 1..=6 reports the vehicle
//!   is in place for that orientation
//!
//! # Command Flow
//!
//! 1. GCS sends COMMAND_LONG message
//! 2. CommandHandler validates command and parameters
//! 3. Handler queues the calibration command for the control loop
//! 4. Handler sends COMMAND_ACK with result (ACCEPTED/DENIED/UNSUPPORTED)
//!
//! The session itself narrates progress via STATUSTEXT once the runner
//! picks the command up.

use accelcal_core::accel_cal::{AccelCalCommand, VehiclePosition};
use mavlink::ardupilotmega::{MavCmd, MavResult, COMMAND_ACK_DATA, COMMAND_LONG_DATA};

use crate::subsystems::accel_cal::commands;

/// Command handler for COMMAND_LONG messages
#[derive(Default)]
pub struct CommandHandler {}

impl CommandHandler {
    /// Create a new command handler
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle COMMAND_LONG message from GCS
    ///
    /// Returns the COMMAND_ACK to send back.
    pub fn handle_command_long(&mut self, cmd: &COMMAND_LONG_DATA) -> COMMAND_ACK_DATA {
        crate::log_debug!("Received COMMAND_LONG: command={}", cmd.command as u32);

        let result = match cmd.command {
            MavCmd::MAV_CMD_PREFLIGHT_CALIBRATION => self.handle_preflight_calibration(cmd),
            MavCmd::MAV_CMD_ACCELCAL_VEHICLE_POS => self.handle_vehicle_pos(cmd),
            _ => {
                crate::log_warn!("Unsupported command: {}", cmd.command as u32);
                MavResult::MAV_RESULT_UNSUPPORTED
            }
        };

        COMMAND_ACK_DATA {
            command: cmd.command,
            result,
            progress: 0,         // MAVLink v2 extension
            result_param2: 0,    // MAVLink v2 extension
            target_system: 0,    // MAVLink v2 extension
            target_component: 0, // MAVLink v2 extension
        }
    }

    /// Handle MAV_CMD_PREFLIGHT_CALIBRATION command
    ///
    /// param5: 1.0 starts accelerometer calibration. All parameters zero
    /// cancels a running calibration. Other sensor calibrations are not
    /// handled here.
    fn handle_preflight_calibration(&mut self, cmd: &COMMAND_LONG_DATA) -> MavResult {
        let params = [
            cmd.param1, cmd.param2, cmd.param3, cmd.param4, cmd.param5, cmd.param6, cmd.param7,
        ];

        let command = if (cmd.param5 as i32) == 1 {
            AccelCalCommand::Start
        } else if params.iter().all(|p| *p == 0.0) {
            AccelCalCommand::Cancel
        } else {
            crate::log_warn!("Unsupported preflight calibration request");
            return MavResult::MAV_RESULT_UNSUPPORTED;
        };

        self.queue(command)
    }

    /// Handle MAV_CMD_ACCELCAL_VEHICLE_POS command
    ///
    /// param1: ACCELCAL_VEHICLE_POS value (1 = level .. 6 = back)
    fn handle_vehicle_pos(&mut self, cmd: &COMMAND_LONG_DATA) -> MavResult {
        let raw = cmd.param1 as i32;
        let position = u8::try_from(raw)
            .ok()
            .and_then(|value| VehiclePosition::try_from(value).ok());

        match position {
            Some(position) => self.queue(AccelCalCommand::CollectSample {
                position: Some(position),
            }),
            None => {
                crate::log_warn!("Invalid vehicle position: {}", raw);
                MavResult::MAV_RESULT_DENIED
            }
        }
    }

    fn queue(&mut self, command: AccelCalCommand) -> MavResult {
        match commands::submit(command) {
            Ok(()) => {
                crate::log_info!("Calibration command queued: {}", command.as_str());
                MavResult::MAV_RESULT_ACCEPTED
            }
            Err(rejected) => {
                crate::log_warn!("Calibration queue full, dropped {}", rejected.as_str());
                MavResult::MAV_RESULT_TEMPORARILY_REJECTED
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subsystems::accel_cal::commands::{reset_queue, take_pending};

    fn create_command_long(command: MavCmd, param1: f32, param5: f32) -> COMMAND_LONG_DATA {
        COMMAND_LONG_DATA {
            target_system: 1,
            target_component: 1,
            command,
            confirmation: 0,
            param1,
            param2: 0.0,
            param3: 0.0,
            param4: 0.0,
            param5,
            param6: 0.0,
            param7: 0.0,
        }
    }

    #[test]
    #[serial_test::serial]
    fn test_preflight_calibration_starts_session() {
        reset_queue();
        let mut handler = CommandHandler::new();

        let cmd = create_command_long(MavCmd::MAV_CMD_PREFLIGHT_CALIBRATION, 0.0, 1.0);
        let ack = handler.handle_command_long(&cmd);

        assert_eq!(ack.command, MavCmd::MAV_CMD_PREFLIGHT_CALIBRATION);
        assert_eq!(ack.result, MavResult::MAV_RESULT_ACCEPTED);
        assert_eq!(take_pending().as_slice(), &[AccelCalCommand::Start]);
    }

    #[test]
    #[serial_test::serial]
    fn test_all_zero_preflight_calibration_cancels() {
        reset_queue();
        let mut handler = CommandHandler::new();

        let cmd = create_command_long(MavCmd::MAV_CMD_PREFLIGHT_CALIBRATION, 0.0, 0.0);
        let ack = handler.handle_command_long(&cmd);

        assert_eq!(ack.result, MavResult::MAV_RESULT_ACCEPTED);
        assert_eq!(take_pending().as_slice(), &[AccelCalCommand::Cancel]);
    }

    #[test]
    #[serial_test::serial]
    fn test_other_preflight_calibration_unsupported() {
        reset_queue();
        let mut handler = CommandHandler::new();

        // param1 = 1 is gyro calibration
        let cmd = create_command_long(MavCmd::MAV_CMD_PREFLIGHT_CALIBRATION, 1.0, 0.0);
        let ack = handler.handle_command_long(&cmd);

        assert_eq!(ack.result, MavResult::MAV_RESULT_UNSUPPORTED);
        assert!(take_pending().is_empty());
    }

    #[test]
    #[serial_test::serial]
    fn test_vehicle_pos_queues_collect() {
        reset_queue();
        let mut handler = CommandHandler::new();

        let cmd = create_command_long(MavCmd::MAV_CMD_ACCELCAL_VEHICLE_POS, 4.0, 0.0);
        let ack = handler.handle_command_long(&cmd);

        assert_eq!(ack.result, MavResult::MAV_RESULT_ACCEPTED);
        assert_eq!(
            take_pending().as_slice(),
            &[AccelCalCommand::CollectSample {
                position: Some(VehiclePosition::NoseDown)
            }]
        );
    }

    #[test]
    #[serial_test::serial]
    fn test_vehicle_pos_out_of_range_denied() {
        reset_queue();
        let mut handler = CommandHandler::new();

        for param1 in [0.0, 7.0, -1.0] {
            let cmd = create_command_long(MavCmd::MAV_CMD_ACCELCAL_VEHICLE_POS, param1, 0.0);
            let ack = handler.handle_command_long(&cmd);
            assert_eq!(ack.result, MavResult::MAV_RESULT_DENIED);
        }
        assert!(take_pending().is_empty());
    }

    #[test]
    #[serial_test::serial]
    fn test_full_queue_temporarily_rejected() {
        reset_queue();
        let mut handler = CommandHandler::new();
        let cmd = create_command_long(MavCmd::MAV_CMD_ACCELCAL_VEHICLE_POS, 1.0, 0.0);

        for _ in 0..commands::COMMAND_QUEUE_CAPACITY {
            assert_eq!(
                handler.handle_command_long(&cmd).result,
                MavResult::MAV_RESULT_ACCEPTED
            );
        }

        let ack = handler.handle_command_long(&cmd);
        assert_eq!(ack.result, MavResult::MAV_RESULT_TEMPORARILY_REJECTED);
        reset_queue();
    }

    #[test]
    #[serial_test::serial]
    fn test_unsupported_command() {
        reset_queue();
        let mut handler = CommandHandler::new();

        let cmd = create_command_long(MavCmd::MAV_CMD_NAV_WAYPOINT, 0.0, 0.0);
        let ack = handler.handle_command_long(&cmd);

        assert_eq!(ack.result, MavResult::MAV_RESULT_UNSUPPORTED);
        assert!(take_pending().is_empty());
    }
}
