//! Autopilot subsystems
//!
//! - **INS**: accelerometer instances, their corrections and calibrators
//! - **Accel Cal**: command queue and control-loop runner for calibration

pub mod accel_cal;
pub mod ins;
