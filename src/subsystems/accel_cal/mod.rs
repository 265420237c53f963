//! Accelerometer calibration subsystem
//!
//! Owns the calibration session for the vehicle. MAVLink handlers queue
//! commands in [`commands`]; [`AccelCalRunner`] drains them from the
//! control loop and narrates progress over STATUSTEXT.

pub mod commands;
pub mod runner;

pub use runner::AccelCalRunner;
