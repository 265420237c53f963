#![cfg_attr(not(test), no_std)]

//! accelcal - Interactive accelerometer calibration for embedded autopilots
//!
//! This library wires the pure calibration logic from `accelcal_core` into
//! an autopilot: MAVLink command handling, STATUSTEXT narration, the
//! inertial sensor client and the control-loop runner.

// Core systems (logging)
pub mod core;

// Communication protocols (MAVLink command and STATUSTEXT surface)
pub mod communication;

// Subsystems (inertial sensors, calibration session)
pub mod subsystems;

// Platform time source
#[cfg(feature = "embassy")]
pub mod platform;
