//! MAVLink 2.0 Protocol Communication
//!
//! Calibration-facing part of the ground station link. Frames are parsed and
//! written by the transport layer; this module owns the message semantics.
//!
//! # Architecture
//!
//! - **Handlers**: COMMAND_LONG to calibration commands
//! - **Status Notifier**: STATUSTEXT queue fed by the calibration session

pub mod handlers; // Message handlers
pub mod status_notifier; // STATUSTEXT notification system

pub use status_notifier::MavlinkReporter;
