//! Interactive accelerometer calibration
//!
//! - [`AccelCalibrator`]: per-sensor sampling and fitting state machine
//! - [`AccelCalClient`]: contract for modules owning calibrators
//! - [`AccelCal`]: session orchestrator driving every registered calibrator
//!   as one barrier-synchronized session
//! - [`StatusReporter`]: sink for operator-facing status text

pub mod calibrator;
pub mod client;
pub mod command;
pub mod config;
pub mod correction;
pub mod error;
pub mod fit;
pub mod orchestrator;
pub mod position;
pub mod reporter;
pub mod status;

pub use calibrator::{AccelCalibrator, SampleOutcome};
pub use client::AccelCalClient;
pub use command::AccelCalCommand;
pub use config::{AccelCalConfig, GRAVITY_MSS, MAX_SAMPLES, MIN_SAMPLES};
pub use correction::AccelCorrection;
pub use error::{AccelCalError, CalibratorFailure, FitError};
pub use fit::{fit_offset_scale, FitReport};
pub use orchestrator::{AccelCal, SessionOutcome, MAX_CLIENTS};
pub use position::VehiclePosition;
pub use reporter::{Severity, StatusReporter};
pub use status::{aggregate_status, CalibrationStatus, StatusTally};
