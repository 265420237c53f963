//! Parameter management types
//!
//! Calibration settings and persisted calibration results live in the
//! `ParameterStore`. Flash persistence is outside this crate.

pub mod accel_cal;
pub mod error;
pub mod ins;
pub mod storage;

pub use accel_cal::AccelCalParams;
pub use error::ParameterError;
pub use ins::{AccelCorrectionParams, MAX_ACCEL_INSTANCES};
pub use storage::{ParamFlags, ParamValue, ParameterStore};
pub use storage::{MAX_PARAMS, PARAM_NAME_LEN};
