//! Persisted Accelerometer Correction Parameters
//!
//! Offsets and scales for up to three accelerometer instances, named as in
//! ArduPilot's AP_InertialSensor:
//!
//! | Instance | Offset | Scale |
//! |---|---|---|
//! | 0 | `INS_ACCOFFS_{X,Y,Z}` | `INS_ACCSCAL_{X,Y,Z}` |
//! | 1 | `INS_ACC2OFFS_{X,Y,Z}` | `INS_ACC2SCAL_{X,Y,Z}` |
//! | 2 | `INS_ACC3OFFS_{X,Y,Z}` | `INS_ACC3SCAL_{X,Y,Z}` |

use nalgebra::Vector3;

use super::error::ParameterError;
use super::storage::{ParamFlags, ParamValue, ParameterStore};
use crate::accel_cal::AccelCorrection;

/// Accelerometer instances with parameter slots
pub const MAX_ACCEL_INSTANCES: usize = 3;

type AxisNames = [&'static str; 3];

const OFFSET_NAMES: [AxisNames; MAX_ACCEL_INSTANCES] = [
    ["INS_ACCOFFS_X", "INS_ACCOFFS_Y", "INS_ACCOFFS_Z"],
    ["INS_ACC2OFFS_X", "INS_ACC2OFFS_Y", "INS_ACC2OFFS_Z"],
    ["INS_ACC3OFFS_X", "INS_ACC3OFFS_Y", "INS_ACC3OFFS_Z"],
];

const SCALE_NAMES: [AxisNames; MAX_ACCEL_INSTANCES] = [
    ["INS_ACCSCAL_X", "INS_ACCSCAL_Y", "INS_ACCSCAL_Z"],
    ["INS_ACC2SCAL_X", "INS_ACC2SCAL_Y", "INS_ACC2SCAL_Z"],
    ["INS_ACC3SCAL_X", "INS_ACC3SCAL_Y", "INS_ACC3SCAL_Z"],
];

/// Load and store per-instance accelerometer corrections
pub struct AccelCorrectionParams;

impl AccelCorrectionParams {
    /// Register identity corrections for every instance
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        for (offsets, scales) in OFFSET_NAMES.iter().zip(SCALE_NAMES.iter()) {
            for name in offsets {
                store.register(name, ParamValue::Float(0.0), ParamFlags::CALIBRATION)?;
            }
            for name in scales {
                store.register(name, ParamValue::Float(1.0), ParamFlags::CALIBRATION)?;
            }
        }
        Ok(())
    }

    /// Correction stored for `instance`.
    ///
    /// Missing parameters read as identity.
    pub fn load(store: &ParameterStore, instance: u8) -> Result<AccelCorrection, ParameterError> {
        let (offset_names, scale_names) = names_for(instance)?;
        let read = |names: &AxisNames, fallback: f32| {
            Vector3::new(
                store.get_f32(names[0]).unwrap_or(fallback),
                store.get_f32(names[1]).unwrap_or(fallback),
                store.get_f32(names[2]).unwrap_or(fallback),
            )
        };

        Ok(AccelCorrection {
            offset: read(offset_names, 0.0),
            scale: read(scale_names, 1.0),
        })
    }

    /// Check that every slot of `instance` accepts a write.
    ///
    /// # Errors
    ///
    /// - [`ParameterError::UnknownInstance`] past `MAX_ACCEL_INSTANCES`
    /// - [`ParameterError::InvalidConfig`] for an unregistered slot
    /// - [`ParameterError::ReadOnly`] for a read-only slot
    pub fn check_writable(store: &ParameterStore, instance: u8) -> Result<(), ParameterError> {
        let (offset_names, scale_names) = names_for(instance)?;
        for name in offset_names.iter().chain(scale_names.iter()) {
            if store.get(name).is_none() {
                return Err(ParameterError::InvalidConfig);
            }
            if !store.is_writable(name) {
                return Err(ParameterError::ReadOnly);
            }
        }
        Ok(())
    }

    /// Write `correction` into the slots for `instance`.
    ///
    /// Nothing is written unless every slot accepts the write.
    pub fn save(
        store: &mut ParameterStore,
        instance: u8,
        correction: &AccelCorrection,
    ) -> Result<(), ParameterError> {
        Self::check_writable(store, instance)?;
        let (offset_names, scale_names) = names_for(instance)?;
        for axis in 0..3 {
            store.set(offset_names[axis], ParamValue::Float(correction.offset[axis]))?;
            store.set(scale_names[axis], ParamValue::Float(correction.scale[axis]))?;
        }
        Ok(())
    }
}

fn names_for(instance: u8) -> Result<(&'static AxisNames, &'static AxisNames), ParameterError> {
    let index = usize::from(instance);
    match (OFFSET_NAMES.get(index), SCALE_NAMES.get(index)) {
        (Some(offsets), Some(scales)) => Ok((offsets, scales)),
        _ => Err(ParameterError::UnknownInstance(instance)),
    }
}
