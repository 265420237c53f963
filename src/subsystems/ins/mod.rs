//! Inertial Sensor Manager
//!
//! Owns the accelerometer instances of one sensor board: their persisted
//! corrections and one calibrator each. Registers with the calibration
//! session as an `AccelCalClient`.
//!
//! # Data Flow
//!
//! ```text
//! driver ── raw ──> feed() ──> AccelCalibrator (while collecting)
//!                \─> corrected() ──> AccelCorrection::apply ──> AHRS
//! session success ──> save_calibrations() ──> INS_ACC*OFFS_* / INS_ACC*SCAL_*
//! ```
//!
//! A primary IMU board uses instances starting at 0; a secondary board can
//! take the remaining slots with `first_instance`.

use core::cell::RefCell;

use accelcal_core::accel_cal::{AccelCalClient, AccelCalibrator, AccelCorrection};
use accelcal_core::parameters::{
    AccelCorrectionParams, ParameterError, ParameterStore, MAX_ACCEL_INSTANCES,
};
use heapless::Vec;
use nalgebra::Vector3;

/// Accelerometers of one sensor board
pub struct InertialSensor<'p> {
    calibrators: Vec<AccelCalibrator, MAX_ACCEL_INSTANCES>,
    corrections: Vec<AccelCorrection, MAX_ACCEL_INSTANCES>,
    first_instance: u8,
    params: &'p RefCell<ParameterStore>,
}

impl<'p> InertialSensor<'p> {
    /// Set up `count` accelerometers at parameter instances
    /// `first_instance..first_instance + count`, loading their stored
    /// corrections.
    ///
    /// # Errors
    ///
    /// [`ParameterError::UnknownInstance`] if any instance has no parameter
    /// slots.
    pub fn new(
        params: &'p RefCell<ParameterStore>,
        first_instance: u8,
        count: u8,
    ) -> Result<Self, ParameterError> {
        let mut calibrators = Vec::new();
        let mut corrections = Vec::new();

        {
            let store = params.borrow();
            for offset in 0..count {
                let instance = first_instance.saturating_add(offset);
                let correction = AccelCorrectionParams::load(&store, instance)?;
                corrections
                    .push(correction)
                    .map_err(|_| ParameterError::UnknownInstance(instance))?;
                calibrators
                    .push(AccelCalibrator::new())
                    .map_err(|_| ParameterError::UnknownInstance(instance))?;
            }
        }

        crate::log_info!(
            "INS: {} accelerometers from instance {}",
            count,
            first_instance
        );

        Ok(Self {
            calibrators,
            corrections,
            first_instance,
            params,
        })
    }

    /// Number of accelerometers on this board
    pub fn accel_count(&self) -> usize {
        self.calibrators.len()
    }

    /// Feed one raw reading (m/s²) from accelerometer `index`.
    ///
    /// Only a calibrator that is collecting a sample uses it.
    pub fn feed(&mut self, index: usize, raw: Vector3<f32>, now_ms: u64) {
        if let Some(calibrator) = self.calibrators.get_mut(index) {
            calibrator.new_sample(raw, now_ms);
        }
    }

    /// Raw reading of accelerometer `index` with its stored correction applied
    pub fn corrected(&self, index: usize, raw: Vector3<f32>) -> Option<Vector3<f32>> {
        self.corrections
            .get(index)
            .map(|correction| correction.apply(raw))
    }

    /// Correction currently applied to accelerometer `index`
    pub fn correction(&self, index: usize) -> Option<&AccelCorrection> {
        self.corrections.get(index)
    }

    fn instance(&self, index: usize) -> u8 {
        self.first_instance.saturating_add(index as u8)
    }
}

impl AccelCalClient for InertialSensor<'_> {
    fn calibrator(&self, index: usize) -> Option<&AccelCalibrator> {
        self.calibrators.get(index)
    }

    fn calibrator_mut(&mut self, index: usize) -> Option<&mut AccelCalibrator> {
        self.calibrators.get_mut(index)
    }

    /// Persist every accelerometer's new correction, or none of them.
    fn save_calibrations(&mut self) {
        let mut store = self.params.borrow_mut();

        let mut results: Vec<AccelCorrection, MAX_ACCEL_INSTANCES> = Vec::new();
        for (index, calibrator) in self.calibrators.iter().enumerate() {
            let instance = self.instance(index);
            let Some(correction) = calibrator.correction() else {
                crate::log_error!(
                    "INS: accel {} has no correction, nothing saved",
                    instance
                );
                return;
            };
            if AccelCorrectionParams::check_writable(&store, instance).is_err() {
                crate::log_error!(
                    "INS: accel {} parameters not writable, nothing saved",
                    instance
                );
                return;
            }
            // Same capacity as `calibrators`
            let _ = results.push(correction);
        }

        for (index, correction) in results.into_iter().enumerate() {
            let instance = self.instance(index);
            match AccelCorrectionParams::save(&mut store, instance, &correction) {
                Ok(()) => {
                    self.corrections[index] = correction;
                    crate::log_info!("INS: accel {} calibration saved", instance);
                }
                Err(_) => {
                    crate::log_error!("INS: failed to save accel {} calibration", instance);
                }
            }
        }
    }

    fn calibration_cancelled(&mut self) {
        crate::log_warn!(
            "INS: calibration cancelled, keeping stored corrections for {} accels",
            self.calibrators.len()
        );
    }
}
