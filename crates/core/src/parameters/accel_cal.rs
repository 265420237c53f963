//! Accelerometer Calibration Parameter Definitions
//!
//! # Parameters
//!
//! - `INS_ACAL_NSMP` - Orientation samples per calibration (6..=8)
//! - `INS_ACAL_STIME` - Averaging window per orientation (seconds)
//! - `INS_ACAL_TMO` - Time allowed to place the vehicle (seconds)
//! - `INS_ACAL_TOL` - Maximum RMS fit residual (m/s²)
//!
//! Settings without a parameter (sample gap timeout, iteration cap, sanity
//! bounds) keep their `AccelCalConfig` defaults.

use super::error::ParameterError;
use super::storage::{ParamFlags, ParamValue, ParameterStore};
use crate::accel_cal::AccelCalConfig;

/// Accelerometer calibration settings loaded from parameter store
#[derive(Debug, Clone, PartialEq)]
pub struct AccelCalParams {
    /// Orientation samples required
    pub num_samples: u8,
    /// Averaging window per orientation (seconds)
    pub sample_time: f32,
    /// Orientation timeout (seconds)
    pub step_timeout: f32,
    /// Fit tolerance (m/s²)
    pub fit_tolerance: f32,
}

impl Default for AccelCalParams {
    fn default() -> Self {
        let config = AccelCalConfig::default();
        Self {
            num_samples: config.num_samples,
            sample_time: config.sample_time_ms as f32 / 1000.0,
            step_timeout: config.step_timeout_ms as f32 / 1000.0,
            fit_tolerance: config.fit_tolerance,
        }
    }
}

impl AccelCalParams {
    /// Register calibration parameters with default values
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        let defaults = Self::default();

        store.register(
            "INS_ACAL_NSMP",
            ParamValue::Int(i32::from(defaults.num_samples)),
            ParamFlags::empty(),
        )?;
        store.register(
            "INS_ACAL_STIME",
            ParamValue::Float(defaults.sample_time),
            ParamFlags::empty(),
        )?;
        store.register(
            "INS_ACAL_TMO",
            ParamValue::Float(defaults.step_timeout),
            ParamFlags::empty(),
        )?;
        store.register(
            "INS_ACAL_TOL",
            ParamValue::Float(defaults.fit_tolerance),
            ParamFlags::empty(),
        )?;

        Ok(())
    }

    /// Load calibration parameters, falling back to defaults for missing or
    /// non-positive values
    pub fn from_store(store: &ParameterStore) -> Self {
        let defaults = Self::default();
        let positive = |name: &str, fallback: f32| match store.get_f32(name) {
            Some(v) if v > 0.0 => v,
            _ => fallback,
        };

        Self {
            num_samples: positive("INS_ACAL_NSMP", f32::from(defaults.num_samples)) as u8,
            sample_time: positive("INS_ACAL_STIME", defaults.sample_time),
            step_timeout: positive("INS_ACAL_TMO", defaults.step_timeout),
            fit_tolerance: positive("INS_ACAL_TOL", defaults.fit_tolerance),
        }
    }

    /// Session configuration for these settings (sanitized)
    pub fn to_config(&self) -> AccelCalConfig {
        AccelCalConfig {
            num_samples: self.num_samples,
            sample_time_ms: (self.sample_time * 1000.0) as u32,
            step_timeout_ms: (self.step_timeout * 1000.0) as u32,
            fit_tolerance: self.fit_tolerance,
            ..AccelCalConfig::default()
        }
        .sanitized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_defaults() {
        let mut store = ParameterStore::new();
        AccelCalParams::register_defaults(&mut store).unwrap();

        assert_eq!(store.get("INS_ACAL_NSMP"), Some(&ParamValue::Int(6)));
        assert_eq!(store.get_f32("INS_ACAL_TMO"), Some(30.0));
        assert_eq!(store.get_f32("INS_ACAL_TOL"), Some(0.5));
    }

    #[test]
    fn test_defaults_round_trip_to_config() {
        let mut store = ParameterStore::new();
        AccelCalParams::register_defaults(&mut store).unwrap();

        let config = AccelCalParams::from_store(&store).to_config();
        assert_eq!(config, AccelCalConfig::default());
    }

    #[test]
    fn test_custom_values() {
        let mut store = ParameterStore::new();
        AccelCalParams::register_defaults(&mut store).unwrap();
        store.set("INS_ACAL_NSMP", ParamValue::Int(8)).unwrap();
        store.set("INS_ACAL_TMO", ParamValue::Float(60.0)).unwrap();
        store.set("INS_ACAL_STIME", ParamValue::Float(1.5)).unwrap();

        let config = AccelCalParams::from_store(&store).to_config();
        assert_eq!(config.num_samples, 8);
        assert_eq!(config.step_timeout_ms, 60_000);
        assert_eq!(config.sample_time_ms, 1_500);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let mut store = ParameterStore::new();
        AccelCalParams::register_defaults(&mut store).unwrap();
        store.set("INS_ACAL_TOL", ParamValue::Float(-1.0)).unwrap();
        store.set("INS_ACAL_NSMP", ParamValue::Int(20)).unwrap();

        let params = AccelCalParams::from_store(&store);
        assert_eq!(params.fit_tolerance, 0.5);

        // Out-of-range sample count is clamped by the config
        assert_eq!(params.to_config().num_samples, 8);
    }

    #[test]
    fn test_empty_store_uses_defaults() {
        let store = ParameterStore::new();
        assert_eq!(AccelCalParams::from_store(&store), AccelCalParams::default());
    }
}
