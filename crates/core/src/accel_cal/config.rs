//! Calibration tuning knobs
//!
//! Timeouts and convergence tolerance are explicit configuration rather
//! than constants buried in the state machines. Defaults follow ArduPilot's
//! accelerometer calibration (30 s per orientation, 0.5 m/s² fit tolerance).

/// Standard gravity (m/s²), the magnitude every corrected sample should have
pub const GRAVITY_MSS: f32 = 9.80665;

/// Fewest orientation samples a fit accepts (one per unknown)
pub const MIN_SAMPLES: u8 = 6;

/// Most orientation samples a calibrator stores
pub const MAX_SAMPLES: usize = 8;

/// Calibration session configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccelCalConfig {
    /// Orientation samples required before fitting (6..=8)
    pub num_samples: u8,
    /// Averaging window for one orientation sample (ms)
    pub sample_time_ms: u32,
    /// Maximum time a calibrator may wait for the operator (ms)
    pub step_timeout_ms: u32,
    /// Maximum gap between raw readings while collecting (ms)
    pub sample_timeout_ms: u32,
    /// Maximum RMS residual of an accepted fit (m/s²)
    pub fit_tolerance: f32,
    /// Levenberg-Marquardt iteration cap
    pub max_iterations: u8,
    /// Minimum angle between two accepted sample directions (degrees)
    pub min_sample_angle_deg: f32,
    /// Maximum magnitude of the fitted offset vector (m/s²)
    pub max_offset: f32,
    /// Smallest accepted per-axis scale factor
    pub min_scale: f32,
    /// Largest accepted per-axis scale factor
    pub max_scale: f32,
}

impl Default for AccelCalConfig {
    fn default() -> Self {
        Self {
            num_samples: 6,
            sample_time_ms: 500,
            step_timeout_ms: 30_000,
            sample_timeout_ms: 1_000,
            fit_tolerance: 0.5,
            max_iterations: 20,
            min_sample_angle_deg: 30.0,
            max_offset: 3.5,
            min_scale: 0.8,
            max_scale: 1.2,
        }
    }
}

impl AccelCalConfig {
    /// Clamp values into the range the calibrator can honor.
    pub fn sanitized(mut self) -> Self {
        self.num_samples = self.num_samples.clamp(MIN_SAMPLES, MAX_SAMPLES as u8);
        self.max_iterations = self.max_iterations.max(1);
        if self.fit_tolerance.is_nan() || self.fit_tolerance <= 0.0 {
            self.fit_tolerance = Self::default().fit_tolerance;
        }
        self.min_sample_angle_deg = self.min_sample_angle_deg.clamp(0.0, 90.0);
        self
    }
}
