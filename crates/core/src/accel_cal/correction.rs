//! Accelerometer offset/scale correction
//!
//! The result of a successful calibration, and the form in which it is
//! persisted and applied to raw readings.

use nalgebra::Vector3;

/// Per-axis accelerometer correction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccelCorrection {
    /// Accelerometer offset (m/s²)
    /// Subtracted from raw readings before scaling
    pub offset: Vector3<f32>,

    /// Accelerometer scale factors (dimensionless)
    /// Applied after offset removal (typically near 1.0)
    pub scale: Vector3<f32>,
}

impl Default for AccelCorrection {
    /// Identity correction: zero offset, unit scale
    fn default() -> Self {
        Self {
            offset: Vector3::zeros(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl AccelCorrection {
    /// Apply the correction to a raw reading
    ///
    /// # Formula
    ///
    /// ```text
    /// corrected = (raw - offset) .* scale
    /// ```
    /// where `.*` is element-wise multiplication
    pub fn apply(&self, raw: Vector3<f32>) -> Vector3<f32> {
        (raw - self.offset).component_mul(&self.scale)
    }

    /// Check whether this differs from the identity correction
    ///
    /// Heuristic only; says nothing about calibration quality.
    pub fn is_calibrated(&self) -> bool {
        let offset_nonzero = self.offset.norm() > 0.01;
        let scale_non_unit = (self.scale - Vector3::new(1.0, 1.0, 1.0)).norm() > 0.001;
        offset_nonzero || scale_non_unit
    }

    /// Check that every component is finite
    pub fn is_finite(&self) -> bool {
        self.offset.iter().chain(self.scale.iter()).all(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_default_is_identity() {
        let correction = AccelCorrection::default();
        let raw = Vector3::new(0.3, -9.7, 1.2);
        assert_eq!(correction.apply(raw), raw);
        assert!(!correction.is_calibrated());
    }

    #[test]
    fn test_apply_offset_then_scale() {
        let correction = AccelCorrection {
            offset: Vector3::new(0.1, -0.05, 0.02),
            scale: Vector3::new(1.01, 0.99, 1.02),
        };

        let calibrated = correction.apply(Vector3::new(1.0, 2.0, 9.81));

        // Expected: (1.0 - 0.1) * 1.01, (2.0 - (-0.05)) * 0.99, (9.81 - 0.02) * 1.02
        assert!((calibrated.x - 0.909).abs() < EPSILON);
        assert!((calibrated.y - 2.0295).abs() < EPSILON);
        assert!((calibrated.z - 9.9858).abs() < 1e-4);
    }

    #[test]
    fn test_is_calibrated_detects_scale_only() {
        let correction = AccelCorrection {
            scale: Vector3::new(1.0, 1.05, 1.0),
            ..Default::default()
        };
        assert!(correction.is_calibrated());
    }

    #[test]
    fn test_is_finite() {
        let mut correction = AccelCorrection::default();
        assert!(correction.is_finite());
        correction.offset.y = f32::NAN;
        assert!(!correction.is_finite());
    }
}
