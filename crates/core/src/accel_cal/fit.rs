//! Offset/scale fit for accelerometer samples
//!
//! Fits the axis-aligned model `corrected = (raw - offset) .* scale` so that
//! every corrected sample has magnitude `GRAVITY_MSS`. The residual of one
//! sample is
//!
//! ```text
//! r = g - |(s - b) .* k|
//! ```
//!
//! and the six unknowns `[bx, by, bz, kx, ky, kz]` are solved with
//! Levenberg-Marquardt on the normal equations. The sample count is small
//! (at most `MAX_SAMPLES`), so `JᵀJ` and `Jᵀr` are accumulated row by row
//! into fixed 6x6 storage and the full Jacobian is never materialized.

use libm::sqrtf;
use nalgebra::{Matrix6, Vector3, Vector6};

use super::config::{AccelCalConfig, GRAVITY_MSS, MIN_SAMPLES};
use super::correction::AccelCorrection;
use super::error::FitError;

const PARAM_COUNT: usize = 6;

/// Initial damping factor
const LAMBDA_INIT: f32 = 1e-3;
/// Damping never drops below this
const LAMBDA_MIN: f32 = 1e-7;
/// Damping beyond this means the problem is not solvable
const LAMBDA_MAX: f32 = 1e10;
const LAMBDA_UP: f32 = 10.0;
const LAMBDA_DOWN: f32 = 10.0;

/// Parameter update small enough to call the fit converged
const STEP_TOLERANCE: f32 = 1e-6;

/// Outcome of a successful fit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitReport {
    /// Fitted offset and scale
    pub correction: AccelCorrection,
    /// Root-mean-square residual over all samples (m/s²)
    pub rms_residual: f32,
    /// Solver iterations used
    pub iterations: u8,
}

/// Fit offset and scale to a set of static orientation samples.
///
/// # Errors
///
/// - [`FitError::NotEnoughSamples`] with fewer than six samples
/// - [`FitError::Singular`] when the geometry leaves an axis unobservable
/// - [`FitError::ResidualTooLarge`] when the RMS residual exceeds
///   `config.fit_tolerance`
/// - [`FitError::OffsetOutOfRange`] / [`FitError::ScaleOutOfRange`] when the
///   solution is outside the plausible hardware envelope
pub fn fit_offset_scale(
    samples: &[Vector3<f32>],
    config: &AccelCalConfig,
) -> Result<FitReport, FitError> {
    if samples.len() < MIN_SAMPLES as usize {
        return Err(FitError::NotEnoughSamples);
    }

    let mut params = Vector6::new(0.0, 0.0, 0.0, 1.0, 1.0, 1.0);
    let mut current_cost = cost(&params, samples);
    let mut lambda = LAMBDA_INIT;
    let mut iterations = 0u8;

    while iterations < config.max_iterations {
        let (jtj, jtr) = normal_equations(&params, samples);

        let mut damped = jtj;
        for i in 0..PARAM_COUNT {
            damped[(i, i)] += lambda * jtj[(i, i)];
        }

        let Some(cholesky) = damped.cholesky() else {
            lambda *= LAMBDA_UP;
            if lambda > LAMBDA_MAX {
                return Err(FitError::Singular);
            }
            continue;
        };
        iterations += 1;

        let step = cholesky.solve(&(-jtr));
        let candidate = params + step;
        let candidate_cost = cost(&candidate, samples);

        if candidate_cost.is_finite() && candidate_cost < current_cost {
            params = candidate;
            current_cost = candidate_cost;
            lambda = (lambda / LAMBDA_DOWN).max(LAMBDA_MIN);
            if step.norm() < STEP_TOLERANCE {
                break;
            }
        } else {
            lambda *= LAMBDA_UP;
            if lambda > LAMBDA_MAX {
                break;
            }
        }
    }

    let correction = AccelCorrection {
        offset: Vector3::new(params[0], params[1], params[2]),
        scale: Vector3::new(params[3], params[4], params[5]),
    };
    let rms_residual = sqrtf(current_cost / samples.len() as f32);

    if !correction.is_finite() || !rms_residual.is_finite() {
        return Err(FitError::NonFinite);
    }
    if rms_residual > config.fit_tolerance {
        return Err(FitError::ResidualTooLarge);
    }
    if correction.offset.norm() > config.max_offset {
        return Err(FitError::OffsetOutOfRange);
    }
    if correction
        .scale
        .iter()
        .any(|k| *k < config.min_scale || *k > config.max_scale)
    {
        return Err(FitError::ScaleOutOfRange);
    }

    Ok(FitReport {
        correction,
        rms_residual,
        iterations,
    })
}

/// Apply parameters `[b, k]` to one raw sample
fn corrected(params: &Vector6<f32>, sample: &Vector3<f32>) -> Vector3<f32> {
    Vector3::new(
        (sample.x - params[0]) * params[3],
        (sample.y - params[1]) * params[4],
        (sample.z - params[2]) * params[5],
    )
}

/// Sum of squared residuals
fn cost(params: &Vector6<f32>, samples: &[Vector3<f32>]) -> f32 {
    samples
        .iter()
        .map(|sample| {
            let r = GRAVITY_MSS - corrected(params, sample).norm();
            r * r
        })
        .sum()
}

/// Accumulate `JᵀJ` and `Jᵀr` over all samples.
///
/// With `c = (s - b) .* k` and `n = |c|`:
/// - `∂r/∂b_i = k_i c_i / n`
/// - `∂r/∂k_i = -c_i (s_i - b_i) / n`
fn normal_equations(params: &Vector6<f32>, samples: &[Vector3<f32>]) -> (Matrix6<f32>, Vector6<f32>) {
    let mut jtj = Matrix6::zeros();
    let mut jtr = Vector6::zeros();

    for sample in samples {
        let c = corrected(params, sample);
        let n = c.norm();
        if n <= f32::EPSILON {
            continue;
        }
        let r = GRAVITY_MSS - n;

        let mut row = Vector6::zeros();
        for axis in 0..3 {
            let centered = sample[axis] - params[axis];
            row[axis] = params[axis + 3] * c[axis] / n;
            row[axis + 3] = -c[axis] * centered / n;
        }

        jtj += row * row.transpose();
        jtr += row * r;
    }

    (jtj, jtr)
}
