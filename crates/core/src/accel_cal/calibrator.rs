//! Per-sensor calibration state machine
//!
//! One `AccelCalibrator` belongs to one physical accelerometer. It collects
//! one averaged reading per commanded orientation and, once it has enough
//! well-separated readings, fits offset and scale.
//!
//! ```text
//! NotStarted ──start──▶ WaitingForOrientation ──collect_sample──▶ CollectingSample
//!                              ▲                                       │
//!                              └──── more samples needed / rejected ───┤
//!                                                                      ├──▶ Success
//!                                        timeout or fit failure ───────┴──▶ Failed
//! ```

use heapless::Vec;
use libm::{cosf, sqrtf};
use nalgebra::Vector3;

use super::config::{AccelCalConfig, MAX_SAMPLES};
use super::correction::AccelCorrection;
use super::error::{AccelCalError, CalibratorFailure};
use super::fit::{fit_offset_scale, FitReport};
use super::status::CalibrationStatus;

/// Averaged readings weaker than this carry no usable direction (m/s²)
const MIN_SAMPLE_MAGNITUDE: f32 = 1.0;

/// What happened to the most recently finished orientation sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleOutcome {
    /// Stored; the step advanced
    Accepted,
    /// Discarded; the same step must be repeated
    Rejected,
}

/// In-flight average for the current orientation
#[derive(Debug, Clone, Copy)]
struct SampleAccumulator {
    sum: Vector3<f32>,
    count: u32,
    started_ms: u64,
    last_reading_ms: u64,
}

impl SampleAccumulator {
    fn new(now_ms: u64) -> Self {
        Self {
            sum: Vector3::zeros(),
            count: 0,
            started_ms: now_ms,
            last_reading_ms: now_ms,
        }
    }

    fn mean(&self) -> Option<Vector3<f32>> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f32)
        }
    }
}

/// Sampling and fitting state machine for one accelerometer.
#[derive(Debug, Clone)]
pub struct AccelCalibrator {
    status: CalibrationStatus,
    config: AccelCalConfig,
    samples: Vec<Vector3<f32>, MAX_SAMPLES>,
    accumulator: Option<SampleAccumulator>,
    /// Time (ms) the current status was entered
    status_since_ms: u64,
    fit: Option<FitReport>,
    failure: Option<CalibratorFailure>,
    last_outcome: Option<SampleOutcome>,
}

impl Default for AccelCalibrator {
    fn default() -> Self {
        Self::new()
    }
}

impl AccelCalibrator {
    /// Create a calibrator in `NotStarted`.
    pub fn new() -> Self {
        Self {
            status: CalibrationStatus::NotStarted,
            config: AccelCalConfig::default(),
            samples: Vec::new(),
            accumulator: None,
            status_since_ms: 0,
            fit: None,
            failure: None,
            last_outcome: None,
        }
    }

    /// Discard every sample and result and return to `NotStarted`.
    ///
    /// Valid from any state, including mid-capture.
    pub fn reset(&mut self) {
        self.status = CalibrationStatus::NotStarted;
        self.samples.clear();
        self.accumulator = None;
        self.status_since_ms = 0;
        self.fit = None;
        self.failure = None;
        self.last_outcome = None;
    }

    /// Begin a fresh calibration and wait for the first orientation.
    pub fn start(&mut self, config: AccelCalConfig, now_ms: u64) {
        self.reset();
        self.config = config.sanitized();
        self.enter(CalibrationStatus::WaitingForOrientation, now_ms);
    }

    /// Begin capturing the averaged reading for the current orientation.
    ///
    /// # Errors
    ///
    /// [`AccelCalError::NotReady`] unless the calibrator is waiting for an
    /// orientation. The calibrator is left unchanged.
    pub fn collect_sample(&mut self, now_ms: u64) -> Result<(), AccelCalError> {
        if self.status != CalibrationStatus::WaitingForOrientation {
            return Err(AccelCalError::NotReady);
        }
        self.accumulator = Some(SampleAccumulator::new(now_ms));
        self.enter(CalibrationStatus::CollectingSample, now_ms);
        Ok(())
    }

    /// Feed one raw accelerometer reading (m/s², sensor frame).
    ///
    /// Ignored unless a sample is being collected. The sample completes on
    /// the first reading at or after `sample_time_ms` since collection began.
    pub fn new_sample(&mut self, accel: Vector3<f32>, now_ms: u64) {
        if self.status != CalibrationStatus::CollectingSample {
            return;
        }
        let Some(acc) = self.accumulator.as_mut() else {
            return;
        };
        if !accel.iter().all(|v| v.is_finite()) {
            return;
        }

        acc.sum += accel;
        acc.count += 1;
        acc.last_reading_ms = now_ms;

        if now_ms.saturating_sub(acc.started_ms) >= u64::from(self.config.sample_time_ms) {
            self.finish_sample(now_ms);
        }
    }

    /// Force `Failed` when the current status has stalled past its bound.
    ///
    /// - waiting: `step_timeout_ms` since the status was entered
    /// - collecting: `sample_timeout_ms` since the last raw reading
    ///
    /// Returns `true` if this call failed the calibrator.
    pub fn check_for_timeout(&mut self, now_ms: u64) -> bool {
        let stalled = match self.status {
            CalibrationStatus::WaitingForOrientation => {
                now_ms.saturating_sub(self.status_since_ms)
                    > u64::from(self.config.step_timeout_ms)
            }
            CalibrationStatus::CollectingSample => {
                let last = self
                    .accumulator
                    .map_or(self.status_since_ms, |acc| acc.last_reading_ms);
                now_ms.saturating_sub(last) > u64::from(self.config.sample_timeout_ms)
            }
            _ => false,
        };

        if stalled {
            self.fail(CalibratorFailure::StepTimeout, now_ms);
        }
        stalled
    }

    /// Move to `Failed` with the given cause.
    pub fn fail(&mut self, cause: CalibratorFailure, now_ms: u64) {
        self.accumulator = None;
        self.failure = Some(cause);
        self.enter(CalibrationStatus::Failed, now_ms);
    }

    pub fn status(&self) -> CalibrationStatus {
        self.status
    }

    /// Accepted orientation samples so far
    pub fn num_samples_collected(&self) -> u8 {
        self.samples.len() as u8
    }

    /// 1-based orientation step the calibrator is on
    pub fn step(&self) -> u8 {
        self.num_samples_collected() + 1
    }

    pub fn samples(&self) -> &[Vector3<f32>] {
        &self.samples
    }

    pub fn config(&self) -> &AccelCalConfig {
        &self.config
    }

    /// Fitted correction, available only in `Success`.
    pub fn correction(&self) -> Option<AccelCorrection> {
        match self.status {
            CalibrationStatus::Success => self.fit.map(|report| report.correction),
            _ => None,
        }
    }

    pub fn fit_report(&self) -> Option<&FitReport> {
        self.fit.as_ref()
    }

    /// Cause of the last failure, if the calibrator is `Failed`
    pub fn failure(&self) -> Option<CalibratorFailure> {
        self.failure
    }

    /// Take the outcome of the last finished sample, leaving `None`.
    pub fn take_sample_outcome(&mut self) -> Option<SampleOutcome> {
        self.last_outcome.take()
    }

    fn enter(&mut self, status: CalibrationStatus, now_ms: u64) {
        self.status = status;
        self.status_since_ms = now_ms;
    }

    fn finish_sample(&mut self, now_ms: u64) {
        let Some(mean) = self.accumulator.take().and_then(|acc| acc.mean()) else {
            return;
        };

        if !self.is_new_orientation(&mean) || self.samples.push(mean).is_err() {
            self.last_outcome = Some(SampleOutcome::Rejected);
            self.enter(CalibrationStatus::WaitingForOrientation, now_ms);
            return;
        }
        self.last_outcome = Some(SampleOutcome::Accepted);

        if self.samples.len() < usize::from(self.config.num_samples) {
            self.enter(CalibrationStatus::WaitingForOrientation, now_ms);
            return;
        }

        match fit_offset_scale(&self.samples, &self.config) {
            Ok(report) => {
                self.fit = Some(report);
                self.enter(CalibrationStatus::Success, now_ms);
            }
            Err(err) => self.fail(CalibratorFailure::Fit(err), now_ms),
        }
    }

    /// A sample must have a usable magnitude and point at least
    /// `min_sample_angle_deg` away from every accepted sample.
    fn is_new_orientation(&self, candidate: &Vector3<f32>) -> bool {
        let magnitude = sqrtf(candidate.dot(candidate));
        if magnitude < MIN_SAMPLE_MAGNITUDE {
            return false;
        }

        let max_cos = cosf(self.config.min_sample_angle_deg.to_radians());
        self.samples.iter().all(|accepted| {
            let cos = candidate.dot(accepted) / (magnitude * accepted.norm());
            cos <= max_cos
        })
    }
}
