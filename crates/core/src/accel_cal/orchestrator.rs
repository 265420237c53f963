//! Calibration Session Orchestrator
//!
//! Multiplexes every registered client's calibrators into one session with a
//! single aggregate status. Modeled after ArduPilot's AP_AccelCal:
//!
//! - operator commands act as a barrier: a sample is only collected when
//!   every calibrator is waiting for an orientation
//! - the first failing calibrator fails the whole session
//! - clients hear about the end of a session exactly once, through
//!   [`AccelCalClient::save_calibrations`] or
//!   [`AccelCalClient::calibration_cancelled`]
//!
//! The orchestrator holds non-owning references to clients and the status
//! reporter. It knows nothing about MAVLink or parameter storage.

use core::cell::RefCell;
use core::fmt;
use core::ptr;

use heapless::Vec;

use super::calibrator::{AccelCalibrator, SampleOutcome};
use super::client::AccelCalClient;
use super::command::AccelCalCommand;
use super::config::AccelCalConfig;
use super::error::{AccelCalError, CalibratorFailure};
use super::position::VehiclePosition;
use super::reporter::{Severity, StatusReporter};
use super::status::{CalibrationStatus, StatusTally};
use crate::traits::TimeSource;

/// Maximum registered clients
pub const MAX_CLIENTS: usize = 4;

/// How a finished session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Every calibrator succeeded and every client saved
    Succeeded,
    /// The session failed; clients were told to discard
    Failed(AccelCalError),
}

/// Per-update view of every calibrator
struct CalibratorScan {
    tally: StatusTally,
    failure: Option<CalibratorFailure>,
    min_step: u8,
    max_step: u8,
    accepted: bool,
    rejected: bool,
}

impl CalibratorScan {
    fn new() -> Self {
        Self {
            tally: StatusTally::default(),
            failure: None,
            min_step: u8::MAX,
            max_step: 0,
            accepted: false,
            rejected: false,
        }
    }

    fn record(&mut self, cal: &mut AccelCalibrator) {
        match cal.take_sample_outcome() {
            Some(SampleOutcome::Accepted) => self.accepted = true,
            Some(SampleOutcome::Rejected) => self.rejected = true,
            None => {}
        }

        let status = cal.status();
        self.tally.record(status);
        if status == CalibrationStatus::Failed && self.failure.is_none() {
            self.failure = cal.failure();
        }

        let step = cal.step();
        self.min_step = self.min_step.min(step);
        self.max_step = self.max_step.max(step);
    }
}

/// Accelerometer calibration session.
///
/// Constructed once by the sensor-management layer; clients register at
/// init and stay registered for the lifetime of the orchestrator.
pub struct AccelCal<'a, T: TimeSource> {
    time: T,
    config: AccelCalConfig,
    clients: Vec<&'a RefCell<dyn AccelCalClient + 'a>, MAX_CLIENTS>,
    reporter: Option<&'a dyn StatusReporter>,
    started: bool,
    /// 1-based orientation step last prompted (0 = none yet)
    step: u8,
}

impl<'a, T: TimeSource> AccelCal<'a, T> {
    pub fn new(time: T, config: AccelCalConfig) -> Self {
        Self {
            time,
            config: config.sanitized(),
            clients: Vec::new(),
            reporter: None,
            started: false,
            step: 0,
        }
    }

    // ========================================================================
    // Registry
    // ========================================================================

    /// Register a calibrator client.
    ///
    /// # Errors
    ///
    /// - [`AccelCalError::RegistrationOverflow`] with `MAX_CLIENTS` registered
    /// - [`AccelCalError::DuplicateClient`] if this client is already registered
    /// - [`AccelCalError::AlreadyRunning`] while a session is running
    ///
    /// The registry is untouched on error.
    pub fn register<C>(&mut self, client: &'a RefCell<C>) -> Result<(), AccelCalError>
    where
        C: AccelCalClient + 'a,
    {
        let client: &'a RefCell<dyn AccelCalClient + 'a> = client;

        if self.started {
            return Err(AccelCalError::AlreadyRunning);
        }
        if self
            .clients
            .iter()
            .any(|existing| ptr::addr_eq(*existing, client))
        {
            return Err(AccelCalError::DuplicateClient);
        }
        self.clients
            .push(client)
            .map_err(|_| AccelCalError::RegistrationOverflow)
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Total calibrators across every client
    pub fn calibrator_count(&self) -> usize {
        self.fold_calibrators(0, |count, _| count + 1)
    }

    // ========================================================================
    // Session control
    // ========================================================================

    /// Start a session, resetting and starting every calibrator.
    ///
    /// The reporter is kept until the next `start`.
    ///
    /// # Errors
    ///
    /// - [`AccelCalError::AlreadyRunning`] if a session is running; nothing
    ///   is touched
    /// - [`AccelCalError::NoCalibrators`] if no client exposes a calibrator
    pub fn start(&mut self, reporter: &'a dyn StatusReporter) -> Result<(), AccelCalError> {
        if self.started {
            reporter.report(
                Severity::Warning,
                format_args!("{}", AccelCalError::AlreadyRunning),
            );
            return Err(AccelCalError::AlreadyRunning);
        }

        let count = self.calibrator_count();
        if count == 0 {
            reporter.report(
                Severity::Error,
                format_args!("{}", AccelCalError::NoCalibrators),
            );
            return Err(AccelCalError::NoCalibrators);
        }

        let now_ms = self.time.now_ms();
        let config = self.config;
        self.for_each_calibrator_mut(|cal| {
            cal.reset();
            cal.start(config, now_ms);
        });

        self.reporter = Some(reporter);
        self.started = true;
        self.step = 1;
        self.report(
            Severity::Info,
            format_args!("Calibration started for {} accelerometers", count),
        );
        self.prompt_orientation();
        Ok(())
    }

    /// Abort the running session.
    ///
    /// No-op when not started. Every calibrator is reset; clients hear
    /// `calibration_cancelled` once unless every calibrator had already
    /// finished, in which case the finished results are dropped without
    /// any callback.
    pub fn clear(&mut self) {
        if !self.started {
            return;
        }
        self.report(Severity::Info, format_args!("Calibration cancelled"));
        if !self.status().is_terminal() {
            self.notify_cancelled();
        }
        self.end_session();
    }

    /// Collect the current orientation on every calibrator.
    ///
    /// # Errors
    ///
    /// [`AccelCalError::NotReady`] unless a session is running and every
    /// calibrator is waiting for an orientation. No calibrator changes.
    pub fn collect_sample(&mut self) -> Result<(), AccelCalError> {
        self.collect_with(self.reporter)
    }

    fn collect_with(
        &mut self,
        reporter: Option<&dyn StatusReporter>,
    ) -> Result<(), AccelCalError> {
        let ready = self.fold_calibrators(true, |ready, cal| {
            ready && cal.status() == CalibrationStatus::WaitingForOrientation
        });
        if !self.started || !ready {
            if let Some(reporter) = reporter {
                reporter.report(Severity::Warning, format_args!("{}", AccelCalError::NotReady));
            }
            return Err(AccelCalError::NotReady);
        }

        let now_ms = self.time.now_ms();
        self.for_each_calibrator_mut(|cal| {
            // Every calibrator was checked to be waiting above
            let _ = cal.collect_sample(now_ms);
        });
        Ok(())
    }

    /// Advance the session; call once per control cycle.
    ///
    /// Returns the outcome when this call ended the session.
    pub fn update(&mut self) -> Option<SessionOutcome> {
        if !self.started {
            return None;
        }

        let now_ms = self.time.now_ms();
        let mut scan = CalibratorScan::new();
        self.for_each_calibrator_mut(|cal| {
            cal.check_for_timeout(now_ms);
            scan.record(cal);
        });

        if scan.rejected {
            self.report(
                Severity::Warning,
                format_args!("Sample rejected: orientation too close to a previous one"),
            );
        }

        match scan.tally.aggregate(true) {
            CalibrationStatus::Failed => {
                let cause = scan
                    .failure
                    .map(AccelCalError::from)
                    .unwrap_or(AccelCalError::StepTimeout);
                self.fail(cause);
                Some(SessionOutcome::Failed(cause))
            }
            CalibrationStatus::Success => {
                self.succeed();
                Some(SessionOutcome::Succeeded)
            }
            CalibrationStatus::WaitingForOrientation => {
                if scan.min_step != scan.max_step {
                    self.fail(AccelCalError::StepMismatch);
                    return Some(SessionOutcome::Failed(AccelCalError::StepMismatch));
                }

                if scan.max_step != self.step {
                    if scan.accepted {
                        self.report(
                            Severity::Info,
                            format_args!("Sample {} collected", self.step),
                        );
                    }
                    self.step = scan.max_step;
                    self.prompt_orientation();
                } else if scan.rejected {
                    self.prompt_orientation();
                }
                None
            }
            _ => None,
        }
    }

    /// Execute one operator command and reply with the session status.
    ///
    /// The reply goes to `reporter` at the severity of the resulting status.
    pub fn handle_command(
        &mut self,
        command: AccelCalCommand,
        reporter: &'a dyn StatusReporter,
    ) -> Result<(), AccelCalError> {
        let result = match command {
            AccelCalCommand::Start => self.start(reporter),
            AccelCalCommand::CollectSample { position } => self.collect_at(position, reporter),
            AccelCalCommand::Cancel => {
                self.clear();
                Ok(())
            }
        };

        let status = self.status();
        reporter.report(status.severity(), format_args!("Calibration: {}", status));
        result
    }

    /// Execute queued commands, then run one update.
    ///
    /// Command errors are narrated through `reporter` and not returned.
    pub fn update_with_commands<I>(
        &mut self,
        commands: I,
        reporter: &'a dyn StatusReporter,
    ) -> Option<SessionOutcome>
    where
        I: IntoIterator<Item = AccelCalCommand>,
    {
        for command in commands {
            let _ = self.handle_command(command, reporter);
        }
        self.update()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Aggregate session status, derived from every calibrator.
    pub fn status(&self) -> CalibrationStatus {
        self.fold_calibrators(StatusTally::default(), |mut tally, cal| {
            tally.record(cal.status());
            tally
        })
        .aggregate(self.started)
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// 1-based orientation step the operator was last asked for (0 when idle)
    pub fn step(&self) -> u8 {
        self.step
    }

    /// Orientation the session is waiting for, if it has a fixed placement
    pub fn expected_position(&self) -> Option<VehiclePosition> {
        if self.started {
            VehiclePosition::from_step(self.step)
        } else {
            None
        }
    }

    pub fn config(&self) -> &AccelCalConfig {
        &self.config
    }

    /// Replace the configuration; takes effect at the next `start`.
    pub fn set_config(&mut self, config: AccelCalConfig) {
        self.config = config.sanitized();
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn collect_at(
        &mut self,
        position: Option<VehiclePosition>,
        reporter: &dyn StatusReporter,
    ) -> Result<(), AccelCalError> {
        // Steps past the six named placements accept any orientation
        if let (Some(reported), Some(expected)) = (position, self.expected_position()) {
            if reported != expected {
                reporter.report(
                    Severity::Warning,
                    format_args!(
                        "Vehicle reported {} but step {} was requested",
                        reported, self.step
                    ),
                );
                return Err(AccelCalError::NotReady);
            }
        }
        self.collect_with(Some(reporter))
    }

    fn prompt_orientation(&self) {
        match VehiclePosition::from_step(self.step) {
            Some(position) => self.report(
                Severity::Info,
                format_args!("Place vehicle {} and press any key.", position),
            ),
            None => self.report(
                Severity::Info,
                format_args!("Place vehicle in a new orientation and press any key."),
            ),
        }
    }

    fn fail(&mut self, cause: AccelCalError) {
        self.report(Severity::Error, format_args!("Calibration FAILED: {}", cause));
        self.notify_cancelled();
        self.end_session();
    }

    fn succeed(&mut self) {
        self.report(Severity::Notice, format_args!("Calibration successful"));
        for client in &self.clients {
            client.borrow_mut().save_calibrations();
        }
        self.end_session();
    }

    fn notify_cancelled(&self) {
        for client in &self.clients {
            client.borrow_mut().calibration_cancelled();
        }
    }

    /// Reset every calibrator. The reporter stays for late rejections.
    fn end_session(&mut self) {
        self.for_each_calibrator_mut(AccelCalibrator::reset);
        self.started = false;
        self.step = 0;
    }

    fn report(&self, severity: Severity, message: fmt::Arguments<'_>) {
        if let Some(reporter) = self.reporter {
            reporter.report(severity, message);
        }
    }

    fn fold_calibrators<B>(&self, init: B, mut f: impl FnMut(B, &AccelCalibrator) -> B) -> B {
        let mut acc = init;
        for client in &self.clients {
            let client = client.borrow();
            let mut index = 0;
            while let Some(cal) = client.calibrator(index) {
                acc = f(acc, cal);
                index += 1;
            }
        }
        acc
    }

    fn for_each_calibrator_mut(&self, mut f: impl FnMut(&mut AccelCalibrator)) {
        for client in &self.clients {
            let mut client = client.borrow_mut();
            let mut index = 0;
            while let Some(cal) = client.calibrator_mut(index) {
                f(cal);
                index += 1;
            }
        }
    }
}
