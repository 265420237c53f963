//! Control-loop driver for the calibration session
//!
//! Owns the vehicle's single [`AccelCal`] session. Call [`AccelCalRunner::update`]
//! from the fixed-rate loop: it executes commands queued by the MAVLink
//! handler, advances the session and narrates over STATUSTEXT.

use core::cell::RefCell;

use accelcal_core::accel_cal::{
    AccelCal, AccelCalClient, AccelCalCommand, AccelCalConfig, AccelCalError, CalibrationStatus,
    SessionOutcome,
};
use accelcal_core::parameters::{AccelCalParams, ParameterStore};
use accelcal_core::traits::TimeSource;

use super::commands;
use crate::communication::mavlink::MavlinkReporter;

static REPORTER: MavlinkReporter = MavlinkReporter;

/// Calibration session wired to the MAVLink command queue and STATUSTEXT
pub struct AccelCalRunner<'a, T: TimeSource> {
    cal: AccelCal<'a, T>,
}

impl<'a, T: TimeSource> AccelCalRunner<'a, T> {
    pub fn new(time: T, config: AccelCalConfig) -> Self {
        Self {
            cal: AccelCal::new(time, config),
        }
    }

    /// Build the session from `INS_ACAL_*` parameters.
    pub fn from_params(time: T, store: &ParameterStore) -> Self {
        Self::new(time, AccelCalParams::from_store(store).to_config())
    }

    /// Re-read `INS_ACAL_*`; applies from the next session.
    pub fn reload_params(&mut self, store: &ParameterStore) {
        self.cal
            .set_config(AccelCalParams::from_store(store).to_config());
    }

    /// Register a calibrator client, logging refusals.
    pub fn register<C>(&mut self, client: &'a RefCell<C>) -> Result<(), AccelCalError>
    where
        C: AccelCalClient + 'a,
    {
        self.cal.register(client).inspect_err(|err| {
            crate::log_error!("Accel cal client registration failed: {}", err.as_str());
        })
    }

    /// Execute one command immediately, bypassing the queue.
    pub fn handle_command(&mut self, command: AccelCalCommand) -> Result<(), AccelCalError> {
        crate::log_info!("Accel cal command: {}", command.as_str());
        self.cal
            .handle_command(command, &REPORTER)
            .inspect_err(|err| {
                crate::log_warn!(
                    "Accel cal command {} refused: {}",
                    command.as_str(),
                    err.as_str()
                );
            })
    }

    /// One control-loop tick: drain queued commands, then advance the session.
    pub fn update(&mut self) -> Option<SessionOutcome> {
        let pending = commands::take_pending();
        for command in pending.iter() {
            crate::log_info!("Accel cal command: {}", command.as_str());
        }

        let outcome = self.cal.update_with_commands(pending, &REPORTER);
        match outcome {
            Some(SessionOutcome::Succeeded) => {
                crate::log_info!("Accel calibration succeeded");
            }
            Some(SessionOutcome::Failed(err)) => {
                crate::log_warn!("Accel calibration failed: {}", err.as_str());
            }
            None => {}
        }
        outcome
    }

    pub fn status(&self) -> CalibrationStatus {
        self.cal.status()
    }

    /// The underlying session
    pub fn calibration(&self) -> &AccelCal<'a, T> {
        &self.cal
    }
}
