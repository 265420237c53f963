//! Operator commands accepted by the orchestrator

use super::position::VehiclePosition;

/// Operator command, independent of the link it arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccelCalCommand {
    /// Begin a new session
    Start,
    /// The vehicle is in place; capture the current orientation.
    ///
    /// When `position` is given it must match the orientation the session
    /// is waiting for.
    CollectSample { position: Option<VehiclePosition> },
    /// Abort the running session
    Cancel,
}

impl AccelCalCommand {
    /// Short name for logs
    pub fn as_str(&self) -> &'static str {
        match self {
            AccelCalCommand::Start => "start",
            AccelCalCommand::CollectSample { .. } => "collect sample",
            AccelCalCommand::Cancel => "cancel",
        }
    }
}
