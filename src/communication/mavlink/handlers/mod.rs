//! MAVLink Protocol Handlers
//!
//! # Handlers
//!
//! - **Command Handler**: COMMAND_LONG, COMMAND_ACK

pub mod command;

pub use command::CommandHandler;
