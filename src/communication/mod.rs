//! Communication Protocols
//!
//! # Protocols
//!
//! - **MAVLink 2.0**: ground control station link
//!   - Command execution (COMMAND_LONG)
//!   - Operator notifications (STATUSTEXT)

pub mod mavlink;
