//! Core traits for platform-agnostic calibration logic.
//!
//! Trait definitions are pure and have no feature gates. Mock
//! implementations are always available for host testing; platform
//! implementations live in the application crate.

pub mod time;

pub use time::{MockTime, TimeSource};
