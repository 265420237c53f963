//! Core application infrastructure
//!
//! Target-independent logging macros shared by every module.

pub mod logging;
