//! accelcal_core - Pure no_std accelerometer calibration logic
//!
//! This crate contains the platform-agnostic calibration state machines,
//! the least-squares fit and the session orchestrator, testable on host
//! without any feature flags.
//!
//! # Design Principles
//!
//! - **Zero cfg**: No `#[cfg(feature = ...)]` directives
//! - **Pure no_std**: No std library dependencies
//! - **Trait abstractions**: Time, clients and status reporting injected via traits
//!
//! # Modules
//!
//! - [`accel_cal`]: Calibrators, fit, and the session orchestrator
//! - [`parameters`]: Parameter store, calibration settings and persisted corrections
//! - [`traits`]: Platform-agnostic trait abstractions (TimeSource)

#![no_std]

pub mod accel_cal;
pub mod parameters;
pub mod traits;
