//! Platform integration
//!
//! Hardware-backed implementations of the core traits. Only compiled with
//! the `embassy` feature; host builds use `MockTime`.

pub mod time;

pub use time::EmbassyTime;
