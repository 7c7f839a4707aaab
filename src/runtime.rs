//! Runtime glue: validated configuration, the conversion hook, progress
//! tracking and observation, and telemetry.

pub mod config;
pub mod convert;
pub mod progress;
pub mod runner;
pub mod telemetry;
