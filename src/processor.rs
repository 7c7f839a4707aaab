//! Partition run orchestration covering workspace lifecycle, batch dispatch,
//! and run reporting.

pub mod error;
pub mod orchestrator;
pub mod report;
pub mod workspace;
