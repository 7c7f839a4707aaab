use super::workspace::WorkspaceError;
use crate::payload::PartitionKey;
use anyhow::Error as AnyError;
use std::fmt;

/// Errors that abort a run. Individual request failures never surface here.
#[derive(Debug)]
pub enum OrchestratorError {
    NoPartitions,
    /// Shutdown was requested before the partition's workspace was touched.
    Cancelled(PartitionKey),
    Workspace(WorkspaceError),
    Conversion {
        partition: PartitionKey,
        source: AnyError,
    },
}

impl fmt::Display for OrchestratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrchestratorError::NoPartitions => write!(f, "no partition payloads to process"),
            OrchestratorError::Cancelled(partition) => {
                write!(f, "shutdown requested before partition {partition} started")
            }
            OrchestratorError::Workspace(err) => write!(f, "workspace error: {err}"),
            OrchestratorError::Conversion { partition, source } => {
                write!(f, "conversion failed for partition {partition}: {source}")
            }
        }
    }
}

impl std::error::Error for OrchestratorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OrchestratorError::NoPartitions | OrchestratorError::Cancelled(_) => None,
            OrchestratorError::Workspace(err) => Some(err),
            OrchestratorError::Conversion { source, .. } => Some(source.as_ref()),
        }
    }
}

impl From<WorkspaceError> for OrchestratorError {
    fn from(err: WorkspaceError) -> Self {
        OrchestratorError::Workspace(err)
    }
}
