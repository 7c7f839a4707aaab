use crate::fetch::outcome::BatchReport;
use crate::payload::PartitionKey;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Aggregated outcome of one partition run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub partition: PartitionKey,
    pub workspace: PathBuf,
    pub batches: Vec<BatchReport>,
    /// Set when the iteration cap or a shutdown request kept batches from starting.
    pub stopped_early: bool,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    pub fn attempted(&self) -> usize {
        self.batches.iter().map(BatchReport::attempted).sum()
    }

    pub fn succeeded(&self) -> usize {
        self.batches.iter().map(BatchReport::succeeded).sum()
    }

    pub fn failed(&self) -> usize {
        self.batches.iter().map(BatchReport::failed).sum()
    }

    pub fn failed_out_names(&self) -> Vec<&str> {
        self.batches
            .iter()
            .flat_map(BatchReport::failures)
            .map(|outcome| outcome.out_name().unwrap_or("<missing>"))
            .collect()
    }
}
