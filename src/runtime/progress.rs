use crate::batching::identifier::IdRange;
use crate::fetch::outcome::BatchReport;
use crate::payload::PartitionKey;

/// Running offset across the batches of one partition run.
///
/// The offset grows by the configured batch size after every batch, not by
/// the number of payloads actually in it, so `max_iterations` is a soft cap:
/// the run stops once the offset reaches it, possibly after attempting a few
/// more payloads than the cap.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    batch_size: usize,
    max_iterations: Option<usize>,
    offset: usize,
    batches: usize,
}

impl ProgressTracker {
    pub fn new(batch_size: usize, max_iterations: Option<usize>) -> Self {
        Self {
            batch_size,
            max_iterations,
            offset: 0,
            batches: 0,
        }
    }

    /// Records a finished batch. Returns `true` when no further batch may start.
    pub fn advance(&mut self) -> bool {
        self.batches += 1;
        self.offset = self.offset.saturating_add(self.batch_size);
        self.cap_reached()
    }

    pub fn cap_reached(&self) -> bool {
        self.max_iterations
            .map(|cap| self.offset >= cap)
            .unwrap_or(false)
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn batches(&self) -> usize {
        self.batches
    }
}

/// Receives batch-boundary progress from the orchestrator.
///
/// Injected per orchestrator so runs can be observed without process-wide
/// state; [`TracingProgress`] is the default.
pub trait ProgressObserver: Send + Sync {
    fn batch_started(&self, partition: &PartitionKey, index: usize, ids: Option<IdRange>);

    fn batch_finished(&self, partition: &PartitionKey, report: &BatchReport);
}

pub fn batch_start_message(ids: Option<IdRange>) -> String {
    match ids {
        Some(range) => format!("Downloading batch from {} to {}", range.min, range.max),
        None => "Downloading batch from ? to ?".to_string(),
    }
}

pub const BATCH_END_MESSAGE: &str = "End of batch";

/// Emits progress lines through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressObserver for TracingProgress {
    fn batch_started(&self, partition: &PartitionKey, index: usize, ids: Option<IdRange>) {
        tracing::info!(
            partition = %partition,
            batch = index,
            min_id = ids.map(|range| range.min),
            max_id = ids.map(|range| range.max),
            "{}",
            batch_start_message(ids)
        );
    }

    fn batch_finished(&self, partition: &PartitionKey, report: &BatchReport) {
        tracing::info!(
            partition = %partition,
            batch = report.index,
            succeeded = report.succeeded(),
            failed = report.failed(),
            "{BATCH_END_MESSAGE}"
        );
    }
}
