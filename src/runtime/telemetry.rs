use crate::fetch::outcome::BatchReport;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// Installs a basic tracing subscriber (if one is not already active).
///
/// The subscriber honours `RUST_LOG` if it is present, otherwise it falls back to `info`.
/// Calling this function multiple times is harmless.
pub fn init_tracing() {
    if TRACING_INIT.get().is_some() {
        return;
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .try_init();

    let _ = TRACING_INIT.set(());
}

/// Counters accumulated across every run of one orchestrator.
#[derive(Default, Debug)]
pub struct Telemetry {
    partitions_completed: AtomicU64,
    batches_started: AtomicU64,
    batches_completed: AtomicU64,
    requests_succeeded: AtomicU64,
    requests_failed: AtomicU64,
    id_warnings: AtomicU64,
}

impl Telemetry {
    pub fn record_batch_started(&self, malformed_ids: usize) {
        self.batches_started.fetch_add(1, Ordering::Relaxed);
        if malformed_ids > 0 {
            self.id_warnings
                .fetch_add(malformed_ids as u64, Ordering::Relaxed);
        }
    }

    pub fn record_batch_completed(&self, report: &BatchReport) {
        self.batches_completed.fetch_add(1, Ordering::Relaxed);
        self.requests_succeeded
            .fetch_add(report.succeeded() as u64, Ordering::Relaxed);
        self.requests_failed
            .fetch_add(report.failed() as u64, Ordering::Relaxed);
    }

    pub fn record_partition_completed(&self) {
        self.partitions_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            partitions_completed: self.partitions_completed.load(Ordering::Relaxed),
            batches_started: self.batches_started.load(Ordering::Relaxed),
            batches_completed: self.batches_completed.load(Ordering::Relaxed),
            requests_succeeded: self.requests_succeeded.load(Ordering::Relaxed),
            requests_failed: self.requests_failed.load(Ordering::Relaxed),
            id_warnings: self.id_warnings.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct TelemetrySnapshot {
    pub partitions_completed: u64,
    pub batches_started: u64,
    pub batches_completed: u64,
    pub requests_succeeded: u64,
    pub requests_failed: u64,
    pub id_warnings: u64,
}

impl TelemetrySnapshot {
    pub fn requests_attempted(&self) -> u64 {
        self.requests_succeeded + self.requests_failed
    }
}
