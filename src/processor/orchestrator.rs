//! Partition run orchestration.
//!
//! `BatchOrchestrator` drives one partition at a time:
//! - `workspace` resets the partition's destination directory before any
//!   request is issued.
//! - `PayloadChunker` slices the payloads into fixed-size batches and
//!   `BatchIdentifier` derives the id range announced for each batch.
//! - the configured `FetchStrategy` settles every request of a batch before
//!   the next batch starts, so each batch is a synchronization barrier.
//! - the `ArtifactConverter` runs once, after the last batch.
//!
//! Request failures are captured in the returned [`RunReport`]; only
//! workspace and conversion failures abort a run.

use super::error::OrchestratorError;
use super::report::RunReport;
use super::workspace::PartitionWorkspace;
use crate::batching::chunker::PayloadChunker;
use crate::batching::identifier::BatchIdentifier;
use crate::fetch::client::RemoteFetchClient;
use crate::fetch::outcome::BatchReport;
use crate::payload::{FetchRequest, PartitionKey, PartitionPayloads, Payload};
use crate::runtime::config::OrchestratorConfig;
use crate::runtime::convert::{ArtifactConverter, ConversionJob};
use crate::runtime::progress::{ProgressObserver, ProgressTracker, TracingProgress};
use crate::runtime::telemetry::Telemetry;
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

pub struct BatchOrchestrator {
    config: OrchestratorConfig,
    chunker: PayloadChunker,
    workspace: PartitionWorkspace,
    client: Arc<dyn RemoteFetchClient>,
    converter: Arc<dyn ArtifactConverter>,
    progress: Arc<dyn ProgressObserver>,
    telemetry: Arc<Telemetry>,
    shutdown: CancellationToken,
}

impl BatchOrchestrator {
    /// Creates an orchestrator reporting progress through `tracing`.
    pub fn new(
        config: OrchestratorConfig,
        client: Arc<dyn RemoteFetchClient>,
        converter: Arc<dyn ArtifactConverter>,
    ) -> Result<Self> {
        let chunker = PayloadChunker::new(config.batch_size())?;
        let workspace = PartitionWorkspace::new(config.output_root());
        Ok(Self {
            config,
            chunker,
            workspace,
            client,
            converter,
            progress: Arc::new(TracingProgress),
            telemetry: Arc::new(Telemetry::default()),
            shutdown: CancellationToken::new(),
        })
    }

    /// Replaces the progress observer for every subsequent run.
    pub fn with_progress(mut self, progress: Arc<dyn ProgressObserver>) -> Self {
        self.progress = progress;
        self
    }

    /// Uses `shutdown` as the root token. Cancellation is observed at batch
    /// boundaries only; an in-flight batch always settles.
    pub fn with_cancellation_token(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn telemetry(&self) -> Arc<Telemetry> {
        self.telemetry.clone()
    }

    /// Processes the first partition (lowest key) of `partitions`. Fails with
    /// [`OrchestratorError::Cancelled`] when shutdown was already requested.
    pub async fn run(&self, partitions: &PartitionPayloads) -> Result<RunReport, OrchestratorError> {
        let (partition, payloads) = partitions
            .iter()
            .next()
            .ok_or(OrchestratorError::NoPartitions)?;
        self.run_partition(partition, payloads).await
    }

    /// Processes every partition in key order, one after the other. Stops at
    /// the first partition that fails to prepare or convert, and after the
    /// current partition once shutdown is requested.
    pub async fn run_all(
        &self,
        partitions: &PartitionPayloads,
    ) -> Result<Vec<RunReport>, OrchestratorError> {
        if partitions.is_empty() {
            return Err(OrchestratorError::NoPartitions);
        }

        let mut reports = Vec::with_capacity(partitions.len());
        for (partition, payloads) in partitions {
            // A cancelled run must not reset the workspaces of untouched partitions.
            if self.shutdown.is_cancelled() {
                tracing::info!(partition = %partition, "shutdown requested; skipping remaining partitions");
                break;
            }
            reports.push(self.run_partition(partition, payloads).await?);
        }
        Ok(reports)
    }

    #[tracing::instrument(name = "partition", skip_all, fields(partition = %partition))]
    pub async fn run_partition(
        &self,
        partition: &PartitionKey,
        payloads: &[Payload],
    ) -> Result<RunReport, OrchestratorError> {
        if self.shutdown.is_cancelled() {
            tracing::info!("shutdown requested; leaving workspace untouched");
            return Err(OrchestratorError::Cancelled(partition.clone()));
        }

        let started = Instant::now();
        let workspace = self.workspace.prepare(partition).await?;

        let total_batches = self.chunker.batch_count(payloads.len());
        tracing::info!(
            payloads = payloads.len(),
            batches = total_batches,
            batch_size = self.chunker.batch_size(),
            strategy = %self.config.strategy(),
            "starting partition run"
        );

        let mut tracker =
            ProgressTracker::new(self.chunker.batch_size(), self.config.max_iterations());
        let mut batches = Vec::with_capacity(total_batches);
        let mut stopped_early = false;

        for (index, batch) in self.chunker.chunks(payloads).enumerate() {
            if self.shutdown.is_cancelled() {
                tracing::info!(batch = index, "shutdown requested; not starting further batches");
                stopped_early = true;
                break;
            }

            let report = self.dispatch_batch(partition, index, batch, &workspace).await;
            batches.push(report);

            if tracker.advance() {
                stopped_early = index + 1 < total_batches;
                if stopped_early {
                    tracing::info!(
                        offset = tracker.offset(),
                        batches = tracker.batches(),
                        max_iterations = self.config.max_iterations(),
                        "iteration cap reached; skipping remaining batches"
                    );
                }
                break;
            }
        }

        let job = ConversionJob::new(
            partition.clone(),
            workspace.clone(),
            self.config
                .conversion_root()
                .map(|root| root.join(partition.as_str())),
        );
        self.converter
            .convert(&job)
            .await
            .map_err(|source| OrchestratorError::Conversion {
                partition: partition.clone(),
                source,
            })?;

        self.telemetry.record_partition_completed();
        let report = RunReport {
            partition: partition.clone(),
            workspace,
            batches,
            stopped_early,
            elapsed: started.elapsed(),
        };

        tracing::info!(
            batches = report.batches.len(),
            attempted = report.attempted(),
            succeeded = report.succeeded(),
            failed = report.failed(),
            stopped_early = report.stopped_early,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "partition run finished"
        );

        Ok(report)
    }

    async fn dispatch_batch(
        &self,
        partition: &PartitionKey,
        index: usize,
        batch: &[Payload],
        workspace: &Path,
    ) -> BatchReport {
        let ids = BatchIdentifier::identify(batch);
        self.telemetry.record_batch_started(ids.malformed);
        self.progress.batch_started(partition, index, ids.range);

        let requests = batch
            .iter()
            .map(|payload| {
                FetchRequest::compose(
                    partition,
                    self.config.passthrough(),
                    payload,
                    self.config.output_dir_field(),
                    workspace,
                )
            })
            .collect();
        let outcomes = self.config.strategy().execute(&self.client, requests).await;

        let report = BatchReport {
            index,
            ids: ids.range,
            outcomes,
        };
        self.telemetry.record_batch_completed(&report);
        self.progress.batch_finished(partition, &report);
        report
    }
}
