use crate::processor::error::OrchestratorError;
use crate::processor::orchestrator::BatchOrchestrator;
use crate::processor::report::RunReport;
use crate::PartitionPayloads;
use std::future::{self, Future};
use std::io;
use tokio::signal;
use tokio_util::sync::CancellationToken;

/// Drives a [`BatchOrchestrator`] over every partition and turns a Ctrl-C
/// (SIGINT) into a graceful stop at the next batch boundary.
pub struct Runner {
    orchestrator: BatchOrchestrator,
    shutdown: CancellationToken,
}

impl Runner {
    /// Wires a fresh root [`CancellationToken`] into the orchestrator.
    pub fn new(orchestrator: BatchOrchestrator) -> Self {
        Self::with_cancellation_token(orchestrator, CancellationToken::new())
    }

    pub fn with_cancellation_token(
        orchestrator: BatchOrchestrator,
        shutdown: CancellationToken,
    ) -> Self {
        let orchestrator = orchestrator.with_cancellation_token(shutdown.clone());
        Self {
            orchestrator,
            shutdown,
        }
    }

    /// Returns a clone of the root shutdown token so external callers can
    /// integrate with their own signal handlers.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn orchestrator(&self) -> &BatchOrchestrator {
        &self.orchestrator
    }

    /// Runs every partition until completion or until Ctrl-C is received.
    /// After the signal the in-flight batch settles, the current partition is
    /// converted, and remaining partitions are skipped.
    pub async fn run_until_ctrl_c(
        &self,
        partitions: &PartitionPayloads,
    ) -> Result<Vec<RunReport>, OrchestratorError> {
        self.run_until(partitions, signal::ctrl_c()).await
    }

    async fn run_until<S>(
        &self,
        partitions: &PartitionPayloads,
        interrupt: S,
    ) -> Result<Vec<RunReport>, OrchestratorError>
    where
        S: Future<Output = io::Result<()>>,
    {
        tracing::info!(
            partitions = partitions.len(),
            "runner started; Ctrl-C (SIGINT) stops after the current batch"
        );

        let run = self.orchestrator.run_all(partitions);
        tokio::pin!(run);

        // Without a working signal handler only completion or the token can stop the run.
        let interrupt = async {
            match interrupt.await {
                Ok(()) => tracing::info!("Ctrl-C received; finishing current batch"),
                Err(err) => {
                    tracing::warn!(
                        error = %err,
                        "failed to listen for Ctrl-C; running until completion or cancellation"
                    );
                    future::pending::<()>().await;
                }
            }
        };

        tokio::select! {
            result = &mut run => return result,
            _ = interrupt => {}
            _ = self.shutdown.cancelled() => {
                tracing::info!("runner shutdown token cancelled");
            }
        }

        self.shutdown.cancel();
        run.await
    }
}
