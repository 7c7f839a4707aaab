pub mod batching;
pub mod fetch;
pub mod payload;
pub mod processor;
pub mod runtime;

pub use batching::chunker::{PayloadChunker, DEFAULT_BATCH_SIZE};
pub use batching::identifier::{BatchIdentifier, BatchIds, IdRange};
pub use fetch::{
    BatchReport, FetchOutcome, FetchStrategy, RemoteFetchClient, RequestError, RequestErrorKind,
};
pub use payload::{FetchRequest, PartitionKey, PartitionPayloads, Payload, OUT_NAME_FIELD};
pub use processor::error::OrchestratorError;
pub use processor::orchestrator::BatchOrchestrator;
pub use processor::report::RunReport;
pub use processor::workspace::{PartitionWorkspace, WorkspaceAction, WorkspaceError};
pub use runtime::config::{
    OrchestratorConfig, OrchestratorConfigBuilder, OrchestratorConfigParams,
    DEFAULT_OUTPUT_DIR_FIELD,
};
pub use runtime::convert::{ArtifactConverter, ConversionFuture, ConversionJob, SkipConversion};
pub use runtime::progress::{
    batch_start_message, ProgressObserver, ProgressTracker, TracingProgress, BATCH_END_MESSAGE,
};
pub use runtime::telemetry::{init_tracing, Telemetry, TelemetrySnapshot};
pub use runtime::runner::Runner;
