use crate::payload::PartitionKey;
use anyhow::Result;
use core::future::Future;
use core::pin::Pin;
use std::path::{Path, PathBuf};

pub type ConversionFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Describes the artifacts of one finished partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    partition: PartitionKey,
    artifacts_dir: PathBuf,
    output_dir: Option<PathBuf>,
}

impl ConversionJob {
    pub fn new(partition: PartitionKey, artifacts_dir: PathBuf, output_dir: Option<PathBuf>) -> Self {
        Self {
            partition,
            artifacts_dir,
            output_dir,
        }
    }

    pub fn partition(&self) -> &PartitionKey {
        &self.partition
    }

    /// The partition's workspace, holding whatever artifacts landed.
    pub fn artifacts_dir(&self) -> &Path {
        &self.artifacts_dir
    }

    /// `conversion_root / partition` when a conversion root is configured.
    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }
}

/// Turns a partition's retrieved artifacts into its final tabular output.
///
/// Called exactly once per processed partition, after the last batch has
/// settled. Failing requests leave gaps; converters work with what landed.
pub trait ArtifactConverter: Send + Sync + 'static {
    fn convert<'a>(&'a self, job: &'a ConversionJob) -> ConversionFuture<'a>;
}

/// Converter for runs that only need the raw artifacts.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipConversion;

impl ArtifactConverter for SkipConversion {
    fn convert<'a>(&'a self, job: &'a ConversionJob) -> ConversionFuture<'a> {
        Box::pin(async move {
            tracing::debug!(partition = %job.partition(), "conversion skipped");
            Ok(())
        })
    }
}
