use crate::batching::chunker::DEFAULT_BATCH_SIZE;
use crate::fetch::strategy::FetchStrategy;
use crate::payload::Payload;
use anyhow::{bail, Context, Result};
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_OUTPUT_DIR_FIELD: &str = "out_dir";

const ENV_OUTPUT_ROOT: &str = "BATCHFETCH_OUTPUT_ROOT";
const ENV_BATCH_SIZE: &str = "BATCHFETCH_BATCH_SIZE";
const ENV_MAX_ITERATIONS: &str = "BATCHFETCH_MAX_ITERATIONS";
const ENV_STRATEGY: &str = "BATCHFETCH_STRATEGY";
const ENV_CONVERSION_ROOT: &str = "BATCHFETCH_CONVERSION_ROOT";

/// Runtime configuration for the batch orchestrator.
///
/// All instances must be constructed via [`OrchestratorConfig::builder`],
/// [`OrchestratorConfig::new`] or [`OrchestratorConfig::from_env`] so invariants
/// are validated before any consumer observes the values.
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    output_root: PathBuf,
    batch_size: usize,
    max_iterations: Option<usize>,
    strategy: FetchStrategy,
    output_dir_field: String,
    conversion_root: Option<PathBuf>,
    passthrough: Payload,
}

pub struct OrchestratorConfigParams {
    pub output_root: PathBuf,
    pub batch_size: usize,
    pub max_iterations: Option<usize>,
    pub strategy: FetchStrategy,
    pub output_dir_field: String,
    pub conversion_root: Option<PathBuf>,
    pub passthrough: Payload,
}

impl OrchestratorConfig {
    /// Returns a builder to incrementally construct and validate a configuration.
    pub fn builder() -> OrchestratorConfigBuilder {
        OrchestratorConfigBuilder::default()
    }

    /// Constructs a configuration directly from the provided values.
    pub fn new(params: OrchestratorConfigParams) -> Result<Self> {
        let OrchestratorConfigParams {
            output_root,
            batch_size,
            max_iterations,
            strategy,
            output_dir_field,
            conversion_root,
            passthrough,
        } = params;

        let config = Self {
            output_root,
            batch_size,
            max_iterations,
            strategy,
            output_dir_field: output_dir_field.trim().to_owned(),
            conversion_root,
            passthrough,
        };

        config.validate()?;
        Ok(config)
    }

    /// Reads the `BATCHFETCH_*` environment variables. Only
    /// `BATCHFETCH_OUTPUT_ROOT` is required; the passthrough map starts empty.
    pub fn from_env() -> Result<Self> {
        let output_root = read_env(ENV_OUTPUT_ROOT)?
            .with_context(|| format!("{ENV_OUTPUT_ROOT} is required"))?;
        let batch_size = parse_env::<usize>(ENV_BATCH_SIZE)?.unwrap_or(DEFAULT_BATCH_SIZE);
        let max_iterations = parse_env::<usize>(ENV_MAX_ITERATIONS)?;
        let strategy = parse_env::<FetchStrategy>(ENV_STRATEGY)?.unwrap_or_default();
        let conversion_root = read_env(ENV_CONVERSION_ROOT)?.map(PathBuf::from);

        Self::new(OrchestratorConfigParams {
            output_root: PathBuf::from(output_root),
            batch_size,
            max_iterations,
            strategy,
            output_dir_field: DEFAULT_OUTPUT_DIR_FIELD.to_owned(),
            conversion_root,
            passthrough: Payload::new(),
        })
    }

    /// Directory under which every partition workspace is created.
    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Payloads dispatched per batch; also the concurrent fan-out bound.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Soft cap on the number of payloads attempted per partition.
    pub fn max_iterations(&self) -> Option<usize> {
        self.max_iterations
    }

    pub fn strategy(&self) -> FetchStrategy {
        self.strategy
    }

    /// Request field that receives the partition's workspace path.
    pub fn output_dir_field(&self) -> &str {
        &self.output_dir_field
    }

    pub fn conversion_root(&self) -> Option<&Path> {
        self.conversion_root.as_deref()
    }

    /// Fields forwarded unchanged to every request.
    pub fn passthrough(&self) -> &Payload {
        &self.passthrough
    }

    /// Performs validation on an existing configuration instance.
    pub fn validate(&self) -> Result<()> {
        if self.output_root.as_os_str().is_empty() {
            bail!("output_root cannot be empty");
        }

        if self.batch_size == 0 {
            bail!("batch_size must be greater than 0");
        }

        if self.max_iterations == Some(0) {
            bail!("max_iterations must be greater than 0 when set");
        }

        if self.output_dir_field.is_empty() {
            bail!("output_dir_field cannot be empty");
        }

        if let Some(root) = &self.conversion_root {
            if root.as_os_str().is_empty() {
                bail!("conversion_root cannot be empty when set");
            }
        }

        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct OrchestratorConfigBuilder {
    output_root: Option<PathBuf>,
    batch_size: Option<usize>,
    max_iterations: Option<usize>,
    strategy: Option<FetchStrategy>,
    output_dir_field: Option<String>,
    conversion_root: Option<PathBuf>,
    passthrough: Option<Payload>,
}

impl OrchestratorConfigBuilder {
    pub fn output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.output_root = Some(root.into());
        self
    }

    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = Some(size);
        self
    }

    pub fn max_iterations(mut self, cap: usize) -> Self {
        self.max_iterations = Some(cap);
        self
    }

    pub fn strategy(mut self, strategy: FetchStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn output_dir_field(mut self, field: impl Into<String>) -> Self {
        self.output_dir_field = Some(field.into());
        self
    }

    pub fn conversion_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.conversion_root = Some(root.into());
        self
    }

    pub fn passthrough(mut self, fields: Payload) -> Self {
        self.passthrough = Some(fields);
        self
    }

    pub fn build(self) -> Result<OrchestratorConfig> {
        let params = OrchestratorConfigParams {
            output_root: self.output_root.context("output_root is required")?,
            batch_size: self.batch_size.unwrap_or(DEFAULT_BATCH_SIZE),
            max_iterations: self.max_iterations,
            strategy: self.strategy.unwrap_or_default(),
            output_dir_field: self
                .output_dir_field
                .unwrap_or_else(|| DEFAULT_OUTPUT_DIR_FIELD.to_owned()),
            conversion_root: self.conversion_root,
            passthrough: self.passthrough.unwrap_or_default(),
        };

        OrchestratorConfig::new(params)
    }
}

fn read_env(key: &str) -> Result<Option<String>> {
    match env::var(key) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value.trim().to_owned())),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(err).with_context(|| format!("failed to read {key}")),
    }
}

fn parse_env<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Into<anyhow::Error>,
{
    match read_env(key)? {
        Some(value) => value
            .parse::<T>()
            .map_err(Into::<anyhow::Error>::into)
            .with_context(|| format!("failed to parse {key}='{value}'"))
            .map(Some),
        None => Ok(None),
    }
}
