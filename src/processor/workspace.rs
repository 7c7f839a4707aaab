use crate::payload::PartitionKey;
use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceAction {
    InvalidKey,
    Remove,
    Create,
}

/// Failure to reset or create a partition workspace. Always fatal for the
/// partition: every fetch depends on the directory existing.
#[derive(Debug)]
pub struct WorkspaceError {
    partition: PartitionKey,
    path: PathBuf,
    action: WorkspaceAction,
    source: io::Error,
}

impl WorkspaceError {
    fn new(partition: &PartitionKey, path: &Path, action: WorkspaceAction, source: io::Error) -> Self {
        Self {
            partition: partition.clone(),
            path: path.to_path_buf(),
            action,
            source,
        }
    }

    pub fn partition(&self) -> &PartitionKey {
        &self.partition
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn action(&self) -> WorkspaceAction {
        self.action
    }
}

impl fmt::Display for WorkspaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.path.display();
        match self.action {
            WorkspaceAction::InvalidKey => write!(
                f,
                "partition key '{}' cannot name a workspace under {path}",
                self.partition
            ),
            WorkspaceAction::Remove => write!(
                f,
                "failed to remove stale workspace {path} for partition {}",
                self.partition
            ),
            WorkspaceAction::Create => write!(
                f,
                "failed to create workspace {path} for partition {}",
                self.partition
            ),
        }
    }
}

impl std::error::Error for WorkspaceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Owns the destination directories of all partitions under one root.
///
/// [`prepare`](Self::prepare) is destructive: an existing directory for the
/// partition is removed with everything in it before being created again.
#[derive(Debug, Clone)]
pub struct PartitionWorkspace {
    root: PathBuf,
}

impl PartitionWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `root / partition`, without touching the filesystem.
    pub fn path_for(&self, partition: &PartitionKey) -> Result<PathBuf, WorkspaceError> {
        if !is_single_component(partition.as_str()) {
            return Err(WorkspaceError::new(
                partition,
                &self.root,
                WorkspaceAction::InvalidKey,
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "partition key must be a single path component",
                ),
            ));
        }
        Ok(self.root.join(partition.as_str()))
    }

    /// Resets the partition's directory and returns its path.
    pub async fn prepare(&self, partition: &PartitionKey) -> Result<PathBuf, WorkspaceError> {
        let path = self.path_for(partition)?;

        let is_dir = tokio::fs::metadata(&path)
            .await
            .map(|metadata| metadata.is_dir())
            .unwrap_or(false);
        if is_dir {
            tracing::debug!(partition = %partition, path = %path.display(), "removing stale workspace");
            tokio::fs::remove_dir_all(&path)
                .await
                .map_err(|err| WorkspaceError::new(partition, &path, WorkspaceAction::Remove, err))?;
        }

        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|err| WorkspaceError::new(partition, &path, WorkspaceAction::Create, err))?;

        tracing::info!(partition = %partition, path = %path.display(), "workspace ready");
        Ok(path)
    }
}

fn is_single_component(key: &str) -> bool {
    let mut components = Path::new(key).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !key.contains(|c: char| c == '/' || c == '\\')
}
