use crate::batching::identifier::IdRange;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestErrorKind {
    /// The client returned an error.
    Failed,
    /// The request task panicked before settling.
    Panicked,
}

/// Failure of a single payload's fetch. Captured at the point of invocation
/// and never propagated past the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestError {
    kind: RequestErrorKind,
    message: String,
}

impl RequestError {
    pub fn new(kind: RequestErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub(crate) fn failed(error: &anyhow::Error) -> Self {
        Self::new(RequestErrorKind::Failed, format!("{error:#}"))
    }

    pub fn kind(&self) -> RequestErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            RequestErrorKind::Failed => write!(f, "request failed: {}", self.message),
            RequestErrorKind::Panicked => write!(f, "request panicked: {}", self.message),
        }
    }
}

impl std::error::Error for RequestError {}

/// Settled result of one payload's request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Success { out_name: Option<String> },
    Failure {
        out_name: Option<String>,
        error: RequestError,
    },
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success { .. })
    }

    pub fn out_name(&self) -> Option<&str> {
        match self {
            FetchOutcome::Success { out_name } | FetchOutcome::Failure { out_name, .. } => {
                out_name.as_deref()
            }
        }
    }

    pub fn error(&self) -> Option<&RequestError> {
        match self {
            FetchOutcome::Success { .. } => None,
            FetchOutcome::Failure { error, .. } => Some(error),
        }
    }
}

/// Outcomes of one batch, in the batch's payload order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub index: usize,
    pub ids: Option<IdRange>,
    pub outcomes: Vec<FetchOutcome>,
}

impl BatchReport {
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.attempted() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = &FetchOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.is_success())
    }
}
