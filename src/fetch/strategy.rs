use super::client::RemoteFetchClient;
use super::outcome::{FetchOutcome, RequestError, RequestErrorKind};
use crate::payload::FetchRequest;
use anyhow::{bail, Error, Result};
use futures::future::join_all;
use futures::FutureExt;
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::str::FromStr;
use std::sync::Arc;
use tokio::task::JoinError;

/// How the requests of one batch are issued.
///
/// Both variants isolate failures per request: an error or panic in one
/// request is captured as a [`FetchOutcome::Failure`] and every sibling still
/// runs. Neither variant cancels anything mid-batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStrategy {
    /// One request at a time, in batch order.
    #[default]
    Sequential,
    /// One task per request, all spawned before any is awaited, then joined.
    /// The batch size is the only bound on fan-out.
    Concurrent,
}

impl FetchStrategy {
    /// Settles every request in the batch and returns one outcome per request,
    /// in the order the requests were given.
    pub async fn execute(
        &self,
        client: &Arc<dyn RemoteFetchClient>,
        requests: Vec<FetchRequest>,
    ) -> Vec<FetchOutcome> {
        match self {
            FetchStrategy::Sequential => execute_sequential(client.as_ref(), requests).await,
            FetchStrategy::Concurrent => execute_concurrent(client, requests).await,
        }
    }
}

impl fmt::Display for FetchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchStrategy::Sequential => f.write_str("sequential"),
            FetchStrategy::Concurrent => f.write_str("concurrent"),
        }
    }
}

impl FromStr for FetchStrategy {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sequential" | "mono" => Ok(FetchStrategy::Sequential),
            "concurrent" | "parallel" => Ok(FetchStrategy::Concurrent),
            other => bail!("unknown fetch strategy '{other}'; expected sequential or concurrent"),
        }
    }
}

async fn execute_sequential(
    client: &dyn RemoteFetchClient,
    requests: Vec<FetchRequest>,
) -> Vec<FetchOutcome> {
    let mut outcomes = Vec::with_capacity(requests.len());
    for request in &requests {
        // Guards building the future as well as polling it.
        let result = AssertUnwindSafe(async { client.fetch(request).await })
            .catch_unwind()
            .await;
        let outcome = match result {
            Ok(Ok(())) => success(request),
            Ok(Err(err)) => failure(request, RequestError::failed(&err)),
            Err(panic_payload) => failure(
                request,
                RequestError::new(
                    RequestErrorKind::Panicked,
                    panic_message(panic_payload.as_ref()),
                ),
            ),
        };
        outcomes.push(outcome);
    }
    outcomes
}

async fn execute_concurrent(
    client: &Arc<dyn RemoteFetchClient>,
    requests: Vec<FetchRequest>,
) -> Vec<FetchOutcome> {
    let mut out_names = Vec::with_capacity(requests.len());
    let mut handles = Vec::with_capacity(requests.len());

    for request in requests {
        out_names.push(request.out_name().map(str::to_owned));
        let client = Arc::clone(client);
        handles.push(tokio::spawn(async move { client.fetch(&request).await }));
    }

    join_all(handles)
        .await
        .into_iter()
        .zip(out_names)
        .map(|(joined, out_name)| match joined {
            Ok(Ok(())) => FetchOutcome::Success { out_name },
            Ok(Err(err)) => record_failure(out_name, RequestError::failed(&err)),
            Err(join_error) => record_failure(out_name, join_failure(join_error)),
        })
        .collect()
}

fn success(request: &FetchRequest) -> FetchOutcome {
    FetchOutcome::Success {
        out_name: request.out_name().map(str::to_owned),
    }
}

fn failure(request: &FetchRequest, error: RequestError) -> FetchOutcome {
    record_failure(request.out_name().map(str::to_owned), error)
}

fn record_failure(out_name: Option<String>, error: RequestError) -> FetchOutcome {
    tracing::warn!(
        out_name = out_name.as_deref().unwrap_or("<missing>"),
        error_kind = ?error.kind(),
        error = %error.message(),
        "request failed; continuing with remaining payloads"
    );
    FetchOutcome::Failure { out_name, error }
}

fn join_failure(join_error: JoinError) -> RequestError {
    if join_error.is_panic() {
        let panic_payload = join_error.into_panic();
        RequestError::new(
            RequestErrorKind::Panicked,
            panic_message(panic_payload.as_ref()),
        )
    } else {
        RequestError::new(RequestErrorKind::Failed, join_error.to_string())
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
