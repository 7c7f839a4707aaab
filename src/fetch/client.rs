use crate::payload::FetchRequest;
use anyhow::Result;
use futures::future::BoxFuture;

/// Performs the network request for one payload and stores the resulting
/// artifact under the request's output directory as a side effect.
///
/// Implementations may fail freely: every error is captured per request by
/// the active [`FetchStrategy`](crate::fetch::FetchStrategy) and never aborts
/// the batch.
pub trait RemoteFetchClient: Send + Sync {
    fn fetch<'a>(&'a self, request: &'a FetchRequest) -> BoxFuture<'a, Result<()>>;
}
