//! Request dispatch: the remote-fetch client seam, per-request outcome
//! capture, and the sequential/concurrent strategies that drive one batch.

pub mod client;
pub mod outcome;
pub mod strategy;

pub use client::RemoteFetchClient;
pub use outcome::{BatchReport, FetchOutcome, RequestError, RequestErrorKind};
pub use strategy::FetchStrategy;
