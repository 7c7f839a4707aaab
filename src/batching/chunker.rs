use crate::payload::Payload;
use anyhow::{bail, Result};
use std::slice::Chunks;

/// Number of payloads dispatched per batch unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Splits an ordered payload sequence into contiguous batches of at most
/// `batch_size` payloads. Only the last batch may be shorter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadChunker {
    batch_size: usize,
}

impl PayloadChunker {
    /// Fails fast on a zero batch size instead of silently defaulting.
    pub fn new(batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            bail!("batch_size must be greater than 0");
        }
        Ok(Self { batch_size })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Lazily yields batches in input order without copying payloads.
    pub fn chunks<'a>(&self, payloads: &'a [Payload]) -> Chunks<'a, Payload> {
        payloads.chunks(self.batch_size)
    }

    pub fn batch_count(&self, payload_count: usize) -> usize {
        payload_count.div_ceil(self.batch_size)
    }
}

impl Default for PayloadChunker {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}
