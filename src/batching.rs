//! Batch primitives: fixed-size chunking of a partition's payload sequence
//! and the id range derived from each batch for progress reporting.

pub mod chunker;
pub mod identifier;
