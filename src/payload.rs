//! Request descriptors handed to the remote-fetch client, the partition keys
//! that group them, and the merged per-request view sent over the wire.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Field every payload carries; its leading token encodes the payload id.
pub const OUT_NAME_FIELD: &str = "out_name";

/// Opaque mapping of request parameters produced by an upstream generator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(Map<String, Value>);

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor for the common case of a payload that only
    /// needs its `out_name` set.
    pub fn named(out_name: impl Into<String>) -> Self {
        Self::new().with(OUT_NAME_FIELD, Value::String(out_name.into()))
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the `out_name` field when it is present and a string.
    pub fn out_name(&self) -> Option<&str> {
        self.0.get(OUT_NAME_FIELD).and_then(Value::as_str)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for Payload {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Key of a disjoint payload group (for example a year). Each partition owns
/// exactly one workspace directory under the output root.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartitionKey(String);

impl PartitionKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PartitionKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for PartitionKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<i32> for PartitionKey {
    fn from(year: i32) -> Self {
        Self(year.to_string())
    }
}

impl From<u32> for PartitionKey {
    fn from(year: u32) -> Self {
        Self(year.to_string())
    }
}

/// Payload sequences keyed by partition, iterated in key order.
pub type PartitionPayloads = BTreeMap<PartitionKey, Vec<Payload>>;

/// A single payload merged over the passthrough configuration with the
/// partition's workspace injected as the output directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchRequest {
    partition: PartitionKey,
    params: Map<String, Value>,
}

impl FetchRequest {
    /// Layering order: passthrough fields, then payload fields, then the
    /// output directory. The workspace path always wins.
    pub fn compose(
        partition: &PartitionKey,
        passthrough: &Payload,
        payload: &Payload,
        output_dir_field: &str,
        workspace: &Path,
    ) -> Self {
        let mut params = passthrough.fields().clone();
        for (key, value) in payload.fields() {
            params.insert(key.clone(), value.clone());
        }
        params.insert(
            output_dir_field.to_owned(),
            Value::String(workspace.to_string_lossy().into_owned()),
        );

        Self {
            partition: partition.clone(),
            params,
        }
    }

    pub fn partition(&self) -> &PartitionKey {
        &self.partition
    }

    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    pub fn out_name(&self) -> Option<&str> {
        self.params.get(OUT_NAME_FIELD).and_then(Value::as_str)
    }
}
