//! Key-value access layer.
//!
//! `KvBackend` is the raw byte-level seam (etcd over HTTP, or embedded sled).
//! `KvAdapter` sits on top and owns the value encoding: structured values are written
//! as canonical JSON text, plain strings as their raw text, and reads decode JSON when
//! the stored text parses and fall back to the raw text otherwise.

mod etcd;
mod sled_store;

pub use etcd::EtcdBackend;
pub use sled_store::SledBackend;

use crate::config::{StoreBackendKind, StoreConfig};
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Byte-level operations every backend provides. Keys are UTF-8 text.
#[async_trait]
pub trait KvBackend: Send + Sync {
    /// Short backend label for logs.
    fn name(&self) -> &'static str;

    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    async fn put(&self, key: &str, value: &[u8]) -> StoreResult<()>;

    /// Writes `value` only when `key` is unset, as a single store-side operation.
    /// Returns the current value when the key already exists (nothing is written).
    async fn put_if_absent(&self, key: &str, value: &[u8]) -> StoreResult<Option<Vec<u8>>>;

    /// All pairs whose key starts with `prefix`, in key order.
    async fn scan_prefix(&self, prefix: &str) -> StoreResult<Vec<(String, Vec<u8>)>>;

    /// Returns true when a key was removed.
    async fn delete(&self, key: &str) -> StoreResult<bool>;

    /// Returns the number of keys removed.
    async fn delete_prefix(&self, prefix: &str) -> StoreResult<u64>;
}

/// A decoded value: JSON when the stored text parses, raw text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    Json(Value),
    Text(String),
}

impl StoredValue {
    pub fn decode(bytes: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(bytes) {
            Ok(v) => StoredValue::Json(v),
            Err(_) => StoredValue::Text(String::from_utf8_lossy(bytes).into_owned()),
        }
    }

    /// JSON object/array/number/bool/null → canonical JSON text; JSON string → its raw text.
    pub fn encode(value: &Value) -> Vec<u8> {
        match value {
            Value::String(s) => s.as_bytes().to_vec(),
            other => other.to_string().into_bytes(),
        }
    }

    pub fn as_object(&self) -> Option<&serde_json::Map<String, Value>> {
        match self {
            StoredValue::Json(Value::Object(map)) => Some(map),
            _ => None,
        }
    }

    pub fn into_json(self) -> Value {
        match self {
            StoredValue::Json(v) => v,
            StoredValue::Text(s) => Value::String(s),
        }
    }
}

impl Serialize for StoredValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StoredValue::Json(v) => v.serialize(serializer),
            StoredValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// Shared handle to the store. Cheap to clone; every service holds one.
#[derive(Clone)]
pub struct KvAdapter {
    backend: Arc<dyn KvBackend>,
}

impl KvAdapter {
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub async fn put(&self, key: &str, value: &Value) -> StoreResult<()> {
        let bytes = StoredValue::encode(value);
        self.backend.put(key, &bytes).await?;
        tracing::debug!(
            target: "linkstore::store",
            backend = self.backend.name(),
            key = key,
            bytes = bytes.len(),
            "put"
        );
        Ok(())
    }

    pub async fn put_record<T: Serialize>(&self, key: &str, record: &T) -> StoreResult<()> {
        let value = serde_json::to_value(record)?;
        self.put(key, &value).await
    }

    pub async fn get(&self, key: &str) -> StoreResult<Option<StoredValue>> {
        let raw = self.backend.get(key).await?;
        Ok(raw.map(|bytes| StoredValue::decode(&bytes)))
    }

    /// Typed read. A stored value that does not match `T` is reported as an encoding error.
    pub async fn get_record<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        match self.get(key).await? {
            Some(StoredValue::Json(v)) => Ok(Some(serde_json::from_value(v)?)),
            Some(StoredValue::Text(_)) => Err(StoreError::Encoding(format!(
                "value at '{}' is not a structured record",
                key
            ))),
            None => Ok(None),
        }
    }

    pub async fn exists(&self, key: &str) -> StoreResult<bool> {
        Ok(self.backend.get(key).await?.is_some())
    }

    /// Every key under `prefix` mapped to its decoded value.
    pub async fn list_by_prefix(&self, prefix: &str) -> StoreResult<BTreeMap<String, StoredValue>> {
        let pairs = self.backend.scan_prefix(prefix).await?;
        tracing::debug!(
            target: "linkstore::store",
            backend = self.backend.name(),
            prefix = prefix,
            count = pairs.len(),
            "prefix scan"
        );
        Ok(pairs
            .into_iter()
            .map(|(k, v)| (k, StoredValue::decode(&v)))
            .collect())
    }

    /// Typed prefix scan. Entries that do not decode as `T` are skipped.
    pub async fn list_records<T: DeserializeOwned>(&self, prefix: &str) -> StoreResult<Vec<(String, T)>> {
        let entries = self.list_by_prefix(prefix).await?;
        let mut out = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let StoredValue::Json(v) = value else {
                tracing::warn!(target: "linkstore::store", key = %key, "skipping non-record value");
                continue;
            };
            match serde_json::from_value::<T>(v) {
                Ok(record) => out.push((key, record)),
                Err(e) => {
                    tracing::warn!(target: "linkstore::store", key = %key, error = %e, "skipping undecodable record")
                }
            }
        }
        Ok(out)
    }

    /// Conditional create. `Ok(None)` when written; `Ok(Some(existing))` when the key was already set.
    pub async fn create_if_absent(&self, key: &str, value: &Value) -> StoreResult<Option<StoredValue>> {
        let bytes = StoredValue::encode(value);
        let existing = self.backend.put_if_absent(key, &bytes).await?;
        Ok(existing.map(|b| StoredValue::decode(&b)))
    }

    pub async fn delete(&self, key: &str) -> StoreResult<bool> {
        self.backend.delete(key).await
    }

    pub async fn delete_by_prefix(&self, prefix: &str) -> StoreResult<u64> {
        let removed = self.backend.delete_prefix(prefix).await?;
        tracing::debug!(target: "linkstore::store", prefix = prefix, removed, "prefix delete");
        Ok(removed)
    }
}

/// Opens the backend selected in `config`.
pub fn open_backend(config: &StoreConfig) -> StoreResult<Arc<dyn KvBackend>> {
    let backend: Arc<dyn KvBackend> = match config.backend {
        StoreBackendKind::Etcd => Arc::new(EtcdBackend::new(config.etcd_endpoint())?),
        StoreBackendKind::Sled => Arc::new(SledBackend::open(&config.sled_path)?),
    };
    tracing::info!(
        target: "linkstore::store",
        backend = backend.name(),
        "key-value backend ready"
    );
    Ok(backend)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_prefers_json_and_falls_back_to_text() {
        assert_eq!(
            StoredValue::decode(br#"{"name":"Ana"}"#),
            StoredValue::Json(json!({"name": "Ana"}))
        );
        assert_eq!(StoredValue::decode(b"42"), StoredValue::Json(json!(42)));
        assert_eq!(
            StoredValue::decode(b"dark mode"),
            StoredValue::Text("dark mode".to_string())
        );
    }

    #[test]
    fn strings_are_written_raw_and_records_as_json() {
        assert_eq!(StoredValue::encode(&json!("on")), b"on".to_vec());
        assert_eq!(StoredValue::encode(&json!({"a": 1})), br#"{"a":1}"#.to_vec());
        assert_eq!(StoredValue::encode(&json!(true)), b"true".to_vec());
    }

    #[test]
    fn text_values_serialize_as_json_strings() {
        let v = serde_json::to_value(StoredValue::Text("x".into())).unwrap();
        assert_eq!(v, json!("x"));
    }
}
