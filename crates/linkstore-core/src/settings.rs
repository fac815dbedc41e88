//! Opaque application settings under `/config/app/`.

use crate::error::{ServiceError, ServiceResult};
use crate::schema::config_key;
use crate::store::{KvAdapter, StoredValue};
use serde_json::Value;

#[derive(Clone)]
pub struct ConfigEntries {
    kv: KvAdapter,
}

impl ConfigEntries {
    pub fn new(kv: KvAdapter) -> Self {
        Self { kv }
    }

    pub async fn get(&self, key: &str) -> ServiceResult<StoredValue> {
        self.kv
            .get(&config_key(key))
            .await?
            .ok_or_else(|| ServiceError::not_found("configuration not found"))
    }

    /// Stores `value` as-is; a missing value is stored as empty text.
    pub async fn set(&self, key: &str, value: Option<Value>) -> ServiceResult<()> {
        let value = value.unwrap_or_else(|| Value::String(String::new()));
        self.kv.put(&config_key(key), &value).await?;
        tracing::info!(target: "linkstore::config", key = key, "configuration updated");
        Ok(())
    }
}
