//! Advisory locks under `/locks/{resource}`.
//!
//! Acquire is a single conditional create on the store, so two callers cannot both win.
//! There is no lease, TTL or fencing token; a lock is held until someone releases it.

use crate::error::{ServiceError, ServiceResult};
use crate::schema::{lock_key, now_unix_seconds, LockRecord};
use crate::store::{KvAdapter, StoredValue};

const UNKNOWN_HOLDER: &str = "unknown";

#[derive(Clone)]
pub struct LockManager {
    kv: KvAdapter,
}

fn holder_of(value: &StoredValue) -> Option<String> {
    value
        .as_object()
        .and_then(|m| m.get("holder"))
        .and_then(|h| h.as_str())
        .map(str::to_string)
}

impl LockManager {
    pub fn new(kv: KvAdapter) -> Self {
        Self { kv }
    }

    /// Creates the lock if absent. A held lock yields `Conflict` naming the current holder.
    pub async fn acquire(&self, resource: &str, holder: Option<&str>) -> ServiceResult<LockRecord> {
        let holder = holder
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .unwrap_or(UNKNOWN_HOLDER);
        let record = LockRecord {
            holder: holder.to_string(),
            timestamp: now_unix_seconds(),
        };
        let value = serde_json::to_value(&record).map_err(crate::error::StoreError::from)?;
        match self.kv.create_if_absent(&lock_key(resource), &value).await? {
            None => {
                tracing::info!(target: "linkstore::locks", resource = resource, holder = holder, "lock acquired");
                Ok(record)
            }
            Some(existing) => {
                let current = holder_of(&existing);
                tracing::info!(
                    target: "linkstore::locks",
                    resource = resource,
                    requested_by = holder,
                    held_by = current.as_deref().unwrap_or("?"),
                    "lock contended"
                );
                Err(ServiceError::Conflict {
                    message: "resource already locked".to_string(),
                    holder: current,
                })
            }
        }
    }

    /// Unconditional release; succeeds whether or not the lock existed.
    pub async fn release(&self, resource: &str) -> ServiceResult<()> {
        let removed = self.kv.delete(&lock_key(resource)).await?;
        tracing::info!(target: "linkstore::locks", resource = resource, removed, "lock released");
        Ok(())
    }

    pub async fn inspect(&self, resource: &str) -> ServiceResult<StoredValue> {
        self.kv
            .get(&lock_key(resource))
            .await?
            .ok_or_else(|| ServiceError::not_found("lock not held"))
    }
}
