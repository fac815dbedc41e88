//! Service instance registry under `/services/{name}/`. Registrations never expire.

use crate::error::{ServiceError, ServiceResult};
use crate::schema::{new_id, now_unix_seconds, service_key, service_prefix, ServiceInstance};
use crate::store::KvAdapter;
use serde_json::Value;

/// Taken by the `/servicos/registrar` route; an instance registered under it could never be listed.
pub const RESERVED_SERVICE_NAME: &str = "registrar";

#[derive(Clone)]
pub struct ServiceRegistry {
    kv: KvAdapter,
}

fn non_empty(field: Option<&str>) -> Option<&str> {
    field.map(str::trim).filter(|s| !s.is_empty())
}

impl ServiceRegistry {
    pub fn new(kv: KvAdapter) -> Self {
        Self { kv }
    }

    /// Registers one instance and returns its key.
    pub async fn register(&self, name: Option<&str>, endpoint: Option<&str>) -> ServiceResult<String> {
        let (Some(name), Some(endpoint)) = (non_empty(name), non_empty(endpoint)) else {
            return Err(ServiceError::validation("name and endpoint are required"));
        };
        if name.contains('/') {
            return Err(ServiceError::validation("service name must not contain '/'"));
        }
        if name == RESERVED_SERVICE_NAME {
            return Err(ServiceError::validation("service name 'registrar' is reserved"));
        }
        let key = service_key(name, &new_id());
        let instance = ServiceInstance {
            endpoint: endpoint.to_string(),
            timestamp: now_unix_seconds(),
            status: "active".to_string(),
        };
        self.kv.put_record(&key, &instance).await?;
        tracing::info!(target: "linkstore::discovery", service = name, key = %key, "instance registered");
        Ok(key)
    }

    /// Raw values of every instance registered under `name`.
    pub async fn list(&self, name: &str) -> ServiceResult<Vec<Value>> {
        let entries = self.kv.list_by_prefix(&service_prefix(name)).await?;
        Ok(entries.into_values().map(|v| v.into_json()).collect())
    }

    pub async fn deregister(&self, name: &str, instance_id: &str) -> ServiceResult<()> {
        let key = service_key(name, instance_id);
        if !self.kv.delete(&key).await? {
            return Err(ServiceError::not_found("service instance not found"));
        }
        tracing::info!(target: "linkstore::discovery", service = name, key = %key, "instance removed");
        Ok(())
    }
}
