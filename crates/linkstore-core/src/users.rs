//! Free-form user records under `/users/`.

use crate::error::{ServiceError, ServiceResult};
use crate::schema::{new_id, user_key, USERS_PREFIX};
use crate::store::KvAdapter;
use serde::Serialize;
use serde_json::{Map, Value};

/// Field names accepted for the required user name (`nome` from the legacy API).
const NAME_FIELDS: [&str; 2] = ["name", "nome"];

#[derive(Debug, Clone, Serialize)]
pub struct CreatedUser {
    pub id: String,
    pub key: String,
}

#[derive(Clone)]
pub struct UserDirectory {
    kv: KvAdapter,
}

fn name_of(record: &Map<String, Value>) -> Option<&str> {
    NAME_FIELDS
        .iter()
        .filter_map(|f| record.get(*f).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
}

fn into_object(body: Value) -> ServiceResult<Map<String, Value>> {
    match body {
        Value::Object(map) => Ok(map),
        _ => Err(ServiceError::validation("request body must be a JSON object")),
    }
}

impl UserDirectory {
    pub fn new(kv: KvAdapter) -> Self {
        Self { kv }
    }

    pub async fn create(&self, body: Value) -> ServiceResult<CreatedUser> {
        let mut record = into_object(body)?;
        if name_of(&record).is_none() {
            return Err(ServiceError::validation("name is required"));
        }
        let id = new_id();
        record.insert("id".to_string(), Value::String(id.clone()));
        let key = user_key(&id);
        self.kv.put(&key, &Value::Object(record)).await?;
        tracing::info!(target: "linkstore::users", id = %id, "user created");
        Ok(CreatedUser { id, key })
    }

    /// Every stored user that is a JSON object, in key order.
    pub async fn list(&self) -> ServiceResult<Vec<Value>> {
        let entries = self.kv.list_by_prefix(USERS_PREFIX).await?;
        Ok(entries
            .into_values()
            .filter(|v| v.as_object().is_some())
            .map(|v| v.into_json())
            .collect())
    }

    pub async fn get(&self, id: &str) -> ServiceResult<Value> {
        match self.kv.get(&user_key(id)).await? {
            Some(v) => Ok(v.into_json()),
            None => Err(ServiceError::not_found("user not found")),
        }
    }

    /// Full replacement; only `id` survives from the stored record.
    pub async fn replace(&self, id: &str, body: Value) -> ServiceResult<Value> {
        let key = user_key(id);
        if !self.kv.exists(&key).await? {
            return Err(ServiceError::not_found("user not found"));
        }
        let mut record = into_object(body)?;
        record.insert("id".to_string(), Value::String(id.to_string()));
        let record = Value::Object(record);
        self.kv.put(&key, &record).await?;
        tracing::info!(target: "linkstore::users", id = %id, "user replaced");
        Ok(record)
    }

    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        let key = user_key(id);
        if !self.kv.exists(&key).await? {
            return Err(ServiceError::not_found("user not found"));
        }
        self.kv.delete(&key).await?;
        tracing::info!(target: "linkstore::users", id = %id, "user deleted");
        Ok(())
    }

    /// Case-insensitive substring match on the name over the full list.
    pub async fn search_by_name(&self, fragment: &str) -> ServiceResult<Vec<Value>> {
        let needle = fragment.trim().to_lowercase();
        if needle.is_empty() {
            return Err(ServiceError::validation("query parameter 'nome' is required"));
        }
        let users = self.list().await?;
        Ok(users
            .into_iter()
            .filter(|u| {
                u.as_object()
                    .and_then(name_of)
                    .map(|n| n.to_lowercase().contains(&needle))
                    .unwrap_or(false)
            })
            .collect())
    }
}
