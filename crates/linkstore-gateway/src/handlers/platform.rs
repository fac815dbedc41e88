//! Configuration entries, service discovery and locks.

use crate::app::SharedState;
use crate::error::ApiResult;
use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap};
use axum::Json;
use linkstore_core::{ServiceError, StoredValue};
use serde::Deserialize;
use serde_json::{json, Map, Value};

#[derive(Deserialize)]
pub struct ConfigBody {
    #[serde(default, alias = "valor")]
    value: Option<Value>,
}

#[derive(Deserialize)]
pub struct RegisterBody {
    #[serde(default, alias = "nome")]
    name: Option<String>,
    #[serde(default)]
    endpoint: Option<String>,
}

#[derive(Deserialize)]
pub struct LockBody {
    #[serde(default)]
    holder: Option<String>,
}

pub async fn get_config(State(state): State<SharedState>, Path(key): Path<String>) -> ApiResult<Json<Value>> {
    let value = state.config_entries.get(&key).await?;
    let mut body = Map::new();
    body.insert(key, value.into_json());
    Ok(Json(Value::Object(body)))
}

pub async fn put_config(
    State(state): State<SharedState>,
    Path(key): Path<String>,
    body: Result<Json<ConfigBody>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(body) = body?;
    state.config_entries.set(&key, body.value).await?;
    Ok(Json(json!({ "message": "configuration updated" })))
}

pub async fn register_service(
    State(state): State<SharedState>,
    body: Result<Json<RegisterBody>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(body) = body?;
    let key = state
        .registry
        .register(body.name.as_deref(), body.endpoint.as_deref())
        .await?;
    Ok(Json(json!({ "message": "service registered", "key": key })))
}

pub async fn list_service(State(state): State<SharedState>, Path(name): Path<String>) -> ApiResult<Json<Vec<Value>>> {
    Ok(Json(state.registry.list(&name).await?))
}

pub async fn deregister_service(
    State(state): State<SharedState>,
    Path((name, instance)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    state.registry.deregister(&name, &instance).await?;
    Ok(Json(json!({ "message": "service instance removed" })))
}

fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let mime = value.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

/// Holder named in a lock request. Only an empty body means "no holder"; any other
/// body must be JSON sent with a JSON content type.
fn lock_holder(headers: &HeaderMap, body: &[u8]) -> ApiResult<Option<String>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    if !is_json_content_type(headers) {
        return Err(ServiceError::validation("lock body must be sent as application/json").into());
    }
    let Json(body) = Json::<LockBody>::from_bytes(body)?;
    Ok(body.holder)
}

/// Without a body the lock is taken by `unknown`.
pub async fn acquire_lock(
    State(state): State<SharedState>,
    Path(resource): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let holder = lock_holder(&headers, &body)?;
    let lock = state.locks.acquire(&resource, holder.as_deref()).await?;
    Ok(Json(json!({
        "message": "lock acquired",
        "resource": resource,
        "holder": lock.holder,
    })))
}

pub async fn inspect_lock(
    State(state): State<SharedState>,
    Path(resource): Path<String>,
) -> ApiResult<Json<StoredValue>> {
    Ok(Json(state.locks.inspect(&resource).await?))
}

pub async fn release_lock(State(state): State<SharedState>, Path(resource): Path<String>) -> ApiResult<Json<Value>> {
    state.locks.release(&resource).await?;
    Ok(Json(json!({ "message": "lock released" })))
}
