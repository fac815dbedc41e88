use crate::app::SharedState;
use crate::error::ApiResult;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Deserialize)]
pub struct NameQuery {
    #[serde(default)]
    nome: Option<String>,
}

pub async fn create_user(
    State(state): State<SharedState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(body) = body?;
    let created = state.users.create(body).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "user created", "id": created.id, "key": created.key })),
    ))
}

pub async fn list_users(State(state): State<SharedState>) -> ApiResult<Json<Vec<Value>>> {
    Ok(Json(state.users.list().await?))
}

pub async fn get_user(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    Ok(Json(state.users.get(&id).await?))
}

pub async fn update_user(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(body) = body?;
    state.users.replace(&id, body).await?;
    Ok(Json(json!({ "message": "user updated", "id": id })))
}

pub async fn delete_user(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    state.users.delete(&id).await?;
    Ok(Json(json!({ "message": "user deleted", "id": id })))
}

/// `GET /users/buscar?nome=` substring search.
pub async fn search_users(
    State(state): State<SharedState>,
    Query(query): Query<NameQuery>,
) -> ApiResult<Json<Vec<Value>>> {
    let fragment = query.nome.unwrap_or_default();
    Ok(Json(state.users.search_by_name(&fragment).await?))
}
