//! Profiles, skills, connections and the derived network views.

use crate::app::SharedState;
use crate::error::ApiResult;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use linkstore_core::schema::{Connection, Profile};
use linkstore_core::{
    ConnectionRequest, Dashboard, ProfileDraft, ProfilePatch, ProfileView, RecommendationReport, SkillSearch,
    SKILL_WHITELIST,
};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Deserialize)]
pub struct StatusBody {
    #[serde(default)]
    status: Option<String>,
}

pub async fn create_profile(
    State(state): State<SharedState>,
    body: Result<Json<ProfileDraft>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(draft) = body?;
    let view = state.profiles.create(draft).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "profile created",
            "id": view.profile.id,
            "profile": view.profile,
            "skills": view.skills,
        })),
    ))
}

pub async fn list_profiles(State(state): State<SharedState>) -> ApiResult<Json<Vec<Profile>>> {
    Ok(Json(state.profiles.list().await?))
}

pub async fn get_profile(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult<Json<ProfileView>> {
    Ok(Json(state.profiles.get(&id).await?))
}

pub async fn update_profile(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    body: Result<Json<ProfilePatch>, JsonRejection>,
) -> ApiResult<Json<ProfileView>> {
    let Json(patch) = body?;
    Ok(Json(state.profiles.update(&id, patch).await?))
}

pub async fn delete_profile(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    state.profiles.delete(&id).await?;
    Ok(Json(json!({ "message": "profile deleted", "id": id })))
}

pub async fn recommendations(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<RecommendationReport>> {
    Ok(Json(state.insights.recommend(&id).await?))
}

pub async fn profile_connections(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Connection>>> {
    Ok(Json(state.connections.for_profile(&id).await?))
}

pub async fn search_by_skill(
    State(state): State<SharedState>,
    Path(skill): Path<String>,
) -> ApiResult<Json<SkillSearch>> {
    Ok(Json(state.insights.search_by_skill(&skill).await?))
}

pub async fn list_skills() -> Json<&'static [&'static str]> {
    Json(SKILL_WHITELIST)
}

pub async fn create_connection(
    State(state): State<SharedState>,
    body: Result<Json<ConnectionRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(request) = body?;
    let connection = state.connections.create(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "connection created",
            "id": connection.id,
            "connection": connection,
        })),
    ))
}

pub async fn list_connections(State(state): State<SharedState>) -> ApiResult<Json<Vec<Connection>>> {
    Ok(Json(state.connections.list().await?))
}

pub async fn get_connection(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult<Json<Connection>> {
    Ok(Json(state.connections.get(&id).await?))
}

pub async fn update_connection(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    body: Result<Json<StatusBody>, JsonRejection>,
) -> ApiResult<Json<Connection>> {
    let Json(body) = body?;
    Ok(Json(
        state.connections.update_status(&id, body.status.as_deref()).await?,
    ))
}

pub async fn delete_connection(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    state.connections.delete(&id).await?;
    Ok(Json(json!({ "message": "connection deleted", "id": id })))
}

pub async fn dashboard(State(state): State<SharedState>) -> ApiResult<Json<Dashboard>> {
    Ok(Json(state.insights.dashboard().await?))
}
