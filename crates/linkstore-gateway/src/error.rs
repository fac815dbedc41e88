//! HTTP error mapping. Every handler failure passes through `ApiError::into_response`.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use linkstore_core::ServiceError;
use serde_json::json;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Body missing, not JSON, or not the expected shape.
    #[error("invalid request body: {}", .0.body_text())]
    Body(#[from] JsonRejection),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Service(ServiceError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Service(ServiceError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Service(ServiceError::Conflict { .. }) => StatusCode::CONFLICT,
            // Store failures are reported to the caller as bad requests with the raw text.
            ApiError::Service(ServiceError::Store(_)) => StatusCode::BAD_REQUEST,
            ApiError::Body(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            ApiError::Service(ServiceError::Conflict { message, holder }) => {
                json!({ "error": message, "holder": holder })
            }
            ApiError::Service(ServiceError::Store(e)) => {
                tracing::error!(target: "linkstore::gateway", error = %e, "store operation failed");
                json!({ "error": e.to_string() })
            }
            other => {
                tracing::debug!(target: "linkstore::gateway", status = status.as_u16(), error = %other, "request rejected");
                json!({ "error": other.to_string() })
            }
        };
        (status, Json(body)).into_response()
    }
}
