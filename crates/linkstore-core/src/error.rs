//! Error taxonomy shared by the store adapter and the services built on it.

use thiserror::Error;

/// Result type alias for raw key-value operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type alias for service (handler-level) operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failures raised by a key-value backend or by record encoding.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("etcd request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("etcd returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("invalid key or value encoding: {0}")]
    Encoding(String),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors surfaced by the services. The gateway maps each variant to exactly one status code.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Missing or invalid required field.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// The target already exists (lock held). `holder` names the current owner when known.
    #[error("{message}")]
    Conflict {
        message: String,
        holder: Option<String>,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}
