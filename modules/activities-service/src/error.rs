//! Error types for the activities service.

use activities_types::ErrorResponse;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use std::path::PathBuf;
use thiserror::Error;

/// Failures of an Activity Store operation.
///
/// Client errors carry the detail sent back in the response body; the I/O
/// variants are logged and reported as a generic server error.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Activity not found")]
    NotFound,

    /// Duplicate activity name or duplicate signup.
    #[error("{0}")]
    Conflict(String),

    #[error("Student is not signed up for this activity")]
    NotSignedUp,

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to persist {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode activities: {0}")]
    Encode(#[from] serde_json::Error),
}

impl StoreError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Conflict(_) | Self::NotSignedUp => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Io { .. } | Self::Json { .. } | Self::Persist { .. } | Self::Encode(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<JsonRejection> for StoreError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for StoreError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = if status.is_server_error() {
            log::error!("{}", self);
            "Internal server error".to_string()
        } else {
            log::debug!("rejected request: {}", self);
            self.to_string()
        };
        (status, Json(ErrorResponse::new(detail))).into_response()
    }
}

/// Errors that stop the service from starting.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("invalid {name}: '{value}'")]
    Config { name: &'static str, value: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}
