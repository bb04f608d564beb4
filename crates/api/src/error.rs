//! API error types and their HTTP mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use data_validator::ValidationError;
use serde::Serialize;
use storage::StorageError;
use thiserror::Error;
use tracing::{error, warn};

/// Everything a handler can fail with
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request had no body
    #[error("empty body")]
    EmptyBody,

    /// Body is not a JSON student payload
    #[error("malformed body: {0}")]
    MalformedBody(String),

    /// One or more fields failed validation
    #[error("validation failed for {} field(s)", .0.len())]
    Validation(Vec<ValidationError>),

    /// Path id is not an integer
    #[error("invalid id {0:?}")]
    MalformedId(String),

    /// The store rejected or failed the operation
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// `{"error": "..."}`
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// `{"errors": [{"field": "...", "error": "..."}]}`
#[derive(Debug, Serialize)]
pub struct ValidationErrorBody {
    pub errors: Vec<FieldError>,
}

#[derive(Debug, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub error: String,
}

impl ApiError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            Self::EmptyBody | Self::MalformedBody(_) | Self::MalformedId(_) | Self::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Storage(StorageError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Storage(StorageError::DuplicateEmail(_)) => StatusCode::CONFLICT,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), "Request failed: {}", self);
        } else {
            warn!(status = status.as_u16(), "Request rejected: {}", self);
        }

        match self {
            Self::Validation(errors) => {
                let errors = errors
                    .iter()
                    .map(|e| FieldError {
                        field: e.field(),
                        error: e.to_string(),
                    })
                    .collect();
                (status, Json(ValidationErrorBody { errors })).into_response()
            }
            other => (
                status,
                Json(ErrorBody {
                    error: other.to_string(),
                }),
            )
                .into_response(),
        }
    }
}
