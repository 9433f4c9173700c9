use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::models::{SampleError, ThresholdError};
use persistence::repositories::ActivityWriteError;
use serde::Serialize;
use shared::pagination::CursorError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Validation error: {message}")]
    InvalidFields {
        message: String,
        details: Vec<ValidationDetail>,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<ValidationDetail>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationDetail {
    pub field: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg, None),
            ApiError::InvalidFields { message, details } => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                message,
                Some(details),
            ),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".into(),
                    None,
                )
            }
        };

        let body = ErrorBody {
            error: error_code.into(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".into()),
            sqlx::Error::Database(db_err) => {
                from_database_code(db_err.code().as_deref(), db_err.message())
            }
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

/// Maps a Postgres SQLSTATE to an API error.
///
/// A foreign-key violation raised by a delete means the row is still
/// referenced (409). Raised by an insert or update it means the referenced
/// row is missing (404).
fn from_database_code(code: Option<&str>, message: &str) -> ApiError {
    match code {
        Some("23505") => ApiError::Conflict("Resource already exists".into()),
        Some("23503") if message.starts_with("update or delete on table") => {
            ApiError::Conflict("Resource is still referenced".into())
        }
        Some("23503") => ApiError::NotFound("Referenced resource not found".into()),
        Some("23514") => ApiError::Validation("Value violates a constraint".into()),
        _ => ApiError::Internal(format!("Database error: {}", message)),
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| ValidationDetail {
                    field: field.to_string(),
                    message: e
                        .message
                        .clone()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));

        let message = match details.len() {
            0 => "Invalid request".to_string(),
            1 => details[0].message.clone(),
            n => format!("{} validation errors", n),
        };

        ApiError::InvalidFields { message, details }
    }
}

impl From<ThresholdError> for ApiError {
    fn from(err: ThresholdError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<SampleError> for ApiError {
    fn from(err: SampleError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<CursorError> for ApiError {
    fn from(err: CursorError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<ActivityWriteError> for ApiError {
    fn from(err: ActivityWriteError) -> Self {
        match err {
            ActivityWriteError::Database(e) => e.into(),
            ActivityWriteError::Sample(e) => e.into(),
        }
    }
}
