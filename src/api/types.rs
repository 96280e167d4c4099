use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use manga_shelf_storage::{Storage, StorageError};
use serde::{Deserialize, Deserializer};
use serde_json::json;

#[derive(Clone)]
pub struct AppState {
    pub storage: Storage,
}

// Standardized Error Response
#[derive(Debug)]
pub enum AppError {
    InternalServerError(String),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    UnprocessableEntity(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
        };

        let body = Json(json!({
            "status": "error",
            "message": message
        }));

        (status, body).into_response()
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Validation(msg) => AppError::BadRequest(msg),
            StorageError::NotFound { .. } => AppError::NotFound(err.to_string()),
            StorageError::Integrity(_) => AppError::UnprocessableEntity(err.to_string()),
            StorageError::Conflict(_) => AppError::Conflict(err.to_string()),
            other => AppError::InternalServerError(other.to_string()),
        }
    }
}

/// Tells an explicit `null` apart from a missing field in PATCH bodies: a
/// missing field stays `None` (via `#[serde(default)]`), `null` becomes
/// `Some(None)`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
