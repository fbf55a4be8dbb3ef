use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::ErrorBody;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::error;

/// JSON error response: `{"error": <title>, "message": <detail>}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub title: String,
    pub message: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, title: &str, message: Option<String>) -> Self {
        Self { status, title: title.to_string(), message }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not Found", Some(message.into()))
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        if e.is_user_error() {
            return Self::new(StatusCode::BAD_REQUEST, "Validation Error", Some(e.to_string()));
        }
        error!(err = %e, "request failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", Some(e.to_string()))
    }
}

impl From<JsonRejection> for JsonApiError {
    fn from(rejection: JsonRejection) -> Self {
        let message = Some(rejection.body_text());
        match rejection {
            JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => {
                Self::new(StatusCode::BAD_REQUEST, "Validation Error", message)
            }
            other => {
                let status = other.status();
                Self::new(status, status.canonical_reason().unwrap_or("Bad Request"), message)
            }
        }
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody { error: self.title, message: self.message };
        (self.status, Json(body)).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("storage unavailable: {0}")]
    Storage(#[from] ServiceError),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
