// src/server/api_error.rs
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::errors::ServiceError;

/// Error leaving a handler, rendered as `{"detail": ...}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }

    /// Crop errors keep their message; anything raised while preprocessing
    /// or running the model is reported as a failed prediction.
    pub fn prediction(err: ServiceError) -> Self {
        match err {
            ServiceError::UnsupportedCrop { .. } | ServiceError::CropUnavailable(_) => err.into(),
            other => Self::bad_request(format!("Prediction failed: {}", other)),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let status = match &err {
            ServiceError::InterpretationNotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Io { .. } | ServiceError::Csv { .. } | ServiceError::Pattern(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::BAD_REQUEST,
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}
