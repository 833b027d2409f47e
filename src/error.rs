//! Request-time errors and their HTTP mapping
//!
//! Export, config and store code uses `anyhow`. Only the per-request path
//! needs typed errors, so the server can tell client faults from server
//! faults.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Errors raised while serving one prediction
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("request contained no image data")]
    EmptyInput,
    #[error("could not decode image: {0}")]
    InvalidImage(#[from] image::ImageError),
    #[error("invalid input shape: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
    #[error("model produced {scores} scores but the label table has {labels} entries")]
    LabelMismatch { scores: usize, labels: usize },
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("model runner unavailable")]
    Unavailable,
}

impl PredictError {
    pub fn status(&self) -> StatusCode {
        match self {
            PredictError::EmptyInput | PredictError::InvalidImage(_) => StatusCode::BAD_REQUEST,
            PredictError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            PredictError::ShapeMismatch { .. }
            | PredictError::LabelMismatch { .. }
            | PredictError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }
}

impl IntoResponse for PredictError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.is_client_error() {
            tracing::debug!("Rejected request: {}", self);
        } else {
            tracing::error!("Prediction failed: {}", self);
        }
        (status, Json(ErrorResponse::new(status, self.to_string()))).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub message: String,
    pub r#type: String,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        let kind = if status.is_client_error() {
            "invalid_request_error"
        } else {
            "server_error"
        };
        Self {
            error: ErrorDetail {
                message: message.into(),
                r#type: kind.to_string(),
            },
        }
    }
}
