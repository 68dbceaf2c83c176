//! API error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use inference_engine::InferenceError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Request-level failures, rendered as `{"error": "..."}`
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing 'url' in request.")]
    MissingUrl,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Model not loaded: {0}")]
    ModelUnavailable(String),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error("Metrics exporter not installed")]
    MetricsDisabled,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingUrl | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Inference(InferenceError::InvalidInputShape { .. }) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::MetricsDisabled => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected: {}", self);
        }
        metrics::counter!("phishing_request_errors_total", "status" => status.as_str().to_owned())
            .increment(1);

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::MissingUrl.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::ModelUnavailable("no file".into()).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(InferenceError::InvalidInputShape {
                expected: 30,
                actual: 84
            })
            .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(InferenceError::InferenceFailed("boom".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(ApiError::MissingUrl.to_string(), "Missing 'url' in request.");
        assert_eq!(
            ApiError::from(InferenceError::InvalidInputShape {
                expected: 30,
                actual: 84
            })
            .to_string(),
            "Expected 30 features, got 84"
        );
    }
}
