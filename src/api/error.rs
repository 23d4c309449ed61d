use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::ml::{ModelError, TrainingError};

/// API error taxonomy. Invalid input rejects the single request; a missing
/// model only takes down the diagnosis capability; training failures leave
/// any prior artifact untouched.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("fault diagnosis unavailable: {0}")]
    ModelUnavailable(String),

    #[error("training failed: {0}")]
    TrainingFailed(String),

    #[error("a training run is already in progress")]
    TrainingInProgress,

    #[error("internal error: {0}")]
    Internal(String),
}

/// Error response that gets serialized to JSON
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::TrainingFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::TrainingInProgress => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) => "InvalidInput",
            ApiError::ModelUnavailable(_) => "ModelUnavailable",
            ApiError::TrainingFailed(_) => "TrainingFailed",
            ApiError::TrainingInProgress => "TrainingInProgress",
            ApiError::Internal(_) => "InternalError",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_type = self.error_type();

        let message = match &self {
            ApiError::Internal(_) | ApiError::TrainingFailed(_) => {
                tracing::error!(error = %self, "API error occurred");
                self.to_string()
            }
            ApiError::ModelUnavailable(_) => {
                tracing::warn!(error = %self, "diagnosis unavailable");
                self.to_string()
            }
            _ => {
                tracing::debug!(error = %self, "client error");
                self.to_string()
            }
        };

        let error_response = ErrorResponse {
            error: error_type.to_string(),
            message,
        };

        (status, Json(error_response)).into_response()
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::InvalidInput(errors.to_string())
    }
}

impl From<ModelError> for ApiError {
    fn from(error: ModelError) -> Self {
        ApiError::ModelUnavailable(error.to_string())
    }
}

impl From<TrainingError> for ApiError {
    fn from(error: TrainingError) -> Self {
        ApiError::TrainingFailed(error.to_string())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        ApiError::Internal(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            ApiError::InvalidInput("flow".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::ModelUnavailable("missing".to_string()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::TrainingFailed("fit".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::TrainingInProgress.status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            ApiError::InvalidInput("x".to_string()).error_type(),
            "InvalidInput"
        );
        assert_eq!(
            ApiError::ModelUnavailable("x".to_string()).error_type(),
            "ModelUnavailable"
        );
        assert_eq!(ApiError::TrainingInProgress.error_type(), "TrainingInProgress");
    }

    #[test]
    fn test_model_error_maps_to_unavailable() {
        let api_error: ApiError = ModelError::NotLoaded.into();
        assert!(matches!(api_error, ApiError::ModelUnavailable(_)));
    }
}
