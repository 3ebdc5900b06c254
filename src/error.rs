//! Error handling
//!
//! Every failure leaves the API as `{"success": false, "error": "..."}`.

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;

use crate::analyzer::AnalysisError;
use crate::classifier::ClassifierError;
use crate::source::SourceError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    // Classifier errors
    ModelLoad(String),
    Inference(String),

    // Validation errors
    ValidationError(String),

    // External service errors
    ExternalServiceError(String),

    // Generic errors
    InternalError(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::ExternalServiceError(_) => StatusCode::BAD_GATEWAY,
            AppError::ModelLoad(_)
            | AppError::Inference(_)
            | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            AppError::ModelLoad(msg)
            | AppError::Inference(msg)
            | AppError::ValidationError(msg)
            | AppError::ExternalServiceError(msg)
            | AppError::InternalError(msg) => msg.as_str(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::ModelLoad(msg) => tracing::error!("Model load error: {}", msg),
            AppError::Inference(msg) => tracing::error!("Inference error: {}", msg),
            AppError::ExternalServiceError(msg) => tracing::error!("External service error: {}", msg),
            AppError::InternalError(msg) => tracing::error!("Internal error: {}", msg),
            AppError::ValidationError(msg) => tracing::warn!("Validation error: {}", msg),
        }

        let body = Json(json!({
            "success": false,
            "error": self.message(),
        }));

        (status, body).into_response()
    }
}

impl From<ClassifierError> for AppError {
    fn from(err: ClassifierError) -> Self {
        match err {
            ClassifierError::ModelLoad(_) => AppError::ModelLoad(err.to_string()),
            ClassifierError::Inference(_) => AppError::Inference(err.to_string()),
            ClassifierError::InvalidInput(_) => AppError::ValidationError(err.to_string()),
        }
    }
}

impl From<SourceError> for AppError {
    fn from(err: SourceError) -> Self {
        AppError::ExternalServiceError(err.to_string())
    }
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::Classifier(e) => e.into(),
            AnalysisError::Source(e) => e.into(),
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::InternalError(format!("analysis task failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifier_errors_map_to_status() {
        let err: AppError = ClassifierError::ModelLoad("missing".to_string()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "failed to load model: missing");

        let err: AppError = ClassifierError::InvalidInput("empty".to_string()).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err: AppError = SourceError::Unavailable("down".to_string()).into();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_failure_envelope_body() {
        let response = AppError::Inference("inference failed: bad shape".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "inference failed: bad shape");
    }
}
