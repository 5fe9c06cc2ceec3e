//! API error types with structured JSON responses.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::assistant::AssistantError;
use crate::db::DatabaseError;
use crate::diagnosis::DiagnosisError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Internal error: {0}")]
    Internal(String),
    #[error("{message}: {detail}")]
    DiagnosisFailed {
        message: &'static str,
        detail: String,
    },
    #[error("Upstream service error: {0}")]
    Upstream(String),
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail.clone()),
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail.clone())
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
            ApiError::DiagnosisFailed { message, detail } => {
                tracing::error!(detail, "{message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DIAGNOSIS_FAILED",
                    message.to_string(),
                )
            }
            ApiError::Upstream(detail) => {
                tracing::warn!(detail, "LLM request failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM",
                    "Failed to get AI response".to_string(),
                )
            }
            ApiError::ServiceUnavailable(detail) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "NOT_CONFIGURED",
                detail.clone(),
            ),
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<DiagnosisError> for ApiError {
    fn from(err: DiagnosisError) -> Self {
        let message = match &err {
            DiagnosisError::MissingSymptoms => return ApiError::BadRequest(err.to_string()),
            DiagnosisError::NoJsonFound | DiagnosisError::InvalidJson(_) => {
                "Failed to parse AI diagnosis results"
            }
            DiagnosisError::TimedOut(_) => "AI diagnosis service timed out",
            DiagnosisError::Spawn { .. }
            | DiagnosisError::ProcessFailed { .. }
            | DiagnosisError::Io(_) => "AI diagnosis service failed",
        };
        ApiError::DiagnosisFailed {
            message,
            detail: err.to_string(),
        }
    }
}

impl From<AssistantError> for ApiError {
    fn from(err: AssistantError) -> Self {
        match err {
            AssistantError::NotConfigured => ApiError::ServiceUnavailable(err.to_string()),
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), 4096).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn not_found_returns_404() {
        let response = ApiError::NotFound("Patient not found".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "NOT_FOUND");
        assert_eq!(json["error"]["message"], "Patient not found");
    }

    #[tokio::test]
    async fn internal_hides_details() {
        let response = ApiError::Internal("disk I/O error".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"]["message"], "An internal error occurred");
    }

    #[tokio::test]
    async fn missing_symptoms_is_bad_request() {
        let response = ApiError::from(DiagnosisError::MissingSymptoms).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["message"], "Symptom summary is required for AI diagnosis");
    }

    #[tokio::test]
    async fn engine_failures_are_500_with_message() {
        let response = ApiError::from(DiagnosisError::ProcessFailed {
            code: Some(1),
            stderr: "ModuleNotFoundError: requests".into(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "DIAGNOSIS_FAILED");
        assert_eq!(json["error"]["message"], "AI diagnosis service failed");

        let response = ApiError::from(DiagnosisError::NoJsonFound).into_response();
        let json = body_json(response).await;
        assert_eq!(json["error"]["message"], "Failed to parse AI diagnosis results");
    }

    #[tokio::test]
    async fn timeout_and_launch_failures_have_distinct_messages() {
        let response = ApiError::from(DiagnosisError::TimedOut(120)).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "DIAGNOSIS_FAILED");
        assert_eq!(json["error"]["message"], "AI diagnosis service timed out");

        let response = ApiError::from(DiagnosisError::Spawn {
            program: "./venv/bin/python".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"]["message"], "AI diagnosis service failed");

        let response = ApiError::from(DiagnosisError::Io(std::io::Error::other("pipe closed")))
            .into_response();
        let json = body_json(response).await;
        assert_eq!(json["error"]["message"], "AI diagnosis service failed");
    }

    #[tokio::test]
    async fn assistant_errors_map_to_gateway_statuses() {
        let response = ApiError::from(AssistantError::Upstream {
            status: 500,
            body: "boom".into(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let response = ApiError::from(AssistantError::NotConfigured).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
