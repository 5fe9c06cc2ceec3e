//! AI diagnosis endpoints.

use axum::extract::State;
use axum::Json;
use chrono::Utc;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApiJson};
use crate::diagnosis::{self, DiagnosisRequest, DiagnosisResponse};

/// `POST /api/ai-diagnosis`: run the diagnosis engine for a symptom form.
pub async fn diagnose(
    State(ctx): State<ApiContext>,
    ApiJson(request): ApiJson<DiagnosisRequest>,
) -> Result<Json<DiagnosisResponse>, ApiError> {
    let response = diagnosis::diagnose(ctx.core.diagnosis.as_ref(), &request).await?;
    Ok(Json(response))
}

/// `POST /api/test-medications`: fixed sample for exercising the client.
pub async fn sample() -> Json<DiagnosisResponse> {
    Json(diagnosis::sample_response(Utc::now()))
}
