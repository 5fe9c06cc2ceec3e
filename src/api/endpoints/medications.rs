//! `POST /api/patients/:id/medications/recommended`: adopt AI-recommended
//! medications into the patient's list.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;

use crate::api::endpoints::patients::patient_not_found;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApiJson};
use crate::db;
use crate::medications::{self, AdoptRecommendations};
use crate::models::Patient;

pub async fn adopt(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<AdoptRecommendations>,
) -> Result<(StatusCode, Json<Patient>), ApiError> {
    request.validate().map_err(ApiError::BadRequest)?;
    let condition = request.condition.trim();
    let conn = ctx.core.open_db()?;
    let now = Utc::now();
    let (patient, _entry) = db::update_patient_with(&conn, &id, |record| {
        medications::adopt_recommendations(record, condition, &request.recommendations, now)
    })?
    .ok_or_else(patient_not_found)?;
    Ok((StatusCode::CREATED, Json(patient)))
}
