//! Patient timeline endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::endpoints::patients::patient_not_found;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApiJson};
use crate::db;
use crate::models::TimelineEntry;

/// `GET /api/patients/:id/timeline`: entries in stored order.
pub async fn list(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<Vec<TimelineEntry>>, ApiError> {
    let conn = ctx.core.open_db()?;
    let patient = db::get_patient(&conn, &id)?.ok_or_else(patient_not_found)?;
    Ok(Json(patient.record.timeline))
}

/// `POST /api/patients/:id/timeline`: append one entry.
pub async fn append(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    ApiJson(entry): ApiJson<TimelineEntry>,
) -> Result<(StatusCode, Json<TimelineEntry>), ApiError> {
    let conn = ctx.core.open_db()?;
    let stored = db::push_timeline_entry(&conn, &id, &entry)?.ok_or_else(patient_not_found)?;
    Ok((StatusCode::CREATED, Json(stored)))
}
