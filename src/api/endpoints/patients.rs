//! Patient document CRUD.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApiJson};
use crate::db;
use crate::models::{Patient, PatientRecord};

pub(crate) fn patient_not_found() -> ApiError {
    ApiError::NotFound("Patient not found".into())
}

/// `GET /api/patients`: newest first.
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<Vec<Patient>>, ApiError> {
    let conn = ctx.core.open_db()?;
    Ok(Json(db::list_patients(&conn)?))
}

/// `GET /api/patients/:id`
pub async fn get(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<Patient>, ApiError> {
    let conn = ctx.core.open_db()?;
    db::get_patient(&conn, &id)?
        .map(Json)
        .ok_or_else(patient_not_found)
}

/// `POST /api/patients`
pub async fn create(
    State(ctx): State<ApiContext>,
    ApiJson(record): ApiJson<PatientRecord>,
) -> Result<(StatusCode, Json<Patient>), ApiError> {
    record.validate().map_err(ApiError::BadRequest)?;
    let conn = ctx.core.open_db()?;
    let patient = db::insert_patient(&conn, &record)?;
    tracing::info!(id = %patient.id, "Patient created");
    Ok((StatusCode::CREATED, Json(patient)))
}

/// `PUT /api/patients/:id`: replaces the whole document.
pub async fn replace(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    ApiJson(record): ApiJson<PatientRecord>,
) -> Result<Json<Patient>, ApiError> {
    record.validate().map_err(ApiError::BadRequest)?;
    let conn = ctx.core.open_db()?;
    db::replace_patient(&conn, &id, &record)?
        .map(Json)
        .ok_or_else(patient_not_found)
}

/// `DELETE /api/patients/:id`
pub async fn delete(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let conn = ctx.core.open_db()?;
    if !db::delete_patient(&conn, &id)? {
        return Err(patient_not_found());
    }
    tracing::info!(%id, "Patient deleted");
    Ok(StatusCode::NO_CONTENT)
}
