//! Appointment history endpoints.
//!
//! - `GET /api/patients/:id/appointments`: history, newest first
//! - `POST /api/patients/:id/appointments`: prepend a raw record
//! - `POST /api/patients/:id/appointments/publish`: publish a completed form

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;

use crate::api::endpoints::patients::patient_not_found;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApiJson};
use crate::appointment::{self, AppointmentDraft};
use crate::db;
use crate::models::{AppointmentRecord, Patient};

pub async fn list(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<Vec<AppointmentRecord>>, ApiError> {
    let conn = ctx.core.open_db()?;
    let patient = db::get_patient(&conn, &id)?.ok_or_else(patient_not_found)?;
    Ok(Json(patient.record.appointment_history))
}

pub async fn prepend(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    ApiJson(record): ApiJson<AppointmentRecord>,
) -> Result<(StatusCode, Json<AppointmentRecord>), ApiError> {
    let conn = ctx.core.open_db()?;
    let stored = db::unshift_appointment(&conn, &id, &record)?.ok_or_else(patient_not_found)?;
    Ok((StatusCode::CREATED, Json(stored)))
}

pub async fn publish(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    ApiJson(draft): ApiJson<AppointmentDraft>,
) -> Result<(StatusCode, Json<Patient>), ApiError> {
    draft.validate().map_err(ApiError::BadRequest)?;
    let conn = ctx.core.open_db()?;
    let now = Utc::now();
    let (patient, published) = db::update_patient_with(&conn, &id, |record| {
        appointment::publish_appointment(record, &draft, now)
    })?
    .ok_or_else(patient_not_found)?;

    tracing::info!(
        patient = %patient.id,
        appointment = %published.appointment.id,
        "Appointment published"
    );
    Ok((StatusCode::CREATED, Json(patient)))
}
