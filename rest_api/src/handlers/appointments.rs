// rest_api/src/handlers/appointments.rs

use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;

use models::appointment::parse_appointment_date;
use models::{Appointment, BookAppointmentRequest};

use crate::{ApiError, ApiOk, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountQuery {
    pub doctor_id: Option<i32>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

// Handler for POST /appointments
pub async fn create_appointment_handler(
    State(state): State<AppState>,
    Json(payload): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<ApiOk<Appointment>>), ApiError> {
    let booking = payload.validate()?;
    let appointment = state.store.book_appointment(booking).await?;
    info!(
        id = appointment.id,
        doctor_id = appointment.doctor_id,
        date = %appointment.appointment_date,
        "appointment booked"
    );
    Ok((StatusCode::CREATED, Json(ApiOk { data: appointment })))
}

// Handler for GET /appointments/count
//
// Returns a sparse `{date: count}` map for the doctor over the inclusive
// range; the calendar treats absent dates as zero.
pub async fn appointment_counts_handler(
    State(state): State<AppState>,
    Query(query): Query<CountQuery>,
) -> Result<Json<ApiOk<BTreeMap<String, i64>>>, ApiError> {
    let missing =
        || ApiError::InvalidInput("Doctor ID, start date, and end date are required".to_string());

    let doctor_id = query.doctor_id.ok_or_else(missing)?;
    let start_date = query
        .start_date
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(missing)?;
    let end_date = query
        .end_date
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(missing)?;

    let start = parse_appointment_date(start_date)?;
    let end = parse_appointment_date(end_date)?;

    let counts = state.store.appointment_counts(doctor_id, start, end).await?;
    let counts: BTreeMap<String, i64> = counts
        .into_iter()
        .map(|(date, count)| (date.format("%Y-%m-%d").to_string(), count))
        .collect();

    Ok(Json(ApiOk { data: counts }))
}
