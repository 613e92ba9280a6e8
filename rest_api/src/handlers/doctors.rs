// rest_api/src/handlers/doctors.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::info;

use models::{CreateDoctorRequest, Doctor};

use crate::{ApiError, ApiOk, AppState};

// Handler for POST /doctor
pub async fn create_doctor_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateDoctorRequest>,
) -> Result<(StatusCode, Json<ApiOk<Doctor>>), ApiError> {
    let new_doctor = payload.validate()?;
    let doctor = state.store.create_doctor(new_doctor).await?;
    info!(id = doctor.id, "doctor created");
    Ok((StatusCode::CREATED, Json(ApiOk { data: doctor })))
}

// Handler for GET /doctor
pub async fn list_doctors_handler(
    State(state): State<AppState>,
) -> Result<Json<ApiOk<Vec<Doctor>>>, ApiError> {
    let doctors = state.store.list_doctors().await?;
    Ok(Json(ApiOk { data: doctors }))
}

// Handler for GET /doctor/:id
pub async fn get_doctor_handler(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiOk<Doctor>>, ApiError> {
    match state.store.get_doctor(id).await? {
        Some(doctor) => Ok(Json(ApiOk { data: doctor })),
        None => Err(ApiError::NotFound("Doctor not found".to_string())),
    }
}

// Handler for PUT /doctor/:id
pub async fn update_doctor_handler(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<CreateDoctorRequest>,
) -> Result<Json<ApiOk<Doctor>>, ApiError> {
    let update = payload.validate()?;
    match state.store.update_doctor(id, update).await? {
        Some(doctor) => Ok(Json(ApiOk { data: doctor })),
        None => Err(ApiError::NotFound("Doctor not found".to_string())),
    }
}

// Handler for DELETE /doctor/:id
pub async fn delete_doctor_handler(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiOk<Value>>, ApiError> {
    if !state.store.delete_doctor(id).await? {
        return Err(ApiError::NotFound("Doctor not found".to_string()));
    }
    info!(id, "doctor deleted");
    Ok(Json(ApiOk {
        data: json!({ "message": "Doctor deleted successfully" }),
    }))
}
