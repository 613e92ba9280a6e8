// rest_api/src/handlers/patients.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use models::credentials;
use models::{CreatePatientRequest, Patient, PatientSummary};
use notifications_service::OutgoingMail;

use crate::{ApiError, ApiOk, AppState};

#[derive(Debug, Serialize)]
pub struct CreatedPatient {
    pub id: i32,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user_id: i32,
}

// Handler for POST /patient (and its legacy alias POST /submit)
pub async fn create_patient_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreatePatientRequest>,
) -> Result<(StatusCode, Json<ApiOk<CreatedPatient>>), ApiError> {
    let mut new_patient = payload.validate()?;

    let hashed = credentials::hash_password(&new_patient.password).map_err(|e| {
        error!(stage = "patient registration", error = %e, "password hashing failed");
        ApiError::Internal("failed to process registration".to_string())
    })?;
    new_patient.password = hashed;

    let full_name = new_patient.full_name.clone();
    let email = new_patient.email.clone();

    let id = state.store.create_patient(new_patient).await?;
    info!(id, "patient registered");

    // Best-effort welcome mail; the registration response never waits on it.
    state
        .mailer
        .dispatch(OutgoingMail::welcome(&full_name, &email));

    Ok((StatusCode::CREATED, Json(ApiOk { data: CreatedPatient { id } })))
}

// Handler for GET /patient/:id
pub async fn get_patient_handler(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiOk<Patient>>, ApiError> {
    match state.store.get_patient(id).await? {
        Some(patient) => Ok(Json(ApiOk { data: patient })),
        None => Err(ApiError::NotFound("Patient not found".to_string())),
    }
}

// Handler for GET /patients
pub async fn list_patients_handler(
    State(state): State<AppState>,
) -> Result<Json<ApiOk<Vec<PatientSummary>>>, ApiError> {
    let patients = state.store.list_patients().await?;
    Ok(Json(ApiOk { data: patients }))
}

// Handler for POST /login
pub async fn login_patient_handler(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiOk<LoginResponse>>, ApiError> {
    let email = payload
        .email
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::InvalidInput("Email and password are required".to_string()))?;
    let password = payload
        .password
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::InvalidInput("Email and password are required".to_string()))?;

    let patient = state
        .store
        .find_patient_by_email(email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    let matches = credentials::verify_password(password, &patient.password).map_err(|e| {
        error!(stage = "patient login", error = %e, "password verification failed");
        ApiError::Internal("failed to process login".to_string())
    })?;
    if !matches {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    info!(user_id = patient.id, "patient logged in");
    Ok(Json(ApiOk {
        data: LoginResponse {
            user_id: patient.id,
        },
    }))
}
