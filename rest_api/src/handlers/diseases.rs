// rest_api/src/handlers/diseases.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::info;

use models::{CreateDiseaseRequest, Disease, DiseaseWithDoctor};

use crate::{ApiError, ApiOk, AppState};

// Handler for POST /disease
pub async fn create_disease_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateDiseaseRequest>,
) -> Result<(StatusCode, Json<ApiOk<Disease>>), ApiError> {
    let new_disease = payload.validate()?;
    let disease = state.store.create_disease(new_disease).await?;
    info!(id = disease.id, "disease created");
    Ok((StatusCode::CREATED, Json(ApiOk { data: disease })))
}

// Handler for GET /diseases
pub async fn list_diseases_handler(
    State(state): State<AppState>,
) -> Result<Json<ApiOk<Vec<DiseaseWithDoctor>>>, ApiError> {
    let diseases = state.store.list_diseases().await?;
    Ok(Json(ApiOk { data: diseases }))
}

// Handler for PUT /disease/:id
pub async fn update_disease_handler(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<CreateDiseaseRequest>,
) -> Result<Json<ApiOk<Disease>>, ApiError> {
    let update = payload.validate()?;
    match state.store.update_disease(id, update).await? {
        Some(disease) => Ok(Json(ApiOk { data: disease })),
        None => Err(ApiError::NotFound("Disease not found".to_string())),
    }
}

// Handler for DELETE /disease/:id
pub async fn delete_disease_handler(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiOk<Value>>, ApiError> {
    if !state.store.delete_disease(id).await? {
        return Err(ApiError::NotFound("Disease not found".to_string()));
    }
    info!(id, "disease deleted");
    Ok(Json(ApiOk {
        data: json!({ "message": "Disease deleted successfully", "id": id }),
    }))
}
