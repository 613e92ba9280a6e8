// rest_api/src/handlers/assistants.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::info;

use models::{Assistant, CreateAssistantRequest};

use crate::{ApiError, ApiOk, AppState};

// Handler for POST /assistant
pub async fn create_assistant_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateAssistantRequest>,
) -> Result<(StatusCode, Json<ApiOk<Assistant>>), ApiError> {
    let new_assistant = payload.validate()?;
    let assistant = state.store.create_assistant(new_assistant).await?;
    info!(id = assistant.id, "assistant created");
    Ok((StatusCode::CREATED, Json(ApiOk { data: assistant })))
}

// Handler for GET /assistant
pub async fn list_assistants_handler(
    State(state): State<AppState>,
) -> Result<Json<ApiOk<Vec<Assistant>>>, ApiError> {
    let assistants = state.store.list_assistants().await?;
    Ok(Json(ApiOk { data: assistants }))
}

// Handler for PUT /assistant/:id
pub async fn update_assistant_handler(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<CreateAssistantRequest>,
) -> Result<Json<ApiOk<Assistant>>, ApiError> {
    let update = payload.validate()?;
    match state.store.update_assistant(id, update).await? {
        Some(assistant) => Ok(Json(ApiOk { data: assistant })),
        None => Err(ApiError::NotFound("Assistant not found".to_string())),
    }
}

// Handler for DELETE /assistant/:id
pub async fn delete_assistant_handler(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiOk<Value>>, ApiError> {
    if !state.store.delete_assistant(id).await? {
        return Err(ApiError::NotFound("Assistant not found".to_string()));
    }
    info!(id, "assistant deleted");
    Ok(Json(ApiOk {
        data: json!({ "message": "Assistant deleted successfully" }),
    }))
}
