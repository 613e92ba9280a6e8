// rest_api/src/handlers/admin.rs

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use models::credentials;

use crate::{ApiError, ApiOk, AppState};

#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminLoginResponse {
    pub user_id: i32,
}

// Handler for POST /admin
pub async fn login_admin_handler(
    State(state): State<AppState>,
    Json(payload): Json<AdminLoginRequest>,
) -> Result<Json<ApiOk<AdminLoginResponse>>, ApiError> {
    let username = payload
        .username
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            ApiError::InvalidInput("Username and password are required".to_string())
        })?;
    let password = payload
        .password
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            ApiError::InvalidInput("Username and password are required".to_string())
        })?;

    let admin = state
        .store
        .find_admin_by_username(username)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    let matches = credentials::verify_password(password, &admin.password).map_err(|e| {
        error!(stage = "admin login", error = %e, "password verification failed");
        ApiError::Internal("failed to process login".to_string())
    })?;
    if !matches {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    info!(user_id = admin.id, "admin logged in");
    Ok(Json(ApiOk {
        data: AdminLoginResponse { user_id: admin.id },
    }))
}
