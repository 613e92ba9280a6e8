use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};
use thiserror::Error;
use tracing::{error, info};

use anyhow::Context;

use models::ValidationError;
use notifications_service::Mailer;
use storage::{ClinicStore, StoreError};

mod config;
pub mod handlers;

pub use crate::config::{load_config, AppConfig};

// Client-facing error for every handler. The status/code mapping here is
// the only place errors turn into HTTP.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{message}")]
    Conflict {
        code: &'static str,
        message: String,
    },
    #[error("{0}")]
    Internal(String),
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::InvalidInput(err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateBooking(date) => ApiError::Conflict {
                code: "DUPLICATE_BOOKING",
                message: format!("You already have an appointment on {date}"),
            },
            StoreError::SlotsExhausted(date) => ApiError::Conflict {
                code: "SLOTS_EXHAUSTED",
                message: format!("This doctor already has 10 appointments on {date}"),
            },
            StoreError::AlreadyExists(what) => ApiError::Conflict {
                code: "ALREADY_EXISTS",
                message: format!("{what} is already registered"),
            },
            StoreError::Database(e) => {
                error!(error = %e, "database error");
                ApiError::Internal("database error".to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, "INVALID_INPUT", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg),
            ApiError::Conflict { code, message } => (StatusCode::CONFLICT, code, message),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", msg),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Success envelope: every 2xx body is `{"data": ...}`.
#[derive(Debug, Serialize)]
pub struct ApiOk<T> {
    pub data: T,
}

// Shared state for the Axum application
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ClinicStore>,
    pub mailer: Arc<Mailer>,
}

// Handler for the /health endpoint
async fn health_check_handler() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "message": "clinic API is healthy" })),
    )
}

/// The full route table. CORS is layered on by `start_server`; tests drive
/// this router directly.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check_handler))
        .route("/submit", post(handlers::patients::create_patient_handler))
        .route("/patient", post(handlers::patients::create_patient_handler))
        .route("/patient/:id", get(handlers::patients::get_patient_handler))
        .route("/patients", get(handlers::patients::list_patients_handler))
        .route("/login", post(handlers::patients::login_patient_handler))
        .route(
            "/doctor",
            post(handlers::doctors::create_doctor_handler)
                .get(handlers::doctors::list_doctors_handler),
        )
        .route(
            "/doctor/:id",
            get(handlers::doctors::get_doctor_handler)
                .put(handlers::doctors::update_doctor_handler)
                .delete(handlers::doctors::delete_doctor_handler),
        )
        .route(
            "/assistant",
            post(handlers::assistants::create_assistant_handler)
                .get(handlers::assistants::list_assistants_handler),
        )
        .route(
            "/assistant/:id",
            put(handlers::assistants::update_assistant_handler)
                .delete(handlers::assistants::delete_assistant_handler),
        )
        .route("/disease", post(handlers::diseases::create_disease_handler))
        .route("/diseases", get(handlers::diseases::list_diseases_handler))
        .route(
            "/disease/:id",
            put(handlers::diseases::update_disease_handler)
                .delete(handlers::diseases::delete_disease_handler),
        )
        .route(
            "/appointments",
            post(handlers::appointments::create_appointment_handler),
        )
        .route(
            "/appointments/count",
            get(handlers::appointments::appointment_counts_handler),
        )
        .route("/admin", post(handlers::admin::login_admin_handler))
        .with_state(state)
}

fn build_cors(origin: Option<&str>) -> Result<CorsLayer, anyhow::Error> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    Ok(match origin {
        Some(origin) => {
            let origin = origin
                .parse::<HeaderValue>()
                .context("invalid CORS origin")?;
            layer.allow_origin(origin)
        }
        None => layer.allow_origin(Any),
    })
}

// Main function to start the REST API server
pub async fn start_server(
    config: AppConfig,
    state: AppState,
    shutdown_rx: oneshot::Receiver<()>,
) -> Result<(), anyhow::Error> {
    let cors = build_cors(config.cors_origin.as_deref())?;
    let app = router(state).layer(cors);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("invalid bind address")?;

    let listener = TcpListener::bind(&addr)
        .await
        .context(format!("failed to bind to address: {addr}"))?;
    info!(%addr, "clinic API listening");

    let shutdown_signal = async {
        tokio::select! {
            _ = shutdown_rx => {
                info!("received shutdown signal");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("received ctrl-c");
            }
        }
    };

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal)
        .await
        .context("server failed")?;

    info!("clinic API stopped");
    Ok(())
}
