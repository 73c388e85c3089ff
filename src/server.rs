//! Inbound HTTP surface: health route and the Jobber webhook callback.
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info_span, warn, Instrument};
use uuid::Uuid;

use crate::crm::CrmService;
use crate::error::SyncError;
use crate::model::JobberEvent;
use crate::sync::{sync_contact, SyncOutcome};

pub const HEALTH_MESSAGE: &str = "Jobber → GHL sync server is running";
pub const SKIP_MESSAGE: &str = "No tag matched, skipping.";
pub const CALLBACK_PATH: &str = "/callback/jobber";

/// State shared by all handlers. Built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub crm: Arc<dyn CrmService>,
}

impl AppState {
    pub fn new(crm: Arc<dyn CrmService>) -> Self {
        Self { crm }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route(CALLBACK_PATH, post(jobber_callback))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    HEALTH_MESSAGE
}

async fn jobber_callback(
    State(state): State<AppState>,
    payload: Result<Json<JobberEvent>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let request_id = Uuid::new_v4();
    handle_event(state, payload)
        .instrument(info_span!("jobber_webhook", %request_id))
        .await
}

async fn handle_event(
    state: AppState,
    payload: Result<Json<JobberEvent>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(event) = payload?;
    match sync_contact(state.crm.as_ref(), &event).await? {
        SyncOutcome::Skipped => Ok(Json(json!({ "message": SKIP_MESSAGE }))),
        SyncOutcome::Tagged { tag, .. } => Ok(Json(json!({ "success": true, "tag": tag }))),
    }
}

/// Handler failures and the responses they produce.
#[derive(Debug)]
pub enum ApiError {
    BadPayload(String),
    Sync(SyncError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadPayload(rejection.body_text())
    }
}

impl From<SyncError> for ApiError {
    fn from(err: SyncError) -> Self {
        ApiError::Sync(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadPayload(reason) => {
                warn!(%reason, "rejected webhook payload");
                (StatusCode::BAD_REQUEST, Json(json!({ "error": reason }))).into_response()
            }
            ApiError::Sync(err @ SyncError::MissingEmail) => {
                warn!("webhook without client email");
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": err.to_string() })),
                )
                    .into_response()
            }
            ApiError::Sync(SyncError::Upstream(err)) => {
                let message = err.payload();
                error!(%err, %message, "CRM sync failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal error", "message": message })),
                )
                    .into_response()
            }
        }
    }
}
