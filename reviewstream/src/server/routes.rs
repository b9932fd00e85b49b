//! Route handlers.

use super::error::ApiError;
use crate::config::ReviewConfig;
use crate::service::ReviewService;
use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::http::HeaderName;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::info;

const NDJSON: &str = "application/x-ndjson";
const X_ACCEL_BUFFERING: HeaderName = HeaderName::from_static("x-accel-buffering");

/// State shared by every handler.
#[derive(Debug)]
pub struct AppState {
    /// The review service.
    pub service: ReviewService,
    /// The loaded configuration.
    pub config: Arc<ReviewConfig>,
}

/// Handler state behind an `Arc`.
pub type SharedState = Arc<AppState>;

/// Body of both review endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewRequest {
    /// The design document text.
    pub design_doc: String,
}

/// Body of a successful blocking review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewResponse {
    /// Always `success`.
    pub status: String,
    /// Summary line.
    pub message: String,
    /// The final report.
    pub report: Option<Value>,
}

/// Routes relative to the API prefix.
pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route("/review/stream", post(stream_review))
        .route("/review/multi-agent-review", post(multi_agent_review))
        .route("/status", get(status_root))
        .route("/status/", get(status_root))
        .route("/status/health", get(health))
        .route("/status/properties", get(properties))
}

async fn stream_review(
    State(state): State<SharedState>,
    payload: Result<Json<ReviewRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    info!(chars = request.design_doc.chars().count(), "Streaming review requested");

    let lines = state.service.review_design_document(&request.design_doc);
    let body = Body::from_stream(lines.map(Ok::<_, Infallible>));

    Ok((
        [
            (CONTENT_TYPE, NDJSON),
            (CACHE_CONTROL, "no-cache"),
            (X_ACCEL_BUFFERING, "no"),
        ],
        body,
    )
        .into_response())
}

async fn multi_agent_review(
    State(state): State<SharedState>,
    payload: Result<Json<ReviewRequest>, JsonRejection>,
) -> Result<Json<ReviewResponse>, ApiError> {
    let Json(request) = payload?;
    info!(chars = request.design_doc.chars().count(), "Blocking review requested");

    let report = state.service.review_to_completion(&request.design_doc).await?;
    Ok(Json(ReviewResponse {
        status: "success".to_string(),
        message: "Architecture analysis complete.".to_string(),
        report,
    }))
}

async fn status_root(State(state): State<SharedState>) -> Json<Value> {
    let app = &state.config.app;
    Json(json!({
        "message": format!("{} is running", app.name),
        "version": app.version,
        "environment": app.environment,
    }))
}

async fn health(State(state): State<SharedState>) -> Json<Value> {
    let app = &state.config.app;
    Json(json!({
        "status": "healthy",
        "service": app.name,
        "version": app.version,
    }))
}

async fn properties(State(state): State<SharedState>) -> Json<Value> {
    Json(state.config.redacted())
}
