//! HTTP surface.
//!
//! All routes live under `server.api_prefix`:
//!
//! - `POST /review/stream` streams ndjson messages
//! - `POST /review/multi-agent-review` returns the final report as JSON
//! - `GET /status/`, `/status/health`, `/status/properties`

mod error;
mod routes;

pub use error::ApiError;
pub use routes::{AppState, ReviewRequest, ReviewResponse, SharedState};

use crate::config::{CorsConfig, ReviewConfig};
use crate::service::ReviewService;
use anyhow::{Context, Result};
use axum::http::{HeaderName, HeaderValue, Method};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tracing::{error, info, warn};

/// Builds the application router.
pub fn build_router(service: ReviewService, config: Arc<ReviewConfig>) -> Router {
    let cors = cors_layer(&config.cors);
    let prefix = config.server.api_prefix.trim_matches('/').to_string();
    let state = Arc::new(AppState { service, config });

    let api = routes::api_router();
    let app = if prefix.is_empty() {
        api
    } else {
        Router::new().nest(&format!("/{prefix}"), api)
    };

    app.layer(cors).with_state(state)
}

/// Builds the CORS layer. A `*` entry allows any value.
///
/// Wildcards mirror the request so they stay valid alongside credentials.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let wildcard = |values: &[String]| values.iter().any(|v| v == "*");

    let origins = if wildcard(&config.origins) {
        AllowOrigin::mirror_request()
    } else {
        AllowOrigin::list(config.origins.iter().filter_map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|_| warn!(origin = %origin, "Ignoring invalid CORS origin"))
                .ok()
        }))
    };

    let methods = if wildcard(&config.methods) {
        AllowMethods::mirror_request()
    } else {
        AllowMethods::list(config.methods.iter().filter_map(|method| {
            Method::from_bytes(method.to_ascii_uppercase().as_bytes())
                .map_err(|_| warn!(method = %method, "Ignoring invalid CORS method"))
                .ok()
        }))
    };

    let headers = if wildcard(&config.headers) {
        AllowHeaders::mirror_request()
    } else {
        AllowHeaders::list(config.headers.iter().filter_map(|header| {
            HeaderName::from_bytes(header.as_bytes())
                .map_err(|_| warn!(header = %header, "Ignoring invalid CORS header"))
                .ok()
        }))
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(headers)
        .allow_credentials(config.credentials)
}

/// Binds the configured address and serves until Ctrl+C.
pub async fn serve(service: ReviewService, config: Arc<ReviewConfig>) -> Result<()> {
    let addr = config.server.bind_address();
    let app = build_router(service, Arc::clone(&config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    let local_addr = listener.local_addr()?;
    info!(
        address = %local_addr,
        prefix = %config.server.api_prefix,
        environment = %config.app.environment,
        "{} listening",
        config.app.name
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
