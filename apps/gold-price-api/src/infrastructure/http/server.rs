//! Router, handlers and server lifecycle.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    Json, Router,
    extract::State,
    http::{
        Method, StatusCode,
        header::{CACHE_CONTROL, CONTENT_TYPE, EXPIRES, PRAGMA},
    },
    response::{Html, IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use serde::Serialize;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};

use super::pages::{api_key_label, render_home, render_robots, render_seo_snapshot, render_sitemap};
use super::response::{
    ConfigResponse, ErrorResponse, GoldPriceResponse, HealthResponse, iso_timestamp,
};
use crate::application::services::PriceAcquisitionService;
use crate::domain::refresh::RefreshPolicy;
use crate::infrastructure::config::SiteSettings;
use crate::infrastructure::metrics::get_metrics_handle;

/// Message returned by JSON routes on unexpected failure.
pub const PRICE_ERROR_MESSAGE: &str = "Failed to fetch gold price";

const NO_STORE: &str = "no-cache, no-store, must-revalidate";
const JSON_CONTENT_TYPE: &str = "application/json";

// =============================================================================
// State
// =============================================================================

/// Shared state for the HTTP handlers.
pub struct AppState {
    version: String,
    started_at: Instant,
    prices: Arc<PriceAcquisitionService>,
    refresh: RefreshPolicy,
    site: SiteSettings,
    api_key_configured: bool,
}

impl AppState {
    /// Create new handler state.
    #[must_use]
    pub fn new(
        version: String,
        prices: Arc<PriceAcquisitionService>,
        refresh: RefreshPolicy,
        site: SiteSettings,
        api_key_configured: bool,
    ) -> Self {
        Self {
            version,
            started_at: Instant::now(),
            prices,
            refresh,
            site,
            api_key_configured,
        }
    }
}

// =============================================================================
// Router
// =============================================================================

/// Build the application router.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(home_handler))
        .route("/api/gold-prices", get(gold_prices_handler))
        .route("/api/goldprices", get(gold_prices_handler))
        .route("/api/config", get(config_handler))
        .route("/health", get(health_handler))
        .route("/seo-snapshot", get(seo_snapshot_handler))
        .route("/sitemap.xml", get(sitemap_handler))
        .route("/robots.txt", get(robots_handler))
        .route("/metrics", get(metrics_handler))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Server
// =============================================================================

/// Public HTTP server.
pub struct HttpServer {
    port: u16,
    state: Arc<AppState>,
    cancel: CancellationToken,
}

impl HttpServer {
    /// Create a new HTTP server.
    #[must_use]
    pub const fn new(port: u16, state: Arc<AppState>, cancel: CancellationToken) -> Self {
        Self {
            port,
            state,
            cancel,
        }
    }

    /// Bind `0.0.0.0:<port>` and serve until cancelled.
    ///
    /// # Errors
    ///
    /// Returns `ServerError` if binding fails or the HTTP server
    /// encounters a fatal error while running.
    pub async fn run(self) -> Result<(), ServerError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindFailed(self.port, e.to_string()))?;

        tracing::info!(port = self.port, "HTTP server listening");
        self.serve(listener).await
    }

    /// Serve on an already-bound listener until cancelled.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::ServerFailed` on a fatal server error.
    pub async fn serve(self, listener: TcpListener) -> Result<(), ServerError> {
        axum::serve(listener, create_router(self.state))
            .with_graceful_shutdown(self.cancel.cancelled_owned())
            .await
            .map_err(|e| ServerError::ServerFailed(e.to_string()))?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

// =============================================================================
// HTTP Handlers
// =============================================================================

async fn gold_prices_handler(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let quote = state.prices.current_price().await;
    let body = json_bytes(&GoldPriceResponse::from(&quote))?;

    Ok((
        [
            (CONTENT_TYPE, JSON_CONTENT_TYPE),
            (CACHE_CONTROL, NO_STORE),
            (PRAGMA, "no-cache"),
            (EXPIRES, "0"),
        ],
        body,
    )
        .into_response())
}

async fn config_handler(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let body = json_bytes(&ConfigResponse::from(&state.refresh))?;
    Ok(([(CONTENT_TYPE, JSON_CONTENT_TYPE), (CACHE_CONTROL, "no-cache")], body).into_response())
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let response = HealthResponse {
        status: "ok".to_string(),
        timestamp: iso_timestamp(Utc::now()),
        api_key: api_key_label(state.api_key_configured).to_string(),
        update_interval: state.refresh.describe(),
        version: state.version.clone(),
        uptime_secs: state.started_at.elapsed().as_secs(),
    };
    let body = json_bytes(&response)?;
    Ok(([(CONTENT_TYPE, JSON_CONTENT_TYPE), (CACHE_CONTROL, "no-cache")], body).into_response())
}

async fn seo_snapshot_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let quote = state.prices.current_price().await;
    let cache_control = format!("public, max-age={}", state.site.seo_cache_max_age.as_secs());

    (
        [
            (CONTENT_TYPE, "text/html; charset=UTF-8".to_string()),
            (CACHE_CONTROL, cache_control),
        ],
        [("x-robots-tag", "index, follow")],
        render_seo_snapshot(&quote, &state.refresh),
    )
}

async fn home_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Html(render_home(&state.refresh, state.api_key_configured))
}

async fn sitemap_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(CONTENT_TYPE, "application/xml")],
        render_sitemap(&state.site.public_base_url),
    )
}

async fn robots_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(CONTENT_TYPE, "text/plain")],
        render_robots(&state.site.public_base_url),
    )
}

async fn metrics_handler() -> impl IntoResponse {
    get_metrics_handle().map_or_else(
        || {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                [("content-type", "text/plain")],
                "Metrics not initialized".to_string(),
            )
        },
        |handle| {
            let body = handle.render();
            (
                StatusCode::OK,
                [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
                body,
            )
        },
    )
}

fn json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, ApiError> {
    serde_json::to_vec(value).map_err(ApiError::from)
}

// =============================================================================
// Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to port.
    #[error("failed to bind to port {0}: {1}")]
    BindFailed(u16, String),

    /// Server error.
    #[error("server error: {0}")]
    ServerFailed(String),
}

/// Handler failure rendered as a generic 500 JSON body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Response body could not be serialized.
    #[error("failed to serialize response: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: PRICE_ERROR_MESSAGE.to_string(),
            }),
        )
            .into_response()
    }
}

// =============================================================================
// Tests
// =============================================================================
