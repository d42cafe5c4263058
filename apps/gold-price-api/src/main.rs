//! Gold Price API Binary
//!
//! Starts the gold spot-price HTTP service.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin gold-price-api
//! ```
//!
//! # Environment Variables
//!
//! ## Optional
//! - `PORT`: HTTP port (default: 5000)
//! - `GOLD_API_KEY`: Key for the primary provider; without it only the free source is used
//! - `GOLD_API_PROVIDER`: metals-dev | metals-api (default: metals-dev)
//! - `GOLD_API_BASE_URL`: Override the primary provider base URL
//! - `GOLD_API_PREMIUM`: Label primary quotes as premium (default: true)
//! - `FREE_GOLD_API_ENABLED`: Use the free goldprice.org source (default: true)
//! - `FREE_GOLD_API_URL`: Free source URL
//! - `UPSTREAM_TIMEOUT_SECS`: Per-attempt timeout (default: 10)
//! - `REFRESH_INTERVAL_SECS`: Polling interval advertised to clients (default: 60)
//! - `API_PLAN`: Plan label advertised to clients (default: railway)
//! - `FALLBACK_SPOT_PRICE`, `FALLBACK_GRAM_PRICE`: Fallback quote (default: 2650.00 / 85.20)
//! - `PUBLIC_BASE_URL`: Base URL used in the sitemap and robots.txt
//! - `SEO_CACHE_MAX_AGE_SECS`: `/seo-snapshot` cache lifetime (default: 300)
//! - `OTEL_ENABLED`: Enable OpenTelemetry (default: false)
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP endpoint (default: <http://localhost:4317>)
//! - `RUST_LOG`: Log level (default: info)

use std::sync::Arc;
use std::time::Duration;

use gold_price_api::infrastructure::telemetry;
use gold_price_api::{
    AppState, HttpServer, PriceAcquisitionService, ServiceConfig, build_http_client,
    build_price_chain, init_metrics,
};
use tokio::signal;
use tokio_util::sync::CancellationToken;

/// Graceful shutdown timeout.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    load_dotenv();

    // Initialize telemetry (OpenTelemetry + tracing)
    let _telemetry_guard = telemetry::init();

    tracing::info!("Starting Gold Price API");

    // Initialize Prometheus metrics
    if let Err(e) = init_metrics() {
        tracing::warn!(error = %e, "Metrics recorder not installed");
    }

    let config = ServiceConfig::from_env()?;
    log_config(&config);

    let shutdown_token = CancellationToken::new();

    let client = build_http_client(config.upstream_timeout)?;
    let chain = build_price_chain(&config, &client);
    let prices = Arc::new(PriceAcquisitionService::new(
        chain,
        config.fallback,
        config.upstream_timeout,
    ));

    let state = Arc::new(AppState::new(
        env!("CARGO_PKG_VERSION").to_string(),
        prices,
        config.refresh.clone(),
        config.site.clone(),
        config.has_api_key(),
    ));
    let server = HttpServer::new(config.server.port, state, shutdown_token.clone());
    let mut server_task = tokio::spawn(server.run());

    tracing::info!("Gold Price API ready");

    tokio::select! {
        () = await_shutdown(shutdown_token.clone()) => {}
        result = &mut server_task => {
            // Server exited before any signal (e.g. the port is taken)
            result??;
            return Ok(());
        }
    }

    match tokio::time::timeout(SHUTDOWN_TIMEOUT, server_task).await {
        Ok(Ok(Ok(()))) => {}
        Ok(Ok(Err(e))) => tracing::error!(error = %e, "HTTP server error"),
        Ok(Err(e)) => tracing::error!(error = %e, "HTTP server task failed"),
        Err(_) => tracing::warn!("HTTP server did not stop within shutdown timeout"),
    }

    tracing::info!("Gold Price API stopped");
    Ok(())
}

/// Log the parsed configuration.
fn log_config(config: &ServiceConfig) {
    tracing::info!(
        port = config.server.port,
        api_key = if config.has_api_key() { "Configured" } else { "Missing" },
        primary = config.primary.as_ref().map_or("none", |p| p.provider.as_str()),
        free_source = config.free.enabled,
        refresh_interval = %config.refresh.describe(),
        api_plan = config.refresh.api_plan(),
        "Configuration loaded"
    );
    tracing::debug!(
        upstream_timeout_secs = config.upstream_timeout.as_secs(),
        public_base_url = %config.site.public_base_url,
        "Upstream and site settings"
    );
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
#[allow(clippy::expect_used)]
async fn await_shutdown(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    shutdown_token.cancel();

    tracing::info!(
        timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
        "Graceful shutdown started"
    );
}
