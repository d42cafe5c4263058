#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements
    )
)]

//! Gold Price API - Spot Price Service
//!
//! An HTTP service that fetches the current gold spot price from third-party
//! metals-price APIs, converts it to a per-gram price, and republishes it
//! for a front-end gold-value calculator.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Core pricing types with no I/O
//!   - `quote`: Price quotes, unit conversion, rounding, fallback quote
//!   - `refresh`: Client polling interval
//!
//! - **Application**: Use cases and port definitions
//!   - `ports`: Upstream price source interface
//!   - `services`: Price acquisition with ordered fallback
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `providers`: metals.dev, metals-api and goldprice.org clients
//!   - `http`: axum router, handlers and server lifecycle
//!   - `config`: Environment configuration
//!   - `metrics`, `telemetry`: Observability
//!
//! # Data Flow
//!
//! ```text
//! Client ──► axum handler ──► PriceAcquisitionService
//!                                   │
//!                                   ├──► primary source (keyed)
//!                                   ├──► free source
//!                                   └──► fallback quote
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Core pricing types with no external dependencies.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::quote::{FallbackQuote, GRAMS_PER_TROY_OUNCE, MarketLabel, PriceQuote};
pub use domain::refresh::RefreshPolicy;

// Application
pub use application::ports::{PriceSourcePort, QuoteKind, RawQuote, UpstreamError};
pub use application::services::{PriceAcquisitionService, PriceSourceEntry, SourceTier};

// Infrastructure config
pub use infrastructure::config::{ConfigError, PrimaryProvider, ServiceConfig};

// HTTP server
pub use infrastructure::http::{AppState, HttpServer, ServerError, create_router};

// Providers
pub use infrastructure::providers::{
    GoldPriceOrgSource, MetalsApiSource, MetalsDevSource, build_http_client, build_price_chain,
};

// Metrics
pub use infrastructure::metrics::init_metrics;

// Telemetry
pub use infrastructure::telemetry::{TelemetryConfig, TelemetryGuard, init as init_telemetry};
