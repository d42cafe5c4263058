//! Public HTTP Surface
//!
//! axum router serving the calculator front end.
//!
//! # Endpoints
//!
//! - `GET /api/gold-prices` - Current gold price (JSON, never cached)
//! - `GET /api/goldprices` - Legacy alias of the above
//! - `GET /api/config` - Client polling interval
//! - `GET /health` - Liveness and key status
//! - `GET /seo-snapshot` - Crawlable HTML embedding the price
//! - `GET /` - Status page
//! - `GET /sitemap.xml`, `GET /robots.txt` - Crawler documents
//! - `GET /metrics` - Prometheus metrics in text format

mod pages;
mod response;
mod server;

pub use pages::{render_home, render_robots, render_seo_snapshot, render_sitemap};
pub use response::{ConfigResponse, ErrorResponse, GoldPriceResponse, HealthResponse};
pub use server::{ApiError, AppState, HttpServer, PRICE_ERROR_MESSAGE, ServerError, create_router};
