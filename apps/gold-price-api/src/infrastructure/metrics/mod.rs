//! Prometheus Metrics Module
//!
//! Exposes price acquisition metrics in Prometheus format.
//!
//! # Metrics Categories
//!
//! - **Fetches**: Upstream attempts by source and outcome, errors by kind
//! - **Fallback**: Requests answered with the fallback quote
//! - **Latency**: Upstream round-trip durations
//! - **Price**: Last live spot price
//!
//! # Integration
//!
//! Metrics are exposed at `/metrics` on the HTTP server port. Recording
//! before `init_metrics` is a no-op.

use std::sync::OnceLock;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

// =============================================================================
// Global Metrics Handle
// =============================================================================

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the Prometheus metrics recorder.
///
/// Subsequent calls return the handle installed by the first one.
///
/// # Errors
///
/// Returns `BuildError` if the global recorder cannot be installed.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    if let Some(handle) = PROMETHEUS_HANDLE.get() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    register_metrics();
    Ok(PROMETHEUS_HANDLE.get_or_init(|| handle).clone())
}

/// Get the Prometheus handle for rendering metrics.
///
/// Returns `None` if metrics have not been initialized.
#[must_use]
pub fn get_metrics_handle() -> Option<PrometheusHandle> {
    PROMETHEUS_HANDLE.get().cloned()
}

// =============================================================================
// Metric Registration
// =============================================================================

fn register_metrics() {
    describe_counter!(
        "gold_price_fetch_attempts_total",
        "Upstream price fetch attempts by source and outcome"
    );
    describe_counter!(
        "gold_price_fetch_errors_total",
        "Upstream price fetch failures by source and error kind"
    );
    describe_counter!(
        "gold_price_fallback_total",
        "Requests answered with the fallback quote"
    );
    describe_histogram!(
        "gold_price_fetch_seconds",
        "Upstream price fetch duration"
    );
    describe_gauge!("gold_price_spot_usd", "Last live gold spot price in USD per ounce");
}

// =============================================================================
// Metric Recording Functions
// =============================================================================

/// Outcome label for a fetch attempt.
#[derive(Debug, Clone, Copy)]
pub enum FetchOutcome {
    /// A usable price was returned.
    Success,
    /// The attempt failed.
    Failure,
}

impl FetchOutcome {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

fn record_attempt(source: &'static str, outcome: FetchOutcome, duration: Duration) {
    counter!(
        "gold_price_fetch_attempts_total",
        "source" => source,
        "outcome" => outcome.as_str()
    )
    .increment(1);
    histogram!("gold_price_fetch_seconds", "source" => source).record(duration.as_secs_f64());
}

/// Record a successful fetch and the resulting spot price.
pub fn record_fetch_success(source: &'static str, duration: Duration, spot_price: Decimal) {
    record_attempt(source, FetchOutcome::Success, duration);
    if let Some(price) = spot_price.to_f64() {
        gauge!("gold_price_spot_usd").set(price);
    }
}

/// Record a failed fetch.
pub fn record_fetch_failure(source: &'static str, kind: &'static str, duration: Duration) {
    record_attempt(source, FetchOutcome::Failure, duration);
    counter!(
        "gold_price_fetch_errors_total",
        "source" => source,
        "kind" => kind
    )
    .increment(1);
}

/// Record a request served from the fallback quote.
pub fn record_fallback() {
    counter!("gold_price_fallback_total").increment(1);
}

// =============================================================================
// Tests
// =============================================================================
