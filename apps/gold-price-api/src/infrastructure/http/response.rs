//! HTTP response DTOs.

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::quote::PriceQuote;
use crate::domain::refresh::RefreshPolicy;

/// Format a timestamp the way browsers print `Date.toISOString()`.
#[must_use]
pub fn iso_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current gold price.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoldPriceResponse {
    /// USD per troy ounce.
    #[serde(with = "rust_decimal::serde::float")]
    pub spot_price: Decimal,
    /// USD per gram.
    #[serde(with = "rust_decimal::serde::float")]
    pub price_per_gram: Decimal,
    /// Acquisition time (ISO 8601).
    pub last_updated: String,
    /// Provenance label.
    pub market: String,
    /// Upstream provider, or "fallback".
    pub source: String,
}

impl From<&PriceQuote> for GoldPriceResponse {
    fn from(quote: &PriceQuote) -> Self {
        Self {
            spot_price: quote.spot_price_per_ounce,
            price_per_gram: quote.price_per_gram,
            last_updated: iso_timestamp(quote.timestamp),
            market: quote.market.as_str().to_string(),
            source: quote.source.clone(),
        }
    }
}

/// Client polling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    /// Refresh interval in milliseconds.
    pub refresh_interval_ms: u64,
    /// Refresh interval in seconds.
    pub refresh_interval_seconds: u64,
    /// Refresh interval in whole minutes.
    pub refresh_interval_minutes: u64,
    /// Plan label.
    pub api_plan: String,
    /// Human-readable interval, e.g. "Every 60 seconds".
    pub update_frequency: String,
}

impl From<&RefreshPolicy> for ConfigResponse {
    fn from(policy: &RefreshPolicy) -> Self {
        Self {
            refresh_interval_ms: policy.interval_millis(),
            refresh_interval_seconds: policy.interval_seconds(),
            refresh_interval_minutes: policy.interval_minutes(),
            api_plan: policy.api_plan().to_string(),
            update_frequency: policy.update_frequency(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Always "ok" while the process serves requests.
    pub status: String,
    /// Current time (ISO 8601).
    pub timestamp: String,
    /// "Configured" or "Missing".
    pub api_key: String,
    /// Human-readable refresh interval.
    pub update_interval: String,
    /// Service version.
    pub version: String,
    /// Seconds since startup.
    pub uptime_secs: u64,
}

/// Error body for JSON routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::quote::{FallbackQuote, MarketLabel};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn gold_price_json_shape() {
        let timestamp = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let quote =
            PriceQuote::from_ounce_price(dec!(2650.125), MarketLabel::Live, "goldprice.org", timestamp);

        let value = serde_json::to_value(GoldPriceResponse::from(&quote)).unwrap();

        assert_eq!(
            value,
            json!({
                "spotPrice": 2650.13,
                "pricePerGram": 85.2,
                "lastUpdated": "2025-01-02T03:04:05.000Z",
                "market": "Live Market",
                "source": "goldprice.org"
            })
        );
    }

    #[test]
    fn fallback_json_shape() {
        let quote = FallbackQuote::default().quote_at(Utc::now());
        let value = serde_json::to_value(GoldPriceResponse::from(&quote)).unwrap();

        assert_eq!(value["spotPrice"], json!(2650.0));
        assert_eq!(value["pricePerGram"], json!(85.2));
        assert_eq!(value["market"], json!("Estimated (Fallback)"));
        assert_eq!(value["source"], json!("fallback"));
    }

    #[test]
    fn config_json_shape() {
        let value = serde_json::to_value(ConfigResponse::from(&RefreshPolicy::default())).unwrap();

        assert_eq!(
            value,
            json!({
                "refreshIntervalMs": 60000,
                "refreshIntervalSeconds": 60,
                "refreshIntervalMinutes": 1,
                "apiPlan": "railway",
                "updateFrequency": "Every 60 seconds"
            })
        );
    }
}
