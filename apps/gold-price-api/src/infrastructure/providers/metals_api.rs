//! metals-api.com price adapter (quote-by-rate).
//!
//! The API quotes gold as an exchange rate against a USD base: `rates.XAU`
//! is troy ounces per dollar, so the price is its inverse.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{fetch_json, required_decimal};
use crate::application::ports::{PriceSourcePort, RawQuote, UpstreamError};
use crate::infrastructure::config::ApiKey;

/// metals-api.com adapter.
#[derive(Debug, Clone)]
pub struct MetalsApiSource {
    client: reqwest::Client,
    base_url: String,
    api_key: ApiKey,
}

impl MetalsApiSource {
    /// Provider identifier.
    pub const NAME: &'static str = "metals-api";

    /// Create a new adapter.
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, api_key: ApiKey) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn latest_url(&self) -> String {
        format!("{}/api/latest", self.base_url)
    }
}

#[async_trait]
impl PriceSourcePort for MetalsApiSource {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn fetch_raw(&self) -> Result<RawQuote, UpstreamError> {
        tracing::debug!(source = Self::NAME, "Fetching gold rate");

        let request = self.client.get(self.latest_url()).query(&[
            ("access_key", self.api_key.expose()),
            ("base", "USD"),
            ("symbols", "XAU"),
        ]);
        let body: LatestResponse = fetch_json(request).await?;

        if !body.success {
            let info = body
                .error
                .and_then(|e| e.info)
                .unwrap_or_else(|| "metals-api reported failure".to_string());
            return Err(UpstreamError::malformed(info));
        }

        let xau = body.rates.as_ref().and_then(|r| r.xau.as_ref());
        let rate = required_decimal(xau, "rates.XAU")?;
        Ok(RawQuote::rate_per_usd(Self::NAME, rate))
    }
}

// API response types

#[derive(Debug, Deserialize)]
struct LatestResponse {
    #[serde(default)]
    success: bool,
    rates: Option<Rates>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct Rates {
    #[serde(rename = "XAU")]
    xau: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    info: Option<String>,
}
