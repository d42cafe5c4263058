//! metals.dev price adapter (quote-by-price).

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{fetch_json, required_decimal};
use crate::application::ports::{PriceSourcePort, RawQuote, UpstreamError};
use crate::infrastructure::config::ApiKey;

/// metals.dev adapter.
///
/// Calls `/v1/latest` in USD per troy ounce and reads `metals.gold`.
#[derive(Debug, Clone)]
pub struct MetalsDevSource {
    client: reqwest::Client,
    base_url: String,
    api_key: ApiKey,
}

impl MetalsDevSource {
    /// Provider identifier.
    pub const NAME: &'static str = "metals.dev";

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
        format!("{}/v1/latest", self.base_url)
    }
}

#[async_trait]
impl PriceSourcePort for MetalsDevSource {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn fetch_raw(&self) -> Result<RawQuote, UpstreamError> {
        tracing::debug!(source = Self::NAME, "Fetching gold price");

        let request = self.client.get(self.latest_url()).query(&[
            ("api_key", self.api_key.expose()),
            ("currency", "USD"),
            ("unit", "toz"),
        ]);
        let body: LatestResponse = fetch_json(request).await?;

        if body.status.as_deref() == Some("failure") {
            return Err(UpstreamError::malformed(
                body.error_message
                    .unwrap_or_else(|| "metals.dev reported failure".to_string()),
            ));
        }

        let gold = body.metals.as_ref().and_then(|m| m.gold.as_ref());
        let price = required_decimal(gold, "metals.gold")?;
        Ok(RawQuote::per_ounce(Self::NAME, price))
    }
}

// API response types

#[derive(Debug, Deserialize)]
struct LatestResponse {
    status: Option<String>,
    error_message: Option<String>,
    metals: Option<Metals>,
}

#[derive(Debug, Deserialize)]
struct Metals {
    gold: Option<Value>,
}
