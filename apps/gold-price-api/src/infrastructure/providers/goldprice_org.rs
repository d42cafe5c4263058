//! goldprice.org price adapter (quote-by-price, no key).

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{fetch_json, required_decimal};
use crate::application::ports::{PriceSourcePort, RawQuote, UpstreamError};

/// goldprice.org adapter. Reads `items[0].xauPrice`.
#[derive(Debug, Clone)]
pub struct GoldPriceOrgSource {
    client: reqwest::Client,
    url: String,
}

impl GoldPriceOrgSource {
    /// Provider identifier.
    pub const NAME: &'static str = "goldprice.org";

    /// Create a new adapter for the given endpoint URL.
    #[must_use]
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl PriceSourcePort for GoldPriceOrgSource {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn fetch_raw(&self) -> Result<RawQuote, UpstreamError> {
        tracing::debug!(source = Self::NAME, "Fetching gold price");

        let body: RatesResponse = fetch_json(self.client.get(&self.url)).await?;
        let first = body.items.first().and_then(|item| item.xau_price.as_ref());
        let price = required_decimal(first, "items[0].xauPrice")?;
        Ok(RawQuote::per_ounce(Self::NAME, price))
    }
}

#[derive(Debug, Deserialize)]
struct RatesResponse {
    #[serde(default)]
    items: Vec<RateItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RateItem {
    xau_price: Option<Value>,
}
