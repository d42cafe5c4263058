//! Upstream Price Provider Adapters
//!
//! Implementations of `PriceSourcePort` for the metals-price APIs, plus
//! assembly of the ordered source chain from configuration.
//!
//! | Provider | Kind | Field |
//! |---|---|---|
//! | metals.dev | USD per ounce | `metals.gold` |
//! | metals-api | XAU per USD | `rates.XAU` |
//! | goldprice.org | USD per ounce | `items[0].xauPrice` |

mod goldprice_org;
mod metals_api;
mod metals_dev;

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::ACCEPT;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use goldprice_org::GoldPriceOrgSource;
pub use metals_api::MetalsApiSource;
pub use metals_dev::MetalsDevSource;

use crate::application::ports::{PriceSourcePort, UpstreamError};
use crate::application::services::PriceSourceEntry;
use crate::infrastructure::config::{PrimaryProvider, ServiceConfig};

/// User agent sent to upstream providers.
pub const USER_AGENT: &str = "GoldCalculator/1.0";

/// Longest upstream error body kept in an error message.
const MAX_ERROR_BODY_LEN: usize = 256;

/// Build the shared HTTP client used by every adapter.
///
/// # Errors
///
/// Returns `reqwest::Error` if the TLS backend cannot be initialized.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
}

/// Assemble the ordered source chain: keyed primary first, free source second.
#[must_use]
pub fn build_price_chain(config: &ServiceConfig, client: &reqwest::Client) -> Vec<PriceSourceEntry> {
    let mut chain = Vec::with_capacity(2);

    if let Some(primary) = &config.primary {
        let source: Arc<dyn PriceSourcePort> = match primary.provider {
            PrimaryProvider::MetalsDev => Arc::new(MetalsDevSource::new(
                client.clone(),
                primary.base_url.clone(),
                primary.api_key.clone(),
            )),
            PrimaryProvider::MetalsApi => Arc::new(MetalsApiSource::new(
                client.clone(),
                primary.base_url.clone(),
                primary.api_key.clone(),
            )),
        };
        chain.push(if primary.premium {
            PriceSourceEntry::premium(source)
        } else {
            PriceSourceEntry::standard(source)
        });
    } else {
        tracing::info!("No gold API key configured, skipping primary price source");
    }

    if config.free.enabled {
        chain.push(PriceSourceEntry::standard(Arc::new(GoldPriceOrgSource::new(
            client.clone(),
            config.free.url.clone(),
        ))));
    }

    chain
}

/// Send a request and decode a JSON body.
async fn fetch_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
) -> Result<T, UpstreamError> {
    let response = request
        .header(ACCEPT, "application/json")
        .send()
        .await
        .map_err(classify_reqwest_error)?;

    let status = response.status();
    if !status.is_success() {
        let mut body = response.text().await.unwrap_or_default();
        truncate_on_char_boundary(&mut body, MAX_ERROR_BODY_LEN);
        return Err(UpstreamError::Http {
            status: status.as_u16(),
            message: body,
        });
    }

    let bytes = response.bytes().await.map_err(classify_reqwest_error)?;
    serde_json::from_slice(&bytes).map_err(|e| UpstreamError::malformed(e.to_string()))
}

/// Map a transport error onto the upstream error taxonomy.
fn classify_reqwest_error(err: reqwest::Error) -> UpstreamError {
    if err.is_timeout() {
        UpstreamError::Timeout
    } else if err.is_decode() {
        UpstreamError::malformed(err.to_string())
    } else if let Some(status) = err.status() {
        UpstreamError::Http {
            status: status.as_u16(),
            message: err.to_string(),
        }
    } else {
        UpstreamError::Unreachable {
            message: err.to_string(),
        }
    }
}

/// Read a price that may be a JSON number or a numeric string.
fn decimal_from_json(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// Extract a required numeric field, naming it in the error.
fn required_decimal(value: Option<&Value>, field: &str) -> Result<Decimal, UpstreamError> {
    let value = value.ok_or_else(|| UpstreamError::malformed(format!("missing field {field}")))?;
    decimal_from_json(value)
        .ok_or_else(|| UpstreamError::malformed(format!("field {field} is not numeric: {value}")))
}

fn truncate_on_char_boundary(s: &mut String, max: usize) {
    if s.len() <= max {
        return;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::SourceTier;
    use crate::infrastructure::config::{ApiKey, PrimarySourceSettings};
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn decimal_from_number_and_string() {
        assert_eq!(decimal_from_json(&json!(2650.125)), Some(dec!(2650.125)));
        assert_eq!(decimal_from_json(&json!("2650.125")), Some(dec!(2650.125)));
        assert_eq!(decimal_from_json(&json!(" 2650 ")), Some(dec!(2650)));
        assert_eq!(decimal_from_json(&json!(2650)), Some(dec!(2650)));
        assert_eq!(decimal_from_json(&json!("3.77e-4")), Some(dec!(0.000377)));
    }

    #[test]
    fn decimal_from_non_numeric() {
        assert_eq!(decimal_from_json(&json!("n/a")), None);
        assert_eq!(decimal_from_json(&json!(null)), None);
        assert_eq!(decimal_from_json(&json!({"price": 1})), None);
    }

    #[test]
    fn required_decimal_errors() {
        let err = required_decimal(None, "metals.gold").unwrap_err();
        assert_eq!(err.kind(), "malformed_response");
        assert!(err.to_string().contains("metals.gold"));

        let err = required_decimal(Some(&json!(true)), "rates.XAU").unwrap_err();
        assert!(err.to_string().contains("rates.XAU"));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let mut s = "ééé".to_string();
        truncate_on_char_boundary(&mut s, 3);
        assert_eq!(s, "é");

        let mut s = "short".to_string();
        truncate_on_char_boundary(&mut s, 256);
        assert_eq!(s, "short");
    }

    #[test]
    fn chain_without_key_has_only_free_source() {
        let client = build_http_client(Duration::from_secs(1)).unwrap();
        let chain = build_price_chain(&ServiceConfig::default(), &client);

        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].name(), GoldPriceOrgSource::NAME);
        assert_eq!(chain[0].tier(), SourceTier::Standard);
    }

    #[test]
    fn chain_with_key_puts_primary_first() {
        let client = build_http_client(Duration::from_secs(1)).unwrap();
        let config = ServiceConfig {
            primary: Some(PrimarySourceSettings {
                provider: PrimaryProvider::MetalsApi,
                api_key: ApiKey::new("key".to_string()),
                base_url: "http://localhost".to_string(),
                premium: true,
            }),
            ..ServiceConfig::default()
        };

        let chain = build_price_chain(&config, &client);

        assert_eq!(chain.len(), 2);
        assert_eq!(chain[0].name(), MetalsApiSource::NAME);
        assert_eq!(chain[0].tier(), SourceTier::Premium);
        assert_eq!(chain[1].name(), GoldPriceOrgSource::NAME);
    }

    #[test]
    fn chain_with_free_source_disabled() {
        let client = build_http_client(Duration::from_secs(1)).unwrap();
        let mut config = ServiceConfig::default();
        config.free.enabled = false;

        assert!(build_price_chain(&config, &client).is_empty());
    }
}
