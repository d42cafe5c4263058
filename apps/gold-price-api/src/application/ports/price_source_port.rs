//! Price Source Port (Driven Port)
//!
//! Interface for a single upstream metals-price provider.

use async_trait::async_trait;
use rust_decimal::Decimal;

/// How the provider expresses the gold price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteKind {
    /// USD per troy ounce.
    PerOunce,
    /// Troy ounces per USD (the inverse of the price).
    RatePerUsd,
}

/// Provider payload reduced to the one number that matters.
///
/// The adapter extracts the provider-specific field; turning the value
/// into a USD-per-ounce price is left to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawQuote {
    /// Provider identifier.
    pub source: &'static str,
    /// Value exactly as reported.
    pub value: Decimal,
    /// Meaning of `value`.
    pub kind: QuoteKind,
}

impl RawQuote {
    /// A quote reported directly in USD per ounce.
    #[must_use]
    pub const fn per_ounce(source: &'static str, value: Decimal) -> Self {
        Self {
            source,
            value,
            kind: QuoteKind::PerOunce,
        }
    }

    /// A quote reported as an exchange rate of gold per USD.
    #[must_use]
    pub const fn rate_per_usd(source: &'static str, value: Decimal) -> Self {
        Self {
            source,
            value,
            kind: QuoteKind::RatePerUsd,
        }
    }
}

/// Upstream failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpstreamError {
    /// The request did not complete within the timeout.
    #[error("upstream request timed out")]
    Timeout,

    /// The response body was not in the expected shape.
    #[error("malformed upstream response: {message}")]
    MalformedResponse {
        /// Error details.
        message: String,
    },

    /// The upstream answered with a non-success status.
    #[error("upstream returned HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },

    /// The upstream could not be reached.
    #[error("upstream unreachable: {message}")]
    Unreachable {
        /// Error details.
        message: String,
    },
}

impl UpstreamError {
    /// Create a malformed-response error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Short label for metrics and logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::MalformedResponse { .. } => "malformed_response",
            Self::Http { .. } => "http_error",
            Self::Unreachable { .. } => "unreachable",
        }
    }
}

/// Port for fetching the current gold price from one provider.
///
/// Implementations perform exactly one network round-trip per call and
/// never retry; retry and fallback policy belongs to the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceSourcePort: Send + Sync {
    /// Provider identifier, used in logs and on live quotes.
    fn name(&self) -> &'static str;

    /// Fetch the provider's current gold quote.
    async fn fetch_raw(&self) -> Result<RawQuote, UpstreamError>;
}
