//! Price Acquisition Service
//!
//! Produces a `PriceQuote` for the current moment by walking an ordered
//! chain of price sources and terminating in the fixed fallback quote.
//!
//! # Algorithm
//!
//! 1. Try each configured source in order (at most [`MAX_UPSTREAM_ATTEMPTS`]),
//!    each under an explicit timeout.
//! 2. The first success is normalized to USD per ounce, converted to a
//!    gram price, rounded and tagged with the source's market label.
//! 3. Failures are logged and the chain moves on.
//! 4. When every source has failed, the fallback quote is returned.
//!
//! `current_price` never fails; callers only observe degradation through
//! the quote's `market` and `source` fields.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use rust_decimal::Decimal;

use crate::application::ports::{PriceSourcePort, QuoteKind, RawQuote, UpstreamError};
use crate::domain::quote::{FallbackQuote, MarketLabel, PriceQuote};
use crate::infrastructure::metrics;

/// Upper bound on sequential upstream attempts per call.
pub const MAX_UPSTREAM_ATTEMPTS: usize = 2;

/// Default per-attempt timeout.
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

// =============================================================================
// Source Chain
// =============================================================================

/// Tier of a configured source, deciding its market label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceTier {
    /// Paid provider; quotes are labeled "Live Market (Premium)".
    Premium,
    /// Free or non-premium provider; quotes are labeled "Live Market".
    Standard,
}

impl SourceTier {
    /// Market label for quotes produced at this tier.
    #[must_use]
    pub const fn market(self) -> MarketLabel {
        match self {
            Self::Premium => MarketLabel::LivePremium,
            Self::Standard => MarketLabel::Live,
        }
    }
}

/// A price source together with its tier.
#[derive(Clone)]
pub struct PriceSourceEntry {
    source: Arc<dyn PriceSourcePort>,
    tier: SourceTier,
}

impl PriceSourceEntry {
    /// Create an entry.
    #[must_use]
    pub fn new(source: Arc<dyn PriceSourcePort>, tier: SourceTier) -> Self {
        Self { source, tier }
    }

    /// Create a premium entry.
    #[must_use]
    pub fn premium(source: Arc<dyn PriceSourcePort>) -> Self {
        Self::new(source, SourceTier::Premium)
    }

    /// Create a standard entry.
    #[must_use]
    pub fn standard(source: Arc<dyn PriceSourcePort>) -> Self {
        Self::new(source, SourceTier::Standard)
    }

    /// Provider identifier.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.source.name()
    }

    /// Tier of this entry.
    #[must_use]
    pub const fn tier(&self) -> SourceTier {
        self.tier
    }
}

impl std::fmt::Debug for PriceSourceEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriceSourceEntry")
            .field("source", &self.source.name())
            .field("tier", &self.tier)
            .finish()
    }
}

// =============================================================================
// Normalization
// =============================================================================

/// Convert a provider payload to an unrounded USD-per-ounce price.
///
/// Rate quotes are inverted (`1 / rate`).
///
/// # Errors
///
/// Returns `UpstreamError::MalformedResponse` if the value or the derived
/// price is not strictly positive.
pub fn normalize_ounce_price(raw: &RawQuote) -> Result<Decimal, UpstreamError> {
    if raw.value <= Decimal::ZERO {
        return Err(UpstreamError::malformed(format!(
            "{} reported non-positive value {}",
            raw.source, raw.value
        )));
    }

    let price = match raw.kind {
        QuoteKind::PerOunce => raw.value,
        QuoteKind::RatePerUsd => Decimal::ONE.checked_div(raw.value).ok_or_else(|| {
            UpstreamError::malformed(format!("{} rate {} cannot be inverted", raw.source, raw.value))
        })?,
    };

    if price <= Decimal::ZERO {
        return Err(UpstreamError::malformed(format!(
            "{} produced non-positive price {price}",
            raw.source
        )));
    }

    Ok(price)
}

// =============================================================================
// Service
// =============================================================================

/// Acquires the current gold price with graceful degradation.
///
/// Holds only immutable configuration, so one instance is shared across
/// concurrent requests without locking.
#[derive(Debug, Clone)]
pub struct PriceAcquisitionService {
    chain: Vec<PriceSourceEntry>,
    fallback: FallbackQuote,
    timeout: Duration,
}

impl PriceAcquisitionService {
    /// Create a service from an ordered source chain.
    ///
    /// Sources beyond [`MAX_UPSTREAM_ATTEMPTS`] are dropped.
    #[must_use]
    pub fn new(mut chain: Vec<PriceSourceEntry>, fallback: FallbackQuote, timeout: Duration) -> Self {
        if chain.len() > MAX_UPSTREAM_ATTEMPTS {
            let dropped: Vec<&'static str> = chain[MAX_UPSTREAM_ATTEMPTS..]
                .iter()
                .map(PriceSourceEntry::name)
                .collect();
            tracing::warn!(
                max = MAX_UPSTREAM_ATTEMPTS,
                ?dropped,
                "Too many price sources configured, ignoring the rest"
            );
            chain.truncate(MAX_UPSTREAM_ATTEMPTS);
        }

        Self {
            chain,
            fallback,
            timeout,
        }
    }

    /// Configured sources, in attempt order.
    #[must_use]
    pub fn sources(&self) -> &[PriceSourceEntry] {
        &self.chain
    }

    /// Whether a premium source is part of the chain.
    #[must_use]
    pub fn has_premium_source(&self) -> bool {
        self.chain.iter().any(|e| e.tier == SourceTier::Premium)
    }

    /// The fallback served when every source fails.
    #[must_use]
    pub const fn fallback(&self) -> &FallbackQuote {
        &self.fallback
    }

    /// Per-attempt timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Produce a quote for the current moment. Never fails.
    #[tracing::instrument(skip(self), level = "debug")]
    pub async fn current_price(&self) -> PriceQuote {
        for entry in &self.chain {
            match self.attempt(entry).await {
                Ok(quote) => return quote,
                Err(e) => {
                    tracing::warn!(
                        source = entry.name(),
                        kind = e.kind(),
                        error = %e,
                        "Price source failed, trying next"
                    );
                }
            }
        }

        metrics::record_fallback();
        tracing::warn!(
            spot_price = %self.fallback.spot_price_per_ounce(),
            "All price sources failed, serving fallback quote"
        );
        self.fallback.quote_at(Utc::now())
    }

    async fn attempt(&self, entry: &PriceSourceEntry) -> Result<PriceQuote, UpstreamError> {
        let started = Instant::now();

        let raw = match tokio::time::timeout(self.timeout, entry.source.fetch_raw()).await {
            Ok(result) => result,
            Err(_) => Err(UpstreamError::Timeout),
        };
        let result = raw.and_then(|raw| {
            let price = normalize_ounce_price(&raw)?;
            Ok(PriceQuote::from_ounce_price(
                price,
                entry.tier.market(),
                raw.source,
                Utc::now(),
            ))
        });

        let elapsed = started.elapsed();
        match &result {
            Ok(quote) => {
                metrics::record_fetch_success(entry.name(), elapsed, quote.spot_price_per_ounce);
                tracing::info!(
                    source = %quote.source,
                    spot_price = %quote.spot_price_per_ounce,
                    price_per_gram = %quote.price_per_gram,
                    elapsed_ms = elapsed.as_millis(),
                    "Gold price fetched"
                );
            }
            Err(e) => metrics::record_fetch_failure(entry.name(), e.kind(), elapsed),
        }

        result
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MockPriceSourcePort;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;

    fn mock_source(
        name: &'static str,
        result: Result<RawQuote, UpstreamError>,
    ) -> Arc<dyn PriceSourcePort> {
        let mut mock = MockPriceSourcePort::new();
        mock.expect_name().return_const(name);
        mock.expect_fetch_raw()
            .times(1)
            .returning(move || result.clone());
        Arc::new(mock)
    }

    fn unused_source(name: &'static str) -> Arc<dyn PriceSourcePort> {
        let mut mock = MockPriceSourcePort::new();
        mock.expect_name().return_const(name);
        mock.expect_fetch_raw().never();
        Arc::new(mock)
    }

    /// Source that never answers within any reasonable timeout.
    struct HangingSource;

    #[async_trait]
    impl PriceSourcePort for HangingSource {
        fn name(&self) -> &'static str {
            "hanging"
        }

        async fn fetch_raw(&self) -> Result<RawQuote, UpstreamError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(RawQuote::per_ounce("hanging", dec!(1)))
        }
    }

    fn service(chain: Vec<PriceSourceEntry>) -> PriceAcquisitionService {
        PriceAcquisitionService::new(chain, FallbackQuote::default(), DEFAULT_UPSTREAM_TIMEOUT)
    }

    #[test]
    fn normalize_per_ounce_passes_through() {
        let raw = RawQuote::per_ounce("x", dec!(2650.125));
        assert_eq!(normalize_ounce_price(&raw).unwrap(), dec!(2650.125));
    }

    #[test]
    fn normalize_rate_inverts() {
        let raw = RawQuote::rate_per_usd("x", dec!(0.0004));
        assert_eq!(normalize_ounce_price(&raw).unwrap(), dec!(2500));

        let raw = RawQuote::rate_per_usd("x", dec!(0.000377));
        assert_eq!(
            normalize_ounce_price(&raw).unwrap(),
            Decimal::ONE / dec!(0.000377)
        );
    }

    #[test]
    fn normalize_rejects_non_positive() {
        for raw in [
            RawQuote::per_ounce("x", Decimal::ZERO),
            RawQuote::per_ounce("x", dec!(-1)),
            RawQuote::rate_per_usd("x", Decimal::ZERO),
        ] {
            let err = normalize_ounce_price(&raw).unwrap_err();
            assert_eq!(err.kind(), "malformed_response");
        }
    }

    #[tokio::test]
    async fn premium_primary_success() {
        let svc = service(vec![
            PriceSourceEntry::premium(mock_source(
                "metals.dev",
                Ok(RawQuote::per_ounce("metals.dev", dec!(2650.125))),
            )),
            PriceSourceEntry::standard(unused_source("goldprice.org")),
        ]);

        let quote = svc.current_price().await;

        assert_eq!(quote.spot_price_per_ounce, dec!(2650.13));
        assert_eq!(quote.price_per_gram, dec!(85.20));
        assert_eq!(quote.market, MarketLabel::LivePremium);
        assert_eq!(quote.source, "metals.dev");
    }

    #[tokio::test]
    async fn non_premium_primary_labeled_live() {
        let svc = service(vec![PriceSourceEntry::standard(mock_source(
            "metals-api",
            Ok(RawQuote::rate_per_usd("metals-api", dec!(0.0004))),
        ))]);

        let quote = svc.current_price().await;

        assert_eq!(quote.spot_price_per_ounce, dec!(2500.00));
        assert_eq!(quote.price_per_gram, dec!(80.38));
        assert_eq!(quote.market, MarketLabel::Live);
    }

    #[tokio::test]
    async fn primary_failure_falls_through_to_secondary() {
        let svc = service(vec![
            PriceSourceEntry::premium(mock_source(
                "metals.dev",
                Err(UpstreamError::Http {
                    status: 401,
                    message: "invalid key".to_string(),
                }),
            )),
            PriceSourceEntry::standard(mock_source(
                "goldprice.org",
                Ok(RawQuote::per_ounce("goldprice.org", dec!(2700))),
            )),
        ]);

        let quote = svc.current_price().await;

        assert_eq!(quote.market, MarketLabel::Live);
        assert_eq!(quote.source, "goldprice.org");
        assert_eq!(quote.spot_price_per_ounce, dec!(2700));
    }

    #[tokio::test]
    async fn malformed_primary_value_falls_through() {
        let svc = service(vec![
            PriceSourceEntry::premium(mock_source(
                "metals-api",
                Ok(RawQuote::rate_per_usd("metals-api", Decimal::ZERO)),
            )),
            PriceSourceEntry::standard(mock_source(
                "goldprice.org",
                Ok(RawQuote::per_ounce("goldprice.org", dec!(2650))),
            )),
        ]);

        let quote = svc.current_price().await;
        assert_eq!(quote.source, "goldprice.org");
    }

    #[tokio::test]
    async fn all_sources_fail_returns_fallback() {
        let svc = service(vec![
            PriceSourceEntry::premium(mock_source("metals.dev", Err(UpstreamError::Timeout))),
            PriceSourceEntry::standard(mock_source(
                "goldprice.org",
                Err(UpstreamError::Unreachable {
                    message: "connection refused".to_string(),
                }),
            )),
        ]);

        let before = Utc::now();
        let quote = svc.current_price().await;

        assert_eq!(quote.spot_price_per_ounce, dec!(2650.00));
        assert_eq!(quote.price_per_gram, dec!(85.20));
        assert_eq!(quote.market, MarketLabel::Fallback);
        assert_eq!(quote.source, "fallback");
        assert!(quote.timestamp >= before);
    }

    #[tokio::test]
    async fn empty_chain_returns_fallback() {
        let fallback = FallbackQuote::new(dec!(2400), dec!(77.16));
        let svc = PriceAcquisitionService::new(vec![], fallback, DEFAULT_UPSTREAM_TIMEOUT);

        let quote = svc.current_price().await;

        assert_eq!(quote, fallback.quote_at(quote.timestamp));
    }

    #[tokio::test]
    async fn hanging_sources_time_out_to_fallback() {
        let svc = PriceAcquisitionService::new(
            vec![
                PriceSourceEntry::premium(Arc::new(HangingSource)),
                PriceSourceEntry::standard(Arc::new(HangingSource)),
            ],
            FallbackQuote::default(),
            Duration::from_millis(50),
        );

        let started = Instant::now();
        let quote = svc.current_price().await;

        assert!(quote.is_fallback());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn hanging_primary_times_out_to_secondary() {
        let svc = PriceAcquisitionService::new(
            vec![
                PriceSourceEntry::premium(Arc::new(HangingSource)),
                PriceSourceEntry::standard(mock_source(
                    "goldprice.org",
                    Ok(RawQuote::per_ounce("goldprice.org", dec!(2650))),
                )),
            ],
            FallbackQuote::default(),
            Duration::from_millis(50),
        );

        let quote = svc.current_price().await;
        assert_eq!(quote.market, MarketLabel::Live);
        assert_eq!(quote.source, "goldprice.org");
    }

    #[test]
    fn chain_truncated_to_max_attempts() {
        let svc = service(vec![
            PriceSourceEntry::premium(unused_source("a")),
            PriceSourceEntry::standard(unused_source("b")),
            PriceSourceEntry::standard(unused_source("c")),
        ]);

        let names: Vec<_> = svc.sources().iter().map(PriceSourceEntry::name).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(svc.has_premium_source());
    }

    #[test]
    fn tier_market_labels() {
        assert_eq!(SourceTier::Premium.market(), MarketLabel::LivePremium);
        assert_eq!(SourceTier::Standard.market(), MarketLabel::Live);
    }
}
