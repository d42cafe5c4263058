//! Price Quote Types
//!
//! The gold price quote served to calculator clients, the fixed fallback
//! quote used when no upstream answers, and the unit conversion between
//! troy ounces and grams.
//!
//! # Rounding
//!
//! Both prices are rounded half away from zero to two decimal places. The
//! gram price is derived from the *unrounded* ounce price; the two values
//! are rounded independently, so the gram price is never a re-rounding of
//! the rounded ounce price.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

// =============================================================================
// Units
// =============================================================================

/// Grams in one troy ounce.
pub const GRAMS_PER_TROY_OUNCE: Decimal = Decimal::from_parts(311_035, 0, 0, false, 4);

/// Decimal places kept on published prices.
pub const PRICE_SCALE: u32 = 2;

/// Source identifier carried by fallback quotes.
pub const FALLBACK_SOURCE: &str = "fallback";

/// Round a price to [`PRICE_SCALE`] places, half away from zero.
#[must_use]
pub fn round_price(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert an unrounded USD-per-ounce price to USD per gram (unrounded).
#[must_use]
pub fn ounce_to_gram(price_per_ounce: Decimal) -> Decimal {
    price_per_ounce / GRAMS_PER_TROY_OUNCE
}

// =============================================================================
// Market Label
// =============================================================================

/// Provenance of a quote as shown to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarketLabel {
    /// Live price from a standard upstream.
    Live,
    /// Live price from the premium upstream.
    LivePremium,
    /// Configured constant served when every upstream failed.
    Fallback,
}

impl MarketLabel {
    /// Display string used on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "Live Market",
            Self::LivePremium => "Live Market (Premium)",
            Self::Fallback => "Estimated (Fallback)",
        }
    }

    /// Whether the quote came from an upstream.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        matches!(self, Self::Live | Self::LivePremium)
    }
}

impl std::fmt::Display for MarketLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Price Quote
// =============================================================================

/// Gold price at the moment it was acquired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceQuote {
    /// USD per troy ounce, rounded to two places.
    pub spot_price_per_ounce: Decimal,
    /// USD per gram, rounded to two places.
    pub price_per_gram: Decimal,
    /// When this service produced the quote.
    pub timestamp: DateTime<Utc>,
    /// Provenance label.
    pub market: MarketLabel,
    /// Upstream provider identifier, or `"fallback"`.
    pub source: String,
}

impl PriceQuote {
    /// Build a quote from an unrounded USD-per-ounce price.
    #[must_use]
    pub fn from_ounce_price(
        price_per_ounce: Decimal,
        market: MarketLabel,
        source: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            spot_price_per_ounce: round_price(price_per_ounce),
            price_per_gram: round_price(ounce_to_gram(price_per_ounce)),
            timestamp,
            market,
            source: source.into(),
        }
    }

    /// Whether this quote was served from the fallback constant.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.market == MarketLabel::Fallback
    }
}

// =============================================================================
// Fallback Quote
// =============================================================================

/// Fixed prices served when no upstream provider is reachable.
///
/// The gram price is configured alongside the ounce price rather than
/// derived, so deployments can publish exactly the figures they choose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackQuote {
    spot_price_per_ounce: Decimal,
    price_per_gram: Decimal,
}

impl FallbackQuote {
    /// Create a fallback from fixed ounce and gram prices.
    #[must_use]
    pub fn new(spot_price_per_ounce: Decimal, price_per_gram: Decimal) -> Self {
        Self {
            spot_price_per_ounce: round_price(spot_price_per_ounce),
            price_per_gram: round_price(price_per_gram),
        }
    }

    /// Fixed USD per troy ounce.
    #[must_use]
    pub const fn spot_price_per_ounce(&self) -> Decimal {
        self.spot_price_per_ounce
    }

    /// Fixed USD per gram.
    #[must_use]
    pub const fn price_per_gram(&self) -> Decimal {
        self.price_per_gram
    }

    /// Stamp the fixed prices into a quote. Performs no I/O.
    #[must_use]
    pub fn quote_at(&self, timestamp: DateTime<Utc>) -> PriceQuote {
        PriceQuote {
            spot_price_per_ounce: self.spot_price_per_ounce,
            price_per_gram: self.price_per_gram,
            timestamp,
            market: MarketLabel::Fallback,
            source: FALLBACK_SOURCE.to_string(),
        }
    }
}

impl Default for FallbackQuote {
    fn default() -> Self {
        Self {
            spot_price_per_ounce: Decimal::new(265_000, 2),
            price_per_gram: Decimal::new(8520, 2),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;
    use test_case::test_case;

    #[test]
    fn troy_ounce_constant() {
        assert_eq!(GRAMS_PER_TROY_OUNCE, dec!(31.1035));
    }

    #[test_case(dec!(2650.125), dec!(2650.13); "midpoint rounds up")]
    #[test_case(dec!(2650.124), dec!(2650.12); "below midpoint rounds down")]
    #[test_case(dec!(2650.115), dec!(2650.12); "odd midpoint rounds away from zero")]
    #[test_case(dec!(2650), dec!(2650.00); "whole number unchanged")]
    fn round_price_half_away_from_zero(input: Decimal, expected: Decimal) {
        assert_eq!(round_price(input), expected);
    }

    #[test]
    fn quote_from_ounce_price() {
        let now = Utc::now();
        let quote =
            PriceQuote::from_ounce_price(dec!(2650.125), MarketLabel::Live, "goldprice.org", now);

        assert_eq!(quote.spot_price_per_ounce, dec!(2650.13));
        // 2650.125 / 31.1035 = 85.2034...
        assert_eq!(quote.price_per_gram, dec!(85.20));
        assert_eq!(quote.market, MarketLabel::Live);
        assert_eq!(quote.source, "goldprice.org");
        assert_eq!(quote.timestamp, now);
        assert!(!quote.is_fallback());
    }

    #[test]
    fn gram_price_uses_unrounded_ounce_price() {
        // 2650.17372 / 31.1035 = 85.205000...
        // 2650.17 / 31.1035 = 85.204880...
        let quote =
            PriceQuote::from_ounce_price(dec!(2650.17372), MarketLabel::Live, "test", Utc::now());

        assert_eq!(quote.spot_price_per_ounce, dec!(2650.17));
        assert_eq!(quote.price_per_gram, dec!(85.21));
    }

    #[test]
    fn market_label_strings() {
        assert_eq!(MarketLabel::Live.as_str(), "Live Market");
        assert_eq!(MarketLabel::LivePremium.as_str(), "Live Market (Premium)");
        assert_eq!(MarketLabel::Fallback.as_str(), "Estimated (Fallback)");
        assert_eq!(MarketLabel::LivePremium.to_string(), "Live Market (Premium)");
        assert!(MarketLabel::Live.is_live());
        assert!(!MarketLabel::Fallback.is_live());
    }

    #[test]
    fn default_fallback_prices() {
        let fallback = FallbackQuote::default();
        assert_eq!(fallback.spot_price_per_ounce(), dec!(2650.00));
        assert_eq!(fallback.price_per_gram(), dec!(85.20));
    }

    #[test]
    fn fallback_quote_at() {
        let now = Utc::now();
        let quote = FallbackQuote::new(dec!(2400), dec!(77.16)).quote_at(now);

        assert_eq!(quote.spot_price_per_ounce, dec!(2400));
        assert_eq!(quote.price_per_gram, dec!(77.16));
        assert_eq!(quote.market, MarketLabel::Fallback);
        assert_eq!(quote.source, FALLBACK_SOURCE);
        assert_eq!(quote.timestamp, now);
        assert!(quote.is_fallback());
    }

    proptest! {
        #[test]
        fn gram_price_matches_formula(cents in 1_i64..100_000_000, extra in 0_u32..1000) {
            // price with up to five decimal places
            let price = Decimal::new(cents * 1000 + i64::from(extra), 5);
            let quote = PriceQuote::from_ounce_price(price, MarketLabel::Live, "test", Utc::now());

            prop_assert_eq!(quote.spot_price_per_ounce, round_price(price));
            prop_assert_eq!(quote.price_per_gram, round_price(price / GRAMS_PER_TROY_OUNCE));
            prop_assert!(quote.spot_price_per_ounce.scale() <= PRICE_SCALE);
            prop_assert!(quote.price_per_gram.scale() <= PRICE_SCALE);
        }
    }
}
