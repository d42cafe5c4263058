//! Domain Layer - Price quote types and business rules.
//!
//! Pure types with no I/O: the published quote, its unit conversion and
//! rounding, the fallback constant, and the advertised refresh policy.

/// Price quote, unit conversion, and fallback quote.
pub mod quote;

/// Client polling interval.
pub mod refresh;
