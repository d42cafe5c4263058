//! Application Services
//!
//! Services that orchestrate domain logic and coordinate between ports.
//!
//! - `PriceAcquisitionService`: Walks the price source chain with fallback

mod price_acquisition;

pub use price_acquisition::{
    DEFAULT_UPSTREAM_TIMEOUT, MAX_UPSTREAM_ATTEMPTS, PriceAcquisitionService, PriceSourceEntry,
    SourceTier, normalize_ounce_price,
};
