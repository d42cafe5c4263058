//! Port Interfaces
//!
//! Defines the interfaces (ports) for external systems following
//! the Hexagonal Architecture pattern. These are the contracts that
//! infrastructure adapters must implement.
//!
//! ## Driven Ports (Outbound)
//!
//! - `PriceSourcePort`: One upstream metals-price provider

mod price_source_port;

#[cfg(test)]
pub use price_source_port::MockPriceSourcePort;
pub use price_source_port::{PriceSourcePort, QuoteKind, RawQuote, UpstreamError};
