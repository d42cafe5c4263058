//! Infrastructure Layer - Adapters and external integrations.
//!
//! This layer contains the concrete implementations of the port interfaces
//! defined in the application layer.

/// Configuration loaded from the environment.
pub mod config;

/// Public HTTP server and handlers.
pub mod http;

/// Prometheus metrics instrumentation.
pub mod metrics;

/// Upstream metals-price API adapters.
pub mod providers;

/// OpenTelemetry tracing integration.
pub mod telemetry;
