//! Configuration Module
//!
//! Configuration loading for the gold price service.

mod settings;

pub use settings::{
    ApiKey, ConfigError, DEFAULT_FREE_API_URL, DEFAULT_PUBLIC_BASE_URL, FreeSourceSettings,
    PrimaryProvider, PrimarySourceSettings, ServerSettings, ServiceConfig, SiteSettings,
};
