//! Service Configuration Settings
//!
//! Configuration types for the gold price service, loaded from environment
//! variables. No provider key is compiled in; a missing key only disables
//! the primary source.

use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;

use crate::application::services::DEFAULT_UPSTREAM_TIMEOUT;
use crate::domain::quote::FallbackQuote;
use crate::domain::refresh::{DEFAULT_API_PLAN, DEFAULT_REFRESH_INTERVAL_SECS, RefreshPolicy};

/// Default free (secondary) price endpoint.
pub const DEFAULT_FREE_API_URL: &str = "https://data-asg.goldprice.org/dbXRates/USD";

/// Default public URL advertised in the sitemap and robots.txt.
pub const DEFAULT_PUBLIC_BASE_URL: &str = "https://gold-calculator-api-production.up.railway.app";

/// Premium upstream provider for the primary source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrimaryProvider {
    /// metals.dev, reports USD per ounce.
    #[default]
    MetalsDev,
    /// metals-api.com, reports an XAU-per-USD rate.
    MetalsApi,
}

impl PrimaryProvider {
    /// Parse provider name, case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for unknown names.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s.trim().to_lowercase().as_str() {
            "metals-dev" | "metals.dev" | "metalsdev" => Ok(Self::MetalsDev),
            "metals-api" | "metalsapi" => Ok(Self::MetalsApi),
            other => Err(ConfigError::InvalidValue {
                key: "GOLD_API_PROVIDER".to_string(),
                value: other.to_string(),
            }),
        }
    }

    /// Provider name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MetalsDev => "metals-dev",
            Self::MetalsApi => "metals-api",
        }
    }

    /// Default API base URL.
    #[must_use]
    pub const fn default_base_url(&self) -> &'static str {
        match self {
            Self::MetalsDev => "https://api.metals.dev",
            Self::MetalsApi => "https://metals-api.com",
        }
    }
}

/// Upstream API key.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a key.
    #[must_use]
    pub const fn new(key: String) -> Self {
        Self(key)
    }

    /// Get the key.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey([REDACTED])")
    }
}

/// Primary (keyed) price source settings.
#[derive(Debug, Clone)]
pub struct PrimarySourceSettings {
    /// Which provider to call.
    pub provider: PrimaryProvider,
    /// Provider API key.
    pub api_key: ApiKey,
    /// Provider base URL.
    pub base_url: String,
    /// Whether quotes from this source are labeled premium.
    pub premium: bool,
}

/// Free (secondary) price source settings.
#[derive(Debug, Clone)]
pub struct FreeSourceSettings {
    /// Whether the free source is part of the chain.
    pub enabled: bool,
    /// Endpoint URL.
    pub url: String,
}

impl Default for FreeSourceSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            url: DEFAULT_FREE_API_URL.to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// Listen port.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { port: 5000 }
    }
}

/// Public site settings for the HTML/XML pages.
#[derive(Debug, Clone)]
pub struct SiteSettings {
    /// Base URL used in sitemap and robots.txt, without trailing slash.
    pub public_base_url: String,
    /// `max-age` for the SEO snapshot page.
    pub seo_cache_max_age: Duration,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            public_base_url: DEFAULT_PUBLIC_BASE_URL.to_string(),
            seo_cache_max_age: Duration::from_secs(300),
        }
    }
}

/// Complete service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Server settings.
    pub server: ServerSettings,
    /// Primary source, absent when no key is configured.
    pub primary: Option<PrimarySourceSettings>,
    /// Free secondary source.
    pub free: FreeSourceSettings,
    /// Per-attempt upstream timeout.
    pub upstream_timeout: Duration,
    /// Polling hint advertised to clients.
    pub refresh: RefreshPolicy,
    /// Quote served when every upstream fails.
    pub fallback: FallbackQuote,
    /// Public page settings.
    pub site: SiteSettings,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            primary: None,
            free: FreeSourceSettings::default(),
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
            refresh: RefreshPolicy::default(),
            fallback: FallbackQuote::default(),
            site: SiteSettings::default(),
        }
    }
}

impl ServiceConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a value that has no safe default is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for an unknown provider name or
    /// a zero refresh interval or timeout.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvReader { lookup };
        let defaults = Self::default();

        let server = ServerSettings {
            port: env.parse_or("PORT", defaults.server.port),
        };

        let provider = match env.non_empty("GOLD_API_PROVIDER") {
            Some(name) => PrimaryProvider::parse(&name)?,
            None => PrimaryProvider::default(),
        };
        let primary = env
            .non_empty("GOLD_API_KEY")
            .map(|key| PrimarySourceSettings {
                provider,
                api_key: ApiKey::new(key),
                base_url: env
                    .non_empty("GOLD_API_BASE_URL")
                    .unwrap_or_else(|| provider.default_base_url().to_string()),
                premium: env.bool_or("GOLD_API_PREMIUM", true),
            });

        let free = FreeSourceSettings {
            enabled: env.bool_or("FREE_GOLD_API_ENABLED", defaults.free.enabled),
            url: env
                .non_empty("FREE_GOLD_API_URL")
                .unwrap_or(defaults.free.url),
        };

        let timeout_secs = env.parse_or(
            "UPSTREAM_TIMEOUT_SECS",
            defaults.upstream_timeout.as_secs(),
        );
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "UPSTREAM_TIMEOUT_SECS".to_string(),
                value: "0".to_string(),
            });
        }

        let refresh_secs = env.parse_or("REFRESH_INTERVAL_SECS", DEFAULT_REFRESH_INTERVAL_SECS);
        let api_plan = env
            .non_empty("API_PLAN")
            .unwrap_or_else(|| DEFAULT_API_PLAN.to_string());
        let refresh =
            RefreshPolicy::new(refresh_secs, api_plan).map_err(|_| ConfigError::InvalidValue {
                key: "REFRESH_INTERVAL_SECS".to_string(),
                value: refresh_secs.to_string(),
            })?;

        let fallback = FallbackQuote::new(
            env.positive_decimal_or(
                "FALLBACK_SPOT_PRICE",
                defaults.fallback.spot_price_per_ounce(),
            ),
            env.positive_decimal_or("FALLBACK_GRAM_PRICE", defaults.fallback.price_per_gram()),
        );

        let site = SiteSettings {
            public_base_url: env
                .non_empty("PUBLIC_BASE_URL")
                .map_or(defaults.site.public_base_url, |url| {
                    url.trim_end_matches('/').to_string()
                }),
            seo_cache_max_age: env
                .parse::<u64>("SEO_CACHE_MAX_AGE_SECS")
                .map_or(defaults.site.seo_cache_max_age, Duration::from_secs),
        };

        Ok(Self {
            server,
            primary,
            free,
            upstream_timeout: Duration::from_secs(timeout_secs),
            refresh,
            fallback,
            site,
        })
    }

    /// Whether a primary API key is configured.
    #[must_use]
    pub const fn has_api_key(&self) -> bool {
        self.primary.is_some()
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Environment variable holds a value that cannot be used.
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue {
        /// Variable name.
        key: String,
        /// Offending value.
        value: String,
    },
}

struct EnvReader<F> {
    lookup: F,
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn non_empty(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse<T: FromStr>(&self, key: &str) -> Option<T> {
        self.non_empty(key).and_then(|v| v.parse().ok())
    }

    fn parse_or<T: FromStr>(&self, key: &str, default: T) -> T {
        self.parse(key).unwrap_or(default)
    }

    fn bool_or(&self, key: &str, default: bool) -> bool {
        self.non_empty(key)
            .map_or(default, |v| match v.to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => true,
                "false" | "0" | "no" | "off" => false,
                _ => default,
            })
    }

    fn positive_decimal_or(&self, key: &str, default: Decimal) -> Decimal {
        self.parse::<Decimal>(key)
            .filter(|v| *v > Decimal::ZERO)
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<ServiceConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ServiceConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.server.port, 5000);
        assert!(config.primary.is_none());
        assert!(!config.has_api_key());
        assert!(config.free.enabled);
        assert_eq!(config.free.url, DEFAULT_FREE_API_URL);
        assert_eq!(config.upstream_timeout, Duration::from_secs(10));
        assert_eq!(config.refresh.interval_seconds(), 60);
        assert_eq!(config.refresh.api_plan(), "railway");
        assert_eq!(config.fallback, FallbackQuote::default());
        assert_eq!(config.site.public_base_url, DEFAULT_PUBLIC_BASE_URL);
        assert_eq!(config.site.seo_cache_max_age, Duration::from_secs(300));
    }

    #[test]
    fn primary_configured_from_key() {
        let config = config_from(&[
            ("GOLD_API_KEY", "abc123"),
            ("GOLD_API_PROVIDER", "METALS-API"),
            ("GOLD_API_PREMIUM", "false"),
        ])
        .unwrap();

        let primary = config.primary.unwrap();
        assert_eq!(primary.provider, PrimaryProvider::MetalsApi);
        assert_eq!(primary.api_key.expose(), "abc123");
        assert_eq!(primary.base_url, "https://metals-api.com");
        assert!(!primary.premium);
    }

    #[test]
    fn empty_key_disables_primary() {
        let config = config_from(&[("GOLD_API_KEY", "   ")]).unwrap();
        assert!(config.primary.is_none());
    }

    #[test]
    fn unknown_provider_rejected() {
        let err = config_from(&[("GOLD_API_PROVIDER", "kitco")]).unwrap_err();
        assert!(err.to_string().contains("GOLD_API_PROVIDER"));
    }

    #[test]
    fn zero_intervals_rejected() {
        assert!(config_from(&[("REFRESH_INTERVAL_SECS", "0")]).is_err());
        assert!(config_from(&[("UPSTREAM_TIMEOUT_SECS", "0")]).is_err());
    }

    #[test]
    fn unparseable_values_use_defaults() {
        let config = config_from(&[
            ("PORT", "not-a-port"),
            ("REFRESH_INTERVAL_SECS", "soon"),
            ("FALLBACK_SPOT_PRICE", "-5"),
            ("FREE_GOLD_API_ENABLED", "maybe"),
        ])
        .unwrap();

        assert_eq!(config.server.port, 5000);
        assert_eq!(config.refresh.interval_seconds(), 60);
        assert_eq!(config.fallback.spot_price_per_ounce(), Decimal::new(265_000, 2));
        assert!(config.free.enabled);
    }

    #[test]
    fn overrides_applied() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("REFRESH_INTERVAL_SECS", "600"),
            ("API_PLAN", "free"),
            ("FALLBACK_SPOT_PRICE", "2400.5"),
            ("FALLBACK_GRAM_PRICE", "77.18"),
            ("FREE_GOLD_API_ENABLED", "off"),
            ("PUBLIC_BASE_URL", "https://gold.example.com/"),
            ("SEO_CACHE_MAX_AGE_SECS", "3600"),
        ])
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.refresh.interval_minutes(), 10);
        assert_eq!(config.refresh.api_plan(), "free");
        assert_eq!(config.fallback.spot_price_per_ounce(), Decimal::new(240_050, 2));
        assert_eq!(config.fallback.price_per_gram(), Decimal::new(7718, 2));
        assert!(!config.free.enabled);
        assert_eq!(config.site.public_base_url, "https://gold.example.com");
        assert_eq!(config.site.seo_cache_max_age, Duration::from_secs(3600));
    }

    #[test]
    fn provider_parsing() {
        assert_eq!(PrimaryProvider::parse("metals-dev").unwrap(), PrimaryProvider::MetalsDev);
        assert_eq!(PrimaryProvider::parse("Metals.Dev").unwrap(), PrimaryProvider::MetalsDev);
        assert_eq!(PrimaryProvider::parse("metalsapi").unwrap(), PrimaryProvider::MetalsApi);
        assert_eq!(PrimaryProvider::MetalsDev.as_str(), "metals-dev");
    }

    #[test]
    fn api_key_redacted_debug() {
        let config = config_from(&[("GOLD_API_KEY", "secret456")]).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret456"));
        assert!(debug.contains("[REDACTED]"));
    }
}
