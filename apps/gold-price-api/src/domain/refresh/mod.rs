//! Refresh Policy
//!
//! How often clients are told to re-poll the price endpoints. The service
//! is pull-based; this value is only advertised, never used as a timer.

use std::time::Duration;

/// Default polling hint in seconds.
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 60;

/// Default plan label advertised to clients.
pub const DEFAULT_API_PLAN: &str = "railway";

/// Refresh interval advertised to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshPolicy {
    interval_seconds: u64,
    api_plan: String,
}

impl RefreshPolicy {
    /// Create a refresh policy.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRefreshInterval` if `interval_seconds` is zero.
    pub fn new(
        interval_seconds: u64,
        api_plan: impl Into<String>,
    ) -> Result<Self, InvalidRefreshInterval> {
        if interval_seconds == 0 {
            return Err(InvalidRefreshInterval);
        }
        Ok(Self {
            interval_seconds,
            api_plan: api_plan.into(),
        })
    }

    /// Interval in seconds.
    #[must_use]
    pub const fn interval_seconds(&self) -> u64 {
        self.interval_seconds
    }

    /// Interval in milliseconds.
    #[must_use]
    pub const fn interval_millis(&self) -> u64 {
        self.interval_seconds.saturating_mul(1000)
    }

    /// Interval in whole minutes, rounded down.
    #[must_use]
    pub const fn interval_minutes(&self) -> u64 {
        self.interval_seconds / 60
    }

    /// Interval as a `Duration`.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    /// Plan label (e.g. "railway").
    #[must_use]
    pub fn api_plan(&self) -> &str {
        &self.api_plan
    }

    /// Human description, e.g. "60 seconds" or "10 minutes".
    ///
    /// Intervals up to a minute, or not a whole number of minutes, are
    /// given in seconds.
    #[must_use]
    pub fn describe(&self) -> String {
        let secs = self.interval_seconds;
        if secs > 60 && secs % 60 == 0 {
            format!("{} minutes", secs / 60)
        } else if secs == 1 {
            "1 second".to_string()
        } else {
            format!("{secs} seconds")
        }
    }

    /// Update frequency phrase, e.g. "Every 60 seconds".
    #[must_use]
    pub fn update_frequency(&self) -> String {
        format!("Every {}", self.describe())
    }
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            interval_seconds: DEFAULT_REFRESH_INTERVAL_SECS,
            api_plan: DEFAULT_API_PLAN.to_string(),
        }
    }
}

/// A zero refresh interval was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("refresh interval must be at least one second")]
pub struct InvalidRefreshInterval;
