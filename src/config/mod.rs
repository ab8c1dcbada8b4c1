//! # Dashboard Configuration
//!
//! Typed configuration for the orchestration core, loaded in layers:
//!
//! 1. built-in defaults
//! 2. `dashboard.toml` in the configuration directory (optional)
//! 3. `dashboard.{environment}.toml` (optional)
//! 4. environment variables prefixed `DASHBOARD__`, nested with `__`
//!    (e.g. `DASHBOARD__DISPATCH__MAX_CONCURRENT_FETCHES=4`)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dashboard_core::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let cap = manager.config().dispatch.max_concurrent_fetches;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use crate::constants::system;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::Semaphore;

/// Largest broadcast capacity tokio accepts
const MAX_CHANNEL_CAPACITY: usize = usize::MAX / 2;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Fan-out limits for network calls
    pub dispatch: DispatchConfig,

    /// Notification channel settings
    pub notifications: NotificationConfig,

    /// Initial filter state
    pub filters: FilterConfig,

    /// Handling of passes that settle after the filters changed
    pub reconciliation: ReconciliationConfig,
}

impl DashboardConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.dispatch.max_concurrent_fetches == 0 {
            return Err(ConfigurationError::invalid_value(
                "dispatch.max_concurrent_fetches",
                "0",
                "at least one fetch must be allowed in flight",
            ));
        }

        if self.dispatch.max_concurrent_fetches > Semaphore::MAX_PERMITS {
            return Err(ConfigurationError::invalid_value(
                "dispatch.max_concurrent_fetches",
                self.dispatch.max_concurrent_fetches.to_string(),
                format!("must not exceed {}", Semaphore::MAX_PERMITS),
            ));
        }

        if self.dispatch.fetch_timeout_ms == Some(0) {
            return Err(ConfigurationError::invalid_value(
                "dispatch.fetch_timeout_ms",
                "0",
                "omit the field to disable the timeout",
            ));
        }

        if self.notifications.channel_capacity == 0 {
            return Err(ConfigurationError::invalid_value(
                "notifications.channel_capacity",
                "0",
                "channel capacity must be greater than 0",
            ));
        }

        if self.notifications.channel_capacity > MAX_CHANNEL_CAPACITY {
            return Err(ConfigurationError::invalid_value(
                "notifications.channel_capacity",
                self.notifications.channel_capacity.to_string(),
                format!("must not exceed {MAX_CHANNEL_CAPACITY}"),
            ));
        }

        if self.filters.default_lookback_days <= 0 {
            return Err(ConfigurationError::invalid_value(
                "filters.default_lookback_days",
                self.filters.default_lookback_days.to_string(),
                "lookback must be a positive number of days",
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub max_concurrent_fetches: usize,
    /// Per-call timeout; `None` leaves timing to the fetch function
    pub fetch_timeout_ms: Option<u64>,
}

impl DispatchConfig {
    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: system::DEFAULT_MAX_CONCURRENT_FETCHES,
            fetch_timeout_ms: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub channel_capacity: usize,
    /// Publish `PassCompleted` after passes that issued network calls
    pub announce_pass_success: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            channel_capacity: system::DEFAULT_CHANNEL_CAPACITY,
            announce_pass_success: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Length of the initial date range, ending today
    pub default_lookback_days: i64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            default_lookback_days: system::DEFAULT_LOOKBACK_DAYS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReconciliationConfig {
    pub stale_pass_policy: StalePassPolicy,
}

/// What to do with a pass whose key is no longer the latest applied one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StalePassPolicy {
    /// Drop its results: no cache writes, no view updates, no notifications
    #[default]
    Discard,
    /// Reconcile it like a current pass
    Overwrite,
}
