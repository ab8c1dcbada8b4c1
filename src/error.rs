//! Error types for the dashboard core.
//!
//! [`DashboardError`] covers everything that can go wrong around an
//! orchestration pass. Failures of individual fetch functions are *not*
//! `DashboardError`s: they are [`FetchError`]s, recorded per widget and never
//! fatal to a pass.

use crate::orchestration::types::EndpointKey;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DashboardError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    #[error("Registry error: {0}")]
    RegistryError(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<crate::config::ConfigurationError> for DashboardError {
    fn from(error: crate::config::ConfigurationError) -> Self {
        DashboardError::ConfigurationError(error.to_string())
    }
}

pub type DashboardResult<T> = anyhow::Result<T, DashboardError>;

/// Outcome of a single fetch function that did not produce data.
///
/// The `Display` text is what ends up in the widget's view-model and in the
/// failure notification, so variants render as short human-readable strings.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// Backend answered with a non-success status
    #[error("HTTP {status}")]
    Http { status: u16 },

    /// Free-form failure reported by the fetch function
    #[error("{0}")]
    Message(String),

    /// No fetch function is registered for the widget's module/endpoint
    #[error("No fetcher registered for {0}")]
    Unregistered(EndpointKey),

    /// The call exceeded the configured per-fetch timeout
    #[error("Request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The task running the fetch ended without producing a settlement
    #[error("No result returned from API")]
    TaskFailed(String),
}

impl FetchError {
    pub fn message(msg: impl Into<String>) -> Self {
        FetchError::Message(msg.into())
    }

    pub fn http(status: u16) -> Self {
        FetchError::Http { status }
    }

    /// Human readable text for view-models; never empty.
    pub fn display_message(&self) -> String {
        let text = self.to_string();
        if text.trim().is_empty() {
            crate::constants::messages::REQUEST_FAILED.to_string()
        } else {
            text
        }
    }
}
