//! # Tracing Module
//!
//! Environment-aware console logging using the tracing ecosystem.
//!
//! This module provides:
//! - One-time subscriber initialisation (a second call is a no-op)
//! - Environment-based log level configuration (`RUST_LOG` overrides)
//! - Plain or JSON output (`DASHBOARD_LOG_FORMAT=json`)
//! - Domain-specific structured logging macros
//!
//! Every orchestration pass carries a `pass_id` (a UUID) on its spans and
//! events; filtering on it isolates one pass from overlapping ones.

use std::io::IsTerminal;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::ConfigManager;

static TRACING_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Output format of the console layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn from_env() -> Self {
        match std::env::var("DASHBOARD_LOG_FORMAT") {
            Ok(value) if value.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Initialize console logging for the current environment.
///
/// Safe to call from tests and embedding applications: the subscriber is
/// installed at most once, and an already-installed global subscriber is
/// left alone.
pub fn init_tracing() {
    TRACING_INITIALIZED.get_or_init(|| {
        let environment = ConfigManager::detect_environment();
        let log_level = get_log_level(&environment);
        let format = LogFormat::from_env();
        let use_ansi = IsTerminal::is_terminal(&std::io::stdout());

        let console_layer = match format {
            LogFormat::Json => fmt::layer()
                .json()
                .with_target(true)
                .with_current_span(true)
                .with_filter(EnvFilter::new(&log_level))
                .boxed(),
            LogFormat::Pretty => fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(use_ansi)
                .with_filter(EnvFilter::new(&log_level))
                .boxed(),
        };

        let subscriber = tracing_subscriber::registry().with(console_layer);

        if subscriber.try_init().is_err() {
            tracing::debug!(
                "Global tracing subscriber already initialized - continuing with existing subscriber"
            );
        } else {
            tracing::info!(
                environment = %environment,
                log_level = %log_level,
                format = ?format,
                ansi_colors = use_ansi,
                "Console logging initialized"
            );
        }
    });
}

/// `RUST_LOG` if set, otherwise the default for `environment`
fn get_log_level(environment: &str) -> String {
    std::env::var("RUST_LOG")
        .map(|level| level.to_lowercase())
        .unwrap_or_else(|_| default_log_level(environment).to_string())
}

fn default_log_level(environment: &str) -> &'static str {
    match environment {
        "production" => "info",
        _ => "debug",
    }
}

/// Log orchestration pass lifecycle events
#[macro_export]
macro_rules! log_pass {
    // Full form with pass_id and parameter key
    ($level:ident, $operation:expr, pass_id: $pass_id:expr, parameter_key: $key:expr, $($field:ident: $value:expr),* $(,)?) => {
        tracing::$level!(
            operation = %$operation,
            pass_id = %$pass_id,
            parameter_key = %$key,
            $($field = ?$value,)*
            timestamp = %chrono::Utc::now().to_rfc3339(),
            "{}", $operation
        );
    };
    // Simple form - just operation
    ($level:ident, $operation:expr $(,)?) => {
        tracing::$level!(
            operation = %$operation,
            timestamp = %chrono::Utc::now().to_rfc3339(),
            "{}", $operation
        );
    };
    // Generic form with additional fields
    ($level:ident, $operation:expr, $($field:ident: $value:expr),+ $(,)?) => {
        tracing::$level!(
            operation = %$operation,
            $($field = ?$value,)*
            timestamp = %chrono::Utc::now().to_rfc3339(),
            "{}", $operation
        );
    };
}

/// Log per-widget events
#[macro_export]
macro_rules! log_widget {
    // Full form with selection id and endpoint
    ($level:ident, $operation:expr, selection_id: $id:expr, endpoint: $endpoint:expr, $($field:ident: $value:expr),* $(,)?) => {
        tracing::$level!(
            operation = %$operation,
            selection_id = %$id,
            endpoint = %$endpoint,
            $($field = ?$value,)*
            timestamp = %chrono::Utc::now().to_rfc3339(),
            "{}", $operation
        );
    };
    ($level:ident, $operation:expr $(,)?) => {
        tracing::$level!(
            operation = %$operation,
            timestamp = %chrono::Utc::now().to_rfc3339(),
            "{}", $operation
        );
    };
}

/// Log configuration operations
#[macro_export]
macro_rules! log_config {
    ($level:ident, $operation:expr $(,)?) => {
        tracing::$level!(
            operation = %$operation,
            timestamp = %chrono::Utc::now().to_rfc3339(),
            "{}", $operation
        );
    };
    ($level:ident, $operation:expr, $($key:ident: $value:expr),+ $(,)?) => {
        tracing::$level!(
            operation = %$operation,
            $($key = ?$value,)*
            timestamp = %chrono::Utc::now().to_rfc3339(),
            "{}", $operation
        );
    };
}
