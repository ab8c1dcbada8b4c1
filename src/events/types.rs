//! # Notification Types
//!
//! User-facing messages produced by the orchestration core. The rendering
//! layer decides how to show them (toasts, banners); the core only decides
//! *when* one is due.

use crate::constants::{events, messages};
use crate::orchestration::types::ModuleTag;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    /// First failure of a (module, endpoint) for a parameter key
    WidgetFetchFailed {
        module: ModuleTag,
        endpoint: String,
        parameter_key: String,
        title: String,
        message: String,
    },
    /// A pass failed outside of any single fetch
    PassFailed { pass_id: Uuid, message: String },
    /// A selection change or filter apply was rejected before any pass started
    ValidationFailed { message: String },
    /// A pass that issued network calls finished
    PassCompleted {
        pass_id: Uuid,
        fetched: usize,
        cached: usize,
        suppressed: usize,
        failed: usize,
    },
}

impl Notification {
    /// Stable event name, usable as a routing key
    pub fn name(&self) -> &'static str {
        match self {
            Notification::WidgetFetchFailed { .. } => events::WIDGET_FETCH_FAILED,
            Notification::PassFailed { .. } => events::PASS_FAILED,
            Notification::ValidationFailed { .. } => events::VALIDATION_FAILED,
            Notification::PassCompleted { .. } => events::PASS_COMPLETED,
        }
    }

    /// Headline shown to the user
    pub fn message(&self) -> String {
        match self {
            Notification::WidgetFetchFailed { title, .. } => {
                format!("{} {title}", messages::WIDGET_FAILED_PREFIX)
            }
            Notification::PassFailed { .. } => messages::PASS_FAILED.to_string(),
            Notification::ValidationFailed { message } => message.clone(),
            Notification::PassCompleted { .. } => messages::PASS_SUCCEEDED.to_string(),
        }
    }

    /// Underlying error text, if the notification reports a failure
    pub fn detail(&self) -> Option<&str> {
        match self {
            Notification::WidgetFetchFailed { message, .. }
            | Notification::PassFailed { message, .. }
            | Notification::ValidationFailed { message } => Some(message),
            Notification::PassCompleted { .. } => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        !matches!(self, Notification::PassCompleted { .. })
    }
}
