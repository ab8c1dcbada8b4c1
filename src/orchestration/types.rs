//! # Orchestration Types
//!
//! Core types shared by every component of an orchestration pass: widget
//! identity, classification tags, settlements and the view-model handed to
//! the rendering layer.

use crate::error::FetchError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque widget payload as returned by a fetch function
pub type WidgetData = serde_json::Value;

/// Logical grouping of related endpoints (e.g. `tickets`, `tasks`, `amc`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleTag(String);

impl ModuleTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModuleTag {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl From<String> for ModuleTag {
    fn from(tag: String) -> Self {
        Self(tag)
    }
}

/// A (module, endpoint) pair: the unit of caching, loading and dispatch
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EndpointKey {
    pub module: ModuleTag,
    pub endpoint: String,
}

impl EndpointKey {
    pub fn new(module: impl Into<ModuleTag>, endpoint: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            endpoint: endpoint.into(),
        }
    }
}

impl From<(&str, &str)> for EndpointKey {
    fn from((module, endpoint): (&str, &str)) -> Self {
        EndpointKey::new(module, endpoint)
    }
}

impl fmt::Display for EndpointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.endpoint)
    }
}

/// Identifier of one widget instance on the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionId(String);

impl SelectionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SelectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SelectionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// One active widget bound to a (module, endpoint) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub id: SelectionId,
    pub module: ModuleTag,
    pub endpoint: String,
    pub title: String,
}

impl Selection {
    pub fn new(
        id: impl Into<String>,
        module: impl Into<ModuleTag>,
        endpoint: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: SelectionId::new(id),
            module: module.into(),
            endpoint: endpoint.into(),
            title: title.into(),
        }
    }

    pub fn endpoint_key(&self) -> EndpointKey {
        EndpointKey::new(self.module.clone(), self.endpoint.clone())
    }
}

/// Per-pass classification tag of a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FetchClassification {
    /// Fresh data already cached for the current key
    Cached,
    /// Last attempt for the current key failed; do not retry
    Suppressed,
    /// Issue a network call
    Fetch,
}

impl fmt::Display for FetchClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            FetchClassification::Cached => "cached",
            FetchClassification::Suppressed => "suppressed",
            FetchClassification::Fetch => "fetch",
        };
        f.write_str(tag)
    }
}

/// Outcome of one real fetch, correlated to its plan entry by id
#[derive(Debug, Clone)]
pub struct Settlement {
    pub correlation_id: Uuid,
    pub outcome: SettlementOutcome,
}

#[derive(Debug, Clone)]
pub enum SettlementOutcome {
    Fulfilled(WidgetData),
    Rejected(FetchError),
}

impl Settlement {
    pub fn fulfilled(correlation_id: Uuid, data: WidgetData) -> Self {
        Self {
            correlation_id,
            outcome: SettlementOutcome::Fulfilled(data),
        }
    }

    pub fn rejected(correlation_id: Uuid, error: FetchError) -> Self {
        Self {
            correlation_id,
            outcome: SettlementOutcome::Rejected(error),
        }
    }

    pub fn is_fulfilled(&self) -> bool {
        matches!(self.outcome, SettlementOutcome::Fulfilled(_))
    }
}

/// What the rendering layer sees for one widget
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WidgetView {
    pub data: Option<WidgetData>,
    pub error: Option<String>,
    pub loading: bool,
}

impl WidgetView {
    pub fn with_data(data: WidgetData) -> Self {
        Self {
            data: Some(data),
            error: None,
            loading: false,
        }
    }

    pub fn with_error(error: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(error.into()),
            loading: false,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Counters describing one finished orchestration pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassSummary {
    pub pass_id: Uuid,
    pub parameter_key: String,
    pub cached: usize,
    pub suppressed: usize,
    pub fetched: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// The filter state changed while this pass was in flight
    pub stale: bool,
    pub duration_ms: u64,
}

impl PassSummary {
    pub fn empty(pass_id: Uuid, parameter_key: String) -> Self {
        Self {
            pass_id,
            parameter_key,
            cached: 0,
            suppressed: 0,
            fetched: 0,
            succeeded: 0,
            failed: 0,
            stale: false,
            duration_ms: 0,
        }
    }

    /// True when the pass issued at least one network call
    pub fn had_real_calls(&self) -> bool {
        self.fetched > 0
    }
}
