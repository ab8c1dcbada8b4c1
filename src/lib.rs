#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Dashboard Core Rust
//!
//! Fetch orchestration and result caching for a configurable multi-widget
//! analytics dashboard.
//!
//! ## Overview
//!
//! A dashboard holds an arbitrary set of widgets, each bound to a (module,
//! endpoint) pair, plus a filter state (date range and other dimensions).
//! Every time the widget set or the filters change, the core runs one
//! orchestration pass:
//!
//! 1. derive a [`ParameterKey`](orchestration::ParameterKey) from the filters
//! 2. classify each widget: cached for this key, failed for this key, or fetch
//! 3. issue only the real fetches, concurrently, grouped by module
//! 4. record successes and failures under the key and publish view-models
//!
//! Repeating a pass under an unchanged key issues no network calls for
//! widgets that succeeded, and never retries widgets that failed.
//!
//! ## Module Organization
//!
//! - [`orchestration`] - Planner, executor, reconciler and the coordinator
//! - [`registry`] - Fetch-function registration table
//! - [`events`] - User-facing notifications
//! - [`config`] - Layered configuration
//! - [`error`] - Structured error handling
//! - [`logging`] - Tracing initialisation and logging macros
//! - [`validation`] - Checks on inbound selection and filter events
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dashboard_core::orchestration::{DashboardCoordinator, Selection};
//! use dashboard_core::registry::FetcherRegistry;
//! use dashboard_core::FetchError;
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = FetcherRegistry::new();
//! registry.register_fn("tickets", "ticket_status", |_filters| async move {
//!     Ok::<_, FetchError>(json!({"open": 5, "closed": 2}))
//! })?;
//!
//! let dashboard = DashboardCoordinator::new(registry);
//! let summary = dashboard
//!     .replace_selections(vec![Selection::new("w1", "tickets", "ticket_status", "Ticket Status")])
//!     .await?;
//! println!("fetched {} widgets", summary.fetched);
//!
//! let view = dashboard.view_model(&"w1".into());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod logging;
pub mod orchestration;
pub mod registry;
pub mod validation;

pub use config::{ConfigManager, DashboardConfig, StalePassPolicy};
pub use error::{DashboardError, DashboardResult, FetchError};
pub use events::{Notification, NotificationPublisher};
pub use orchestration::{
    DashboardCoordinator, FilterState, ParameterKey, PassSummary, Selection, SelectionId,
    WidgetView,
};
pub use registry::{FetcherRegistry, WidgetFetcher};
