//! # Orchestration Engine
//!
//! Fetch orchestration and result caching for a multi-widget dashboard.
//!
//! ## Core Components
//!
//! - **ParameterKey**: deterministic key derived from the active filters
//! - **SelectionRegistry**: ordered set of widgets on the dashboard
//! - **ResultCache**: last success and last failure per (module, endpoint)
//! - **LoadingTracker**: per-endpoint loading flags, owned by the pass that set them
//! - **FetchPlanner**: classifies each selection as cached, suppressed or fetch
//! - **DispatchExecutor**: concurrent, settle-all fan-out of the real fetches
//! - **Reconciler**: writes settlements back and builds view-models
//! - **DashboardCoordinator**: owns the state and runs passes end to end
//!
//! A key that already succeeded is never fetched again, and a key that
//! already failed is never retried; changing the filters changes the key,
//! which is the only way either decision is revisited.

pub mod dashboard_coordinator;
pub mod dispatch_executor;
pub mod fetch_planner;
pub mod loading_tracker;
pub mod parameter_key;
pub mod reconciler;
pub mod result_cache;
pub mod selection_registry;
pub mod types;

// Re-export core types and components for easy access
pub use dashboard_coordinator::DashboardCoordinator;
pub use dispatch_executor::DispatchExecutor;
pub use fetch_planner::{
    FetchPlan, FetchPlanner, FetchRequest, ModuleBatch, PlanAction, PlanCounts, PlannedSelection,
};
pub use loading_tracker::LoadingTracker;
pub use parameter_key::{FilterState, ParameterKey};
pub use reconciler::{ReconcileOutcome, Reconciler};
pub use result_cache::{CacheEntry, CacheStats, ResultCache};
pub use selection_registry::SelectionRegistry;
pub use types::{
    EndpointKey, FetchClassification, ModuleTag, PassSummary, Selection, SelectionId, Settlement,
    SettlementOutcome, WidgetData, WidgetView,
};
