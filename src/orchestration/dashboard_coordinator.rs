//! # Dashboard Coordinator
//!
//! Owns the dashboard state and runs orchestration passes. It is the only
//! surface the rendering layer talks to:
//!
//! - inbound: [`replace_selections`](DashboardCoordinator::replace_selections),
//!   [`apply_filters`](DashboardCoordinator::apply_filters),
//!   [`refresh`](DashboardCoordinator::refresh)
//! - outbound: [`view_model`](DashboardCoordinator::view_model) and the
//!   notification stream from [`subscribe`](DashboardCoordinator::subscribe)
//!
//! ## Pass lifecycle
//!
//! ```text
//! lock ─ apply update ─ build key ─ plan (marks loading) ─ unlock
//!        │
//!        └─ dispatch (concurrent, no lock held)
//!                │
//! lock ─ reconcile (cache writes, clears loading) ─ install views ─ unlock
//!        │
//!        └─ publish notifications
//! ```
//!
//! The start and the end of a pass are each a single critical section over
//! one mutex, so two overlapping passes never interleave partial writes. The
//! lock is never held across an await point.
//!
//! A [`LoadingGuard`] clears whatever flags the pass still owns when it ends,
//! including when reconciliation fails or the pass future is dropped.

use crate::config::DashboardConfig;
use crate::error::{DashboardError, DashboardResult};
use crate::events::{Notification, NotificationPublisher, PublishedNotification};
use crate::orchestration::dispatch_executor::DispatchExecutor;
use crate::orchestration::fetch_planner::{FetchPlan, FetchPlanner};
use crate::orchestration::loading_tracker::LoadingTracker;
use crate::orchestration::parameter_key::{FilterState, ParameterKey};
use crate::orchestration::reconciler::{ReconcileOutcome, Reconciler};
use crate::orchestration::result_cache::{CacheStats, ResultCache};
use crate::orchestration::selection_registry::SelectionRegistry;
use crate::orchestration::types::{
    ModuleTag, PassSummary, Selection, SelectionId, Settlement, WidgetView,
};
use crate::registry::FetcherRegistry;
use crate::validation::validate_filters;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::broadcast;
use tracing::{debug, error, instrument, warn};
use uuid::Uuid;

/// Everything a pass reads or writes, behind one lock
#[derive(Debug)]
struct DashboardState {
    selections: SelectionRegistry,
    filters: FilterState,
    /// Key of the most recently started pass
    latest_key: ParameterKey,
    cache: ResultCache,
    loading: LoadingTracker,
    views: HashMap<SelectionId, WidgetView>,
}

struct CoordinatorInner {
    state: Mutex<DashboardState>,
    planner: FetchPlanner,
    executor: DispatchExecutor,
    reconciler: Reconciler,
    publisher: NotificationPublisher,
    config: DashboardConfig,
}

/// Cloneable handle to one dashboard's orchestration state
#[derive(Clone)]
pub struct DashboardCoordinator {
    inner: Arc<CoordinatorInner>,
}

impl std::fmt::Debug for DashboardCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardCoordinator")
            .field("registry", self.inner.executor.registry())
            .field("config", &self.inner.config)
            .finish()
    }
}

/// State change a pass applies before planning
enum PassTrigger {
    Selections(Vec<Selection>),
    Filters(FilterState),
    Refresh,
}

/// Clears the loading flags a pass still owns when dropped
struct LoadingGuard<'a> {
    state: &'a Mutex<DashboardState>,
    pass_id: Uuid,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let cleared = self.state.lock().loading.clear_pass(self.pass_id);
        if cleared > 0 {
            warn!(
                pass_id = %self.pass_id,
                cleared,
                "Cleared loading flags left behind by an unfinished pass"
            );
        }
    }
}

impl DashboardCoordinator {
    /// Coordinator with default configuration
    pub fn new(registry: FetcherRegistry) -> Self {
        let config = DashboardConfig::default();
        let filters = default_filters(&config);
        Self::build(registry, config, filters)
    }

    /// Coordinator starting from the configured default date range
    pub fn with_config(registry: FetcherRegistry, config: DashboardConfig) -> DashboardResult<Self> {
        config.validate()?;
        let filters = default_filters(&config);
        Ok(Self::build(registry, config, filters))
    }

    /// Coordinator starting from explicit filters
    pub fn with_filters(
        registry: FetcherRegistry,
        config: DashboardConfig,
        filters: FilterState,
    ) -> DashboardResult<Self> {
        config.validate()?;
        validate_filters(&filters)?;
        Ok(Self::build(registry, config, filters))
    }

    fn build(registry: FetcherRegistry, config: DashboardConfig, filters: FilterState) -> Self {
        let latest_key = ParameterKey::build(&filters);
        let state = DashboardState {
            selections: SelectionRegistry::new(),
            filters,
            latest_key,
            cache: ResultCache::new(),
            loading: LoadingTracker::new(),
            views: HashMap::new(),
        };

        Self {
            inner: Arc::new(CoordinatorInner {
                state: Mutex::new(state),
                planner: FetchPlanner::new(),
                executor: DispatchExecutor::with_config(registry, &config.dispatch),
                reconciler: Reconciler::new(config.reconciliation.stale_pass_policy),
                publisher: NotificationPublisher::from_config(&config.notifications),
                config,
            }),
        }
    }

    /// Replace the widget set wholesale and run a pass over it.
    ///
    /// An invalid set is rejected with a `ValidationFailed` notification and
    /// leaves the previous set in place.
    pub async fn replace_selections(
        &self,
        selections: Vec<Selection>,
    ) -> DashboardResult<PassSummary> {
        self.run_pass(PassTrigger::Selections(selections)).await
    }

    /// Apply a new filter state and run a pass under its key.
    ///
    /// A range whose end precedes its start is rejected with a
    /// `ValidationFailed` notification; no pass is started.
    pub async fn apply_filters(&self, filters: FilterState) -> DashboardResult<PassSummary> {
        if let Err(e) = validate_filters(&filters) {
            return Err(self.reject(e));
        }

        self.run_pass(PassTrigger::Filters(filters)).await
    }

    /// Re-run a pass with the current selections and filters
    pub async fn refresh(&self) -> DashboardResult<PassSummary> {
        self.run_pass(PassTrigger::Refresh).await
    }

    fn reject(&self, error: DashboardError) -> DashboardError {
        warn!(error = %error, "Rejected dashboard update");
        self.publish(Notification::ValidationFailed {
            message: error.to_string(),
        });
        error
    }

    #[instrument(skip_all, fields(pass_id = tracing::field::Empty))]
    async fn run_pass(&self, trigger: PassTrigger) -> DashboardResult<PassSummary> {
        let pass_id = Uuid::new_v4();
        tracing::Span::current().record("pass_id", tracing::field::display(pass_id));
        let started = Instant::now();

        let plan = match self.start_pass(pass_id, trigger) {
            Ok(plan) => plan,
            Err(e) => return Err(self.reject(e)),
        };
        let counts = plan.counts();
        crate::log_pass!(debug, "Pass planned",
            pass_id: pass_id,
            parameter_key: plan.key,
            cached: counts.cached,
            suppressed: counts.suppressed,
            fetch: counts.fetch
        );

        let _guard = LoadingGuard {
            state: &self.inner.state,
            pass_id,
        };

        let settlements = if plan.has_fetches() {
            self.inner.executor.dispatch(&plan).await
        } else {
            Vec::new()
        };

        let outcome = match self.finish_pass(&plan, settlements) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(pass_id = %pass_id, error = %e, "Orchestration pass failed");
                self.publish(Notification::PassFailed {
                    pass_id,
                    message: e.to_string(),
                });
                return Err(e);
            }
        };

        let summary = PassSummary {
            pass_id,
            parameter_key: plan.key.to_string(),
            cached: counts.cached,
            suppressed: counts.suppressed,
            fetched: counts.fetch,
            succeeded: outcome.succeeded,
            failed: outcome.failed,
            stale: outcome.stale,
            duration_ms: started.elapsed().as_millis() as u64,
        };

        let announce = self.inner.config.notifications.announce_pass_success
            && summary.had_real_calls()
            && !outcome.discarded;
        self.inner.publisher.publish_all(outcome.notifications);
        if announce {
            self.publish(Notification::PassCompleted {
                pass_id,
                fetched: summary.fetched,
                cached: summary.cached,
                suppressed: summary.suppressed,
                failed: summary.failed,
            });
        }

        crate::log_pass!(info, "Pass completed",
            pass_id: pass_id,
            parameter_key: summary.parameter_key,
            fetched: summary.fetched,
            failed: summary.failed,
            stale: summary.stale,
            duration_ms: summary.duration_ms
        );

        Ok(summary)
    }

    /// Apply the trigger, build the key and plan the pass in one critical
    /// section. A rejected trigger leaves the state untouched.
    fn start_pass(&self, pass_id: Uuid, trigger: PassTrigger) -> DashboardResult<FetchPlan> {
        let mut state = self.inner.state.lock();
        match trigger {
            PassTrigger::Selections(selections) => {
                state.selections.replace(selections)?;
                let DashboardState {
                    selections, views, ..
                } = &mut *state;
                views.retain(|id, _| selections.contains(id));
            }
            PassTrigger::Filters(filters) => state.filters = filters,
            PassTrigger::Refresh => {}
        }

        let key = ParameterKey::build(&state.filters);
        if key != state.latest_key {
            debug!(previous = %state.latest_key, current = %key, "Parameter key changed");
        }
        state.latest_key = key.clone();

        let DashboardState {
            selections,
            filters,
            cache,
            loading,
            ..
        } = &mut *state;
        Ok(self
            .inner
            .planner
            .plan(pass_id, selections.selections(), filters, &key, cache, loading))
    }

    /// Reconcile and install views in one critical section
    fn finish_pass(
        &self,
        plan: &FetchPlan,
        settlements: Vec<Settlement>,
    ) -> DashboardResult<ReconcileOutcome> {
        let mut state = self.inner.state.lock();
        let DashboardState {
            selections,
            latest_key,
            cache,
            loading,
            views,
            ..
        } = &mut *state;

        let outcome = self
            .inner
            .reconciler
            .reconcile(plan, settlements, latest_key, cache, loading)?;

        if !outcome.discarded {
            for (entry, (id, view)) in plan.entries.iter().zip(&outcome.views) {
                // The set may have been replaced while the pass was in flight
                if selections.get(id) == Some(&entry.selection) {
                    views.insert(id.clone(), view.clone());
                }
            }
        }

        Ok(outcome)
    }

    fn publish(&self, notification: Notification) {
        self.inner.publisher.publish(notification);
    }

    /// Current view of one widget, or `None` if it is not on the dashboard.
    ///
    /// While the widget's endpoint is loading, the last successful payload
    /// stays visible with `loading: true`.
    pub fn view_model(&self, id: &SelectionId) -> Option<WidgetView> {
        let state = self.inner.state.lock();
        let selection = state.selections.get(id)?;
        Some(view_for(&state, selection))
    }

    /// Views of every widget in registry order
    pub fn view_models(&self) -> Vec<(SelectionId, WidgetView)> {
        let state = self.inner.state.lock();
        state
            .selections
            .selections()
            .iter()
            .map(|selection| (selection.id.clone(), view_for(&state, selection)))
            .collect()
    }

    pub fn is_loading(&self, id: &SelectionId) -> bool {
        let state = self.inner.state.lock();
        state
            .selections
            .get(id)
            .is_some_and(|selection| state.loading.is_loading(&selection.endpoint_key()))
    }

    /// True while any widget is loading
    pub fn is_busy(&self) -> bool {
        self.inner.state.lock().loading.any_loading()
    }

    pub fn loading_snapshot(&self) -> HashMap<ModuleTag, HashMap<String, bool>> {
        self.inner.state.lock().loading.snapshot()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PublishedNotification> {
        self.inner.publisher.subscribe()
    }

    pub fn current_key(&self) -> ParameterKey {
        ParameterKey::build(&self.inner.state.lock().filters)
    }

    pub fn filters(&self) -> FilterState {
        self.inner.state.lock().filters.clone()
    }

    pub fn selections(&self) -> Vec<Selection> {
        self.inner.state.lock().selections.selections().to_vec()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.inner.state.lock().cache.stats()
    }

    pub fn registry(&self) -> &FetcherRegistry {
        self.inner.executor.registry()
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }
}

fn view_for(state: &DashboardState, selection: &Selection) -> WidgetView {
    let endpoint = selection.endpoint_key();
    if state.loading.is_loading(&endpoint) {
        return WidgetView {
            data: state.cache.last_data(&endpoint).cloned(),
            error: None,
            loading: true,
        };
    }
    state.views.get(&selection.id).cloned().unwrap_or_default()
}

fn default_filters(config: &DashboardConfig) -> FilterState {
    FilterState::default_range(
        chrono::Utc::now().date_naive(),
        config.filters.default_lookback_days,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn january() -> FilterState {
        FilterState::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
    }

    fn coordinator(registry: FetcherRegistry) -> DashboardCoordinator {
        DashboardCoordinator::with_filters(registry, DashboardConfig::default(), january())
            .unwrap()
    }

    #[tokio::test]
    async fn second_pass_is_served_from_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = FetcherRegistry::new();
        let counter = Arc::clone(&calls);
        registry
            .register_fn("tickets", "ticket_status", move |_f: FilterState| {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, FetchError>(json!({"open": 5, "closed": 2})) }
            })
            .unwrap();
        let dashboard = coordinator(registry);

        let first = dashboard
            .replace_selections(vec![Selection::new(
                "w1",
                "tickets",
                "ticket_status",
                "Ticket Status",
            )])
            .await
            .unwrap();
        let second = dashboard.refresh().await.unwrap();

        assert_eq!((first.fetched, first.succeeded), (1, 1));
        assert_eq!((second.fetched, second.cached), (0, 1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            dashboard.view_model(&"w1".into()),
            Some(WidgetView::with_data(json!({"open": 5, "closed": 2})))
        );
    }

    #[tokio::test]
    async fn invalid_range_is_rejected_without_a_pass() {
        let dashboard = coordinator(FetcherRegistry::new());
        let mut notifications = dashboard.subscribe();

        let backwards = FilterState::new(
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        );
        let result = dashboard.apply_filters(backwards).await;

        assert!(matches!(result, Err(DashboardError::ValidationError(_))));
        assert_eq!(dashboard.filters(), january());
        let published = notifications.try_recv().unwrap();
        assert!(matches!(
            published.notification,
            Notification::ValidationFailed { .. }
        ));
    }

    #[tokio::test]
    async fn empty_dashboard_makes_no_calls() {
        let dashboard = coordinator(FetcherRegistry::new());
        let summary = dashboard.refresh().await.unwrap();
        assert_eq!(summary.fetched + summary.cached + summary.suppressed, 0);
        assert!(!dashboard.is_busy());
        assert!(dashboard.view_models().is_empty());
    }

    #[tokio::test]
    async fn removed_selections_lose_their_views() {
        let registry = FetcherRegistry::new();
        registry
            .register_fn("amc", "status_overview", |_f: FilterState| async {
                Ok::<_, FetchError>(json!([1, 2]))
            })
            .unwrap();
        let dashboard = coordinator(registry);
        dashboard
            .replace_selections(vec![Selection::new("a", "amc", "status_overview", "AMC")])
            .await
            .unwrap();

        dashboard.replace_selections(Vec::new()).await.unwrap();

        assert_eq!(dashboard.view_model(&"a".into()), None);
        assert_eq!(dashboard.cache_stats().with_data, 1);
    }
}
