//! # Reconciler
//!
//! Merges the settlements of one pass back into the result cache and produces
//! the per-widget view-models.
//!
//! For each planned selection, in registry order:
//!
//! - **Cached**: view shows the cached data; no write.
//! - **Suppressed**: view shows the recorded error; no write, no notification.
//! - **Fetch, fulfilled**: success recorded under the pass key; view shows data.
//! - **Fetch, rejected**: failure recorded under the pass key; view shows the
//!   error; one `WidgetFetchFailed` notification unless the same endpoint had
//!   already failed for this key.
//! - **Fetch, no settlement**: treated as a rejection with
//!   `No result returned from API`.
//!
//! Loading flags of every fetched endpoint are cleared whatever the outcome.
//!
//! Writes are always keyed by the key the pass captured at planning time. When
//! that key is no longer the latest applied one the pass is *stale*; with
//! [`StalePassPolicy::Discard`] its results are dropped entirely.

use crate::config::StalePassPolicy;
use crate::constants::messages;
use crate::error::{DashboardError, DashboardResult, FetchError};
use crate::events::Notification;
use crate::orchestration::fetch_planner::{FetchPlan, PlanAction};
use crate::orchestration::loading_tracker::LoadingTracker;
use crate::orchestration::parameter_key::ParameterKey;
use crate::orchestration::result_cache::ResultCache;
use crate::orchestration::types::{SelectionId, Settlement, SettlementOutcome, WidgetView};
use std::collections::HashMap;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// What reconciling one pass produced
#[derive(Debug, Clone, Default)]
pub struct ReconcileOutcome {
    /// View-models in registry order; empty when the pass was discarded
    pub views: Vec<(SelectionId, WidgetView)>,
    pub notifications: Vec<Notification>,
    pub succeeded: usize,
    pub failed: usize,
    pub stale: bool,
    /// Results were dropped without touching the cache
    pub discarded: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Reconciler {
    policy: StalePassPolicy,
}

impl Reconciler {
    pub fn new(policy: StalePassPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> StalePassPolicy {
        self.policy
    }

    /// Apply `settlements` for `plan`.
    ///
    /// Fails without touching any state when two settlements share a
    /// correlation id.
    #[instrument(skip_all, fields(pass_id = %plan.pass_id, parameter_key = %plan.key))]
    pub fn reconcile(
        &self,
        plan: &FetchPlan,
        settlements: Vec<Settlement>,
        latest_key: &ParameterKey,
        cache: &mut ResultCache,
        loading: &mut LoadingTracker,
    ) -> DashboardResult<ReconcileOutcome> {
        let mut by_id = index_settlements(plan, settlements)?;
        let stale = &plan.key != latest_key;

        if stale && self.policy == StalePassPolicy::Discard {
            let cleared = clear_loading(plan, loading);
            info!(
                latest_key = %latest_key,
                cleared,
                "Discarding results of superseded pass"
            );
            let (succeeded, failed) = by_id.values().fold((0, 0), |(ok, err), settlement| {
                if settlement.is_fulfilled() {
                    (ok + 1, err)
                } else {
                    (ok, err + 1)
                }
            });
            return Ok(ReconcileOutcome {
                succeeded,
                failed,
                stale,
                discarded: true,
                ..ReconcileOutcome::default()
            });
        }

        let mut outcome = ReconcileOutcome {
            stale,
            ..ReconcileOutcome::default()
        };

        for entry in &plan.entries {
            let view = match &entry.action {
                PlanAction::Cached(data) => WidgetView::with_data(data.clone()),
                PlanAction::Suppressed(error) => WidgetView::with_error(error.clone()),
                PlanAction::Fetch => {
                    let result = match by_id.remove(&entry.correlation_id) {
                        Some(settlement) => settlement.outcome,
                        None => {
                            crate::log_widget!(warn, "Fetch entry has no settlement",
                                selection_id: entry.selection.id,
                                endpoint: entry.endpoint,
                            );
                            SettlementOutcome::Rejected(FetchError::TaskFailed(
                                messages::NO_RESULT.to_string(),
                            ))
                        }
                    };

                    match result {
                        SettlementOutcome::Fulfilled(data) => {
                            cache.record_success(&entry.endpoint, &plan.key, data.clone());
                            outcome.succeeded += 1;
                            crate::log_widget!(debug, "Widget fetch succeeded",
                                selection_id: entry.selection.id,
                                endpoint: entry.endpoint,
                            );
                            WidgetView::with_data(data)
                        }
                        SettlementOutcome::Rejected(error) => {
                            let message = error.display_message();
                            let already_reported =
                                cache.failed_error(&entry.endpoint, &plan.key).is_some();
                            cache.record_failure(&entry.endpoint, &plan.key, message.clone());
                            outcome.failed += 1;

                            if already_reported {
                                crate::log_widget!(debug, "Failure already reported for this key",
                                    selection_id: entry.selection.id,
                                    endpoint: entry.endpoint,
                                    parameter_key: plan.key.as_str(),
                                );
                            } else {
                                crate::log_widget!(warn, "Widget fetch failed",
                                    selection_id: entry.selection.id,
                                    endpoint: entry.endpoint,
                                    error: message,
                                );
                                outcome.notifications.push(Notification::WidgetFetchFailed {
                                    module: entry.endpoint.module.clone(),
                                    endpoint: entry.endpoint.endpoint.clone(),
                                    parameter_key: plan.key.to_string(),
                                    title: entry.selection.title.clone(),
                                    message: message.clone(),
                                });
                            }
                            WidgetView::with_error(message)
                        }
                    }
                }
            };
            outcome.views.push((entry.selection.id.clone(), view));
        }

        if !by_id.is_empty() {
            warn!(
                unmatched = by_id.len(),
                "Ignoring settlements with no matching fetch entry"
            );
        }

        clear_loading(plan, loading);
        Ok(outcome)
    }
}

fn index_settlements(
    plan: &FetchPlan,
    settlements: Vec<Settlement>,
) -> DashboardResult<HashMap<Uuid, Settlement>> {
    let mut by_id = HashMap::with_capacity(settlements.len());
    for settlement in settlements {
        let id = settlement.correlation_id;
        if by_id.insert(id, settlement).is_some() {
            return Err(DashboardError::Internal(format!(
                "Duplicate settlement for correlation id {id} in pass {}",
                plan.pass_id
            )));
        }
    }
    Ok(by_id)
}

fn clear_loading(plan: &FetchPlan, loading: &mut LoadingTracker) -> usize {
    plan.fetch_endpoints()
        .iter()
        .filter(|endpoint| loading.clear(endpoint, plan.pass_id))
        .count()
}
