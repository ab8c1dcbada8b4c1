//! # Fetch Planner
//!
//! Classifies every selection of a pass before any network call is made:
//!
//! 1. fresh data cached for the pass key → [`PlanAction::Cached`]
//! 2. last attempt for the pass key failed → [`PlanAction::Suppressed`]
//! 3. otherwise → [`PlanAction::Fetch`], grouped by module for dispatch, and
//!    the endpoint's loading flag is set on behalf of the pass.
//!
//! A changed key makes both checks miss, which is how previous results and
//! previous failures stop mattering. There is no explicit invalidation.
//!
//! Every entry gets its own correlation id; the executor and the reconciler
//! match on it rather than on position.

use crate::orchestration::loading_tracker::LoadingTracker;
use crate::orchestration::parameter_key::{FilterState, ParameterKey};
use crate::orchestration::result_cache::ResultCache;
use crate::orchestration::types::{
    EndpointKey, FetchClassification, ModuleTag, Selection, SelectionId, WidgetData,
};
use tracing::{debug, instrument};
use uuid::Uuid;

/// What a pass will do for one selection
#[derive(Debug, Clone, PartialEq)]
pub enum PlanAction {
    /// Forward the cached data as-is
    Cached(WidgetData),
    /// Forward the recorded error; no call, no new notification
    Suppressed(String),
    /// Issue a network call
    Fetch,
}

/// One selection with its classification
#[derive(Debug, Clone)]
pub struct PlannedSelection {
    pub correlation_id: Uuid,
    pub selection: Selection,
    pub endpoint: EndpointKey,
    pub action: PlanAction,
}

impl PlannedSelection {
    pub fn classification(&self) -> FetchClassification {
        match self.action {
            PlanAction::Cached(_) => FetchClassification::Cached,
            PlanAction::Suppressed(_) => FetchClassification::Suppressed,
            PlanAction::Fetch => FetchClassification::Fetch,
        }
    }
}

/// A single network call to issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub correlation_id: Uuid,
    pub endpoint: EndpointKey,
    pub selection_id: SelectionId,
    pub title: String,
}

/// All fetches of a pass that target one module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleBatch {
    pub module: ModuleTag,
    pub requests: Vec<FetchRequest>,
}

/// Classification counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanCounts {
    pub cached: usize,
    pub suppressed: usize,
    pub fetch: usize,
}

/// Result of planning one orchestration pass
#[derive(Debug, Clone)]
pub struct FetchPlan {
    pub pass_id: Uuid,
    pub key: ParameterKey,
    pub filters: FilterState,
    /// Selections in registry order
    pub entries: Vec<PlannedSelection>,
    /// Fetch entries grouped by module, modules in first-appearance order
    pub batches: Vec<ModuleBatch>,
}

impl FetchPlan {
    pub fn counts(&self) -> PlanCounts {
        let mut counts = PlanCounts::default();
        for entry in &self.entries {
            match entry.action {
                PlanAction::Cached(_) => counts.cached += 1,
                PlanAction::Suppressed(_) => counts.suppressed += 1,
                PlanAction::Fetch => counts.fetch += 1,
            }
        }
        counts
    }

    pub fn has_fetches(&self) -> bool {
        self.batches.iter().any(|batch| !batch.requests.is_empty())
    }

    /// Endpoints whose loading flag this pass set
    pub fn fetch_endpoints(&self) -> Vec<EndpointKey> {
        self.batches
            .iter()
            .flat_map(|batch| batch.requests.iter().map(|req| req.endpoint.clone()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Stateless classifier over the cache
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchPlanner;

impl FetchPlanner {
    pub fn new() -> Self {
        Self
    }

    /// Classify `selections` under `key` and mark loading for every fetch.
    ///
    /// Must run inside the same critical section as any other write to
    /// `loading` so the start of a pass is atomic.
    #[instrument(skip_all, fields(pass_id = %pass_id, parameter_key = %key, selections = selections.len()))]
    pub fn plan(
        &self,
        pass_id: Uuid,
        selections: &[Selection],
        filters: &FilterState,
        key: &ParameterKey,
        cache: &ResultCache,
        loading: &mut LoadingTracker,
    ) -> FetchPlan {
        let mut entries = Vec::with_capacity(selections.len());
        let mut batches: Vec<ModuleBatch> = Vec::new();

        for selection in selections {
            let endpoint = selection.endpoint_key();
            let correlation_id = Uuid::new_v4();

            let action = if let Some(data) = cache.fresh_data(&endpoint, key) {
                PlanAction::Cached(data.clone())
            } else if let Some(error) = cache.failed_error(&endpoint, key) {
                PlanAction::Suppressed(error.to_string())
            } else {
                loading.mark(&endpoint, pass_id);
                let request = FetchRequest {
                    correlation_id,
                    endpoint: endpoint.clone(),
                    selection_id: selection.id.clone(),
                    title: selection.title.clone(),
                };
                match batches
                    .iter_mut()
                    .find(|batch| batch.module == selection.module)
                {
                    Some(batch) => batch.requests.push(request),
                    None => batches.push(ModuleBatch {
                        module: selection.module.clone(),
                        requests: vec![request],
                    }),
                }
                PlanAction::Fetch
            };

            let entry = PlannedSelection {
                correlation_id,
                selection: selection.clone(),
                endpoint,
                action,
            };

            debug!(
                selection_id = %entry.selection.id,
                endpoint = %entry.endpoint,
                classification = %entry.classification(),
                "Classified widget selection"
            );

            entries.push(entry);
        }

        FetchPlan {
            pass_id,
            key: key.clone(),
            filters: filters.clone(),
            entries,
            batches,
        }
    }
}
