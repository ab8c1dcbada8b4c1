//! # Dispatch Executor
//!
//! Issues every fetch of a plan concurrently and waits for all of them
//! (settle-all, no early return on failure). Each call runs in its own task,
//! so a slow, failing or panicking fetcher only affects its own settlement.
//!
//! Settlements come back in batch order and carry the correlation id of the
//! entry they belong to. Cached and suppressed entries never reach the
//! executor.
//!
//! Dropping the dispatch future does not cancel calls already spawned; their
//! results are simply never reconciled.

use crate::config::DispatchConfig;
use crate::error::FetchError;
use crate::orchestration::fetch_planner::FetchPlan;
use crate::orchestration::parameter_key::FilterState;
use crate::orchestration::types::{Settlement, WidgetData};
use crate::registry::{FetcherRegistry, WidgetFetcher};
use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

enum Slot {
    Ready(Settlement),
    Spawned(Uuid, JoinHandle<Result<WidgetData, FetchError>>),
}

/// Concurrent fan-out over a [`FetcherRegistry`]
#[derive(Debug, Clone)]
pub struct DispatchExecutor {
    registry: FetcherRegistry,
    /// Caps the number of fetches in flight across all passes
    permits: Arc<Semaphore>,
    fetch_timeout: Option<Duration>,
}

impl DispatchExecutor {
    pub fn new(registry: FetcherRegistry) -> Self {
        Self::with_config(registry, &DispatchConfig::default())
    }

    pub fn with_config(registry: FetcherRegistry, config: &DispatchConfig) -> Self {
        Self {
            registry,
            permits: Arc::new(Semaphore::new(config.max_concurrent_fetches.max(1))),
            fetch_timeout: config.fetch_timeout(),
        }
    }

    pub fn registry(&self) -> &FetcherRegistry {
        &self.registry
    }

    /// Run every fetch of `plan` and return one settlement per fetch entry
    #[instrument(skip_all, fields(pass_id = %plan.pass_id, parameter_key = %plan.key))]
    pub async fn dispatch(&self, plan: &FetchPlan) -> Vec<Settlement> {
        let filters = Arc::new(plan.filters.clone());
        let mut slots = Vec::new();

        for batch in &plan.batches {
            debug!(
                module = %batch.module,
                requests = batch.requests.len(),
                "Dispatching module batch"
            );

            for request in &batch.requests {
                let Some(fetcher) = self.registry.resolve(&request.endpoint) else {
                    warn!(
                        endpoint = %request.endpoint,
                        selection_id = %request.selection_id,
                        "No fetcher registered for widget endpoint"
                    );
                    slots.push(Slot::Ready(Settlement::rejected(
                        request.correlation_id,
                        FetchError::Unregistered(request.endpoint.clone()),
                    )));
                    continue;
                };

                let filters = Arc::clone(&filters);
                let permits = Arc::clone(&self.permits);
                let timeout = self.fetch_timeout;
                let endpoint = request.endpoint.clone();

                let handle = tokio::spawn(async move {
                    let _permit = permits
                        .acquire_owned()
                        .await
                        .map_err(|e| FetchError::TaskFailed(e.to_string()))?;
                    let started = Instant::now();
                    let result = run_fetch(fetcher, &filters, timeout).await;
                    debug!(
                        endpoint = %endpoint,
                        success = result.is_ok(),
                        duration_ms = started.elapsed().as_millis() as u64,
                        "Widget fetch settled"
                    );
                    result
                });
                slots.push(Slot::Spawned(request.correlation_id, handle));
            }
        }

        join_all(slots.into_iter().map(|slot| async move {
            match slot {
                Slot::Ready(settlement) => settlement,
                Slot::Spawned(correlation_id, handle) => match handle.await {
                    Ok(Ok(data)) => Settlement::fulfilled(correlation_id, data),
                    Ok(Err(error)) => Settlement::rejected(correlation_id, error),
                    Err(join_error) => {
                        warn!(
                            correlation_id = %correlation_id,
                            error = %join_error,
                            "Widget fetch task ended without a result"
                        );
                        Settlement::rejected(
                            correlation_id,
                            FetchError::TaskFailed(join_error.to_string()),
                        )
                    }
                },
            }
        }))
        .await
    }
}

async fn run_fetch(
    fetcher: Arc<dyn WidgetFetcher>,
    filters: &FilterState,
    timeout: Option<Duration>,
) -> Result<WidgetData, FetchError> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, fetcher.fetch(filters))
            .await
            .map_err(|_| FetchError::Timeout(limit))?,
        None => fetcher.fetch(filters).await,
    }
}
