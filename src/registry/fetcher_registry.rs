//! # Fetcher Registry
//!
//! Registration table mapping each (module, endpoint) pair to the async
//! function that loads its data. Built once at startup by the API-client
//! layer; the orchestration core resolves fetchers through it and knows
//! nothing about individual endpoints.
//!
//! ## Usage
//!
//! ```rust
//! use dashboard_core::registry::FetcherRegistry;
//! use dashboard_core::orchestration::FilterState;
//! use dashboard_core::FetchError;
//! use serde_json::json;
//!
//! let registry = FetcherRegistry::new();
//! registry
//!     .register_fn("tickets", "ticket_status", |_filters: FilterState| async move {
//!         Ok::<_, FetchError>(json!({"open": 5, "closed": 2}))
//!     })
//!     .unwrap();
//! assert!(registry.contains(&("tickets", "ticket_status").into()));
//! ```

use crate::error::{DashboardError, DashboardResult, FetchError};
use crate::orchestration::parameter_key::FilterState;
use crate::orchestration::types::{EndpointKey, ModuleTag, WidgetData};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

/// Loads the data behind one widget endpoint
#[async_trait]
pub trait WidgetFetcher: Send + Sync {
    async fn fetch(&self, filters: &FilterState) -> Result<WidgetData, FetchError>;
}

/// Adapter turning an async closure into a [`WidgetFetcher`]
pub struct FnFetcher<F> {
    func: F,
}

impl<F> FnFetcher<F> {
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

#[async_trait]
impl<F, Fut> WidgetFetcher for FnFetcher<F>
where
    F: Fn(FilterState) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<WidgetData, FetchError>> + Send + 'static,
{
    async fn fetch(&self, filters: &FilterState) -> Result<WidgetData, FetchError> {
        (self.func)(filters.clone()).await
    }
}

/// Registry statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryStats {
    pub total_fetchers: usize,
    pub modules: Vec<ModuleTag>,
}

/// Concurrent (module, endpoint) → fetcher table
#[derive(Clone, Default)]
pub struct FetcherRegistry {
    fetchers: Arc<DashMap<EndpointKey, Arc<dyn WidgetFetcher>>>,
}

impl std::fmt::Debug for FetcherRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetcherRegistry")
            .field("total_fetchers", &self.fetchers.len())
            .finish()
    }
}

impl FetcherRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fetcher. Each (module, endpoint) may be registered once;
    /// `unregister` first to swap an implementation.
    pub fn register(
        &self,
        module: impl Into<ModuleTag>,
        endpoint: impl Into<String>,
        fetcher: Arc<dyn WidgetFetcher>,
    ) -> DashboardResult<()> {
        let key = EndpointKey::new(module, endpoint);
        validate_key(&key)?;

        match self.fetchers.entry(key) {
            Entry::Occupied(entry) => {
                warn!(endpoint = %entry.key(), "Rejected duplicate fetcher registration");
                Err(DashboardError::RegistryError(format!(
                    "Fetcher already registered for {}",
                    entry.key()
                )))
            }
            Entry::Vacant(entry) => {
                debug!(endpoint = %entry.key(), "Registered widget fetcher");
                entry.insert(fetcher);
                Ok(())
            }
        }
    }

    /// Register an async closure as a fetcher
    pub fn register_fn<F, Fut>(
        &self,
        module: impl Into<ModuleTag>,
        endpoint: impl Into<String>,
        func: F,
    ) -> DashboardResult<()>
    where
        F: Fn(FilterState) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<WidgetData, FetchError>> + Send + 'static,
    {
        self.register(module, endpoint, Arc::new(FnFetcher::new(func)))
    }

    pub fn resolve(&self, key: &EndpointKey) -> Option<Arc<dyn WidgetFetcher>> {
        self.fetchers.get(key).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, key: &EndpointKey) -> bool {
        self.fetchers.contains_key(key)
    }

    pub fn unregister(&self, key: &EndpointKey) -> bool {
        self.fetchers.remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.fetchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fetchers.is_empty()
    }

    pub fn stats(&self) -> RegistryStats {
        let mut modules: Vec<ModuleTag> = self
            .fetchers
            .iter()
            .map(|entry| entry.key().module.clone())
            .collect();
        modules.sort();
        modules.dedup();

        RegistryStats {
            total_fetchers: self.fetchers.len(),
            modules,
        }
    }
}

fn validate_key(key: &EndpointKey) -> DashboardResult<()> {
    if key.module.as_str().trim().is_empty() {
        return Err(DashboardError::RegistryError(
            "Fetcher module cannot be empty".to_string(),
        ));
    }
    if key.endpoint.trim().is_empty() {
        return Err(DashboardError::RegistryError(
            "Fetcher endpoint cannot be empty".to_string(),
        ));
    }
    Ok(())
}
