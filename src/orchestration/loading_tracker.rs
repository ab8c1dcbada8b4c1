//! # Loading Tracker
//!
//! Per (module, endpoint) loading flag read by the rendering layer to overlay
//! a spinner on one widget without blocking the others.
//!
//! A flag is set when a selection is planned as a fetch and cleared once its
//! pass reconciles. Each flag remembers the pass that set it: when two passes
//! overlap, only the most recent one may clear the flag, so an older pass
//! settling first never hides a newer pass's spinner.

use crate::orchestration::types::{EndpointKey, ModuleTag};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct LoadingTracker {
    owners: HashMap<EndpointKey, Uuid>,
}

impl LoadingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag on behalf of `pass_id`, taking ownership from any older pass
    pub fn mark(&mut self, endpoint: &EndpointKey, pass_id: Uuid) {
        self.owners.insert(endpoint.clone(), pass_id);
    }

    /// Clear the flag if `pass_id` still owns it. Returns whether it was cleared.
    pub fn clear(&mut self, endpoint: &EndpointKey, pass_id: Uuid) -> bool {
        match self.owners.get(endpoint) {
            Some(owner) if *owner == pass_id => {
                self.owners.remove(endpoint);
                true
            }
            _ => false,
        }
    }

    /// Clear every flag still owned by `pass_id`
    pub fn clear_pass(&mut self, pass_id: Uuid) -> usize {
        let before = self.owners.len();
        self.owners.retain(|_, owner| *owner != pass_id);
        before - self.owners.len()
    }

    pub fn is_loading(&self, endpoint: &EndpointKey) -> bool {
        self.owners.contains_key(endpoint)
    }

    /// True while any widget is loading
    pub fn any_loading(&self) -> bool {
        !self.owners.is_empty()
    }

    /// Flags as a module → endpoint → bool map
    pub fn snapshot(&self) -> HashMap<ModuleTag, HashMap<String, bool>> {
        let mut map: HashMap<ModuleTag, HashMap<String, bool>> = HashMap::new();
        for endpoint in self.owners.keys() {
            map.entry(endpoint.module.clone())
                .or_default()
                .insert(endpoint.endpoint.clone(), true);
        }
        map
    }
}
