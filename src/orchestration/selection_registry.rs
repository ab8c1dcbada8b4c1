//! # Selection Registry
//!
//! Ordered list of the widgets currently on the dashboard. The registry is
//! replaced wholesale on every selection-change event; there is no partial
//! mutation. Registry order is the order every pass plans, dispatches and
//! reconciles in.

use crate::error::DashboardResult;
use crate::orchestration::types::{Selection, SelectionId};
use crate::validation::validate_selections;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct SelectionRegistry {
    selections: Vec<Selection>,
}

impl SelectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole selection set after validating it
    pub fn replace(&mut self, selections: Vec<Selection>) -> DashboardResult<()> {
        validate_selections(&selections)?;

        debug!(
            previous = self.selections.len(),
            current = selections.len(),
            "Replacing widget selection set"
        );

        self.selections = selections;
        Ok(())
    }

    pub fn selections(&self) -> &[Selection] {
        &self.selections
    }

    pub fn get(&self, id: &SelectionId) -> Option<&Selection> {
        self.selections.iter().find(|selection| &selection.id == id)
    }

    pub fn contains(&self, id: &SelectionId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.selections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Selection> {
        vec![
            Selection::new("w1", "tickets", "ticket_status", "Ticket Status"),
            Selection::new("w2", "tasks", "technical_checklist", "Technical Checklist"),
            Selection::new("w3", "tickets", "tickets_categorywise", "Categorywise"),
        ]
    }

    #[test]
    fn replace_is_wholesale() {
        let mut registry = SelectionRegistry::new();
        registry.replace(sample()).unwrap();
        assert_eq!(registry.len(), 3);

        registry
            .replace(vec![Selection::new("w9", "amc", "status_overview", "AMC")])
            .unwrap();
        assert_eq!(registry.len(), 1);
        assert!(!registry.contains(&SelectionId::new("w1")));
        assert!(registry.contains(&SelectionId::new("w9")));
    }

    #[test]
    fn invalid_replacement_keeps_previous_set() {
        let mut registry = SelectionRegistry::new();
        registry.replace(sample()).unwrap();

        let duplicate = vec![
            Selection::new("x", "tickets", "ticket_status", "A"),
            Selection::new("x", "tickets", "ticket_status", "B"),
        ];
        assert!(registry.replace(duplicate).is_err());
        assert_eq!(registry.len(), 3);
    }
}
