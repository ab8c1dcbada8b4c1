//! Input validation for inbound dashboard events
//!
//! Selection-change and filter-apply events are checked here before they can
//! start an orchestration pass. Rejected events never touch the cache.

use crate::error::{DashboardError, DashboardResult};
use crate::orchestration::parameter_key::FilterState;
use crate::orchestration::types::Selection;
use std::collections::HashSet;

/// Maximum number of widgets a dashboard may hold at once
const MAX_SELECTIONS: usize = 256;

/// Maximum length of a selection id, module tag or endpoint name
const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Validates a full replacement selection set
pub fn validate_selections(selections: &[Selection]) -> DashboardResult<()> {
    if selections.len() > MAX_SELECTIONS {
        return Err(DashboardError::ValidationError(format!(
            "Too many widgets selected: {} (max: {MAX_SELECTIONS})",
            selections.len()
        )));
    }

    let mut seen = HashSet::with_capacity(selections.len());
    for selection in selections {
        validate_identifier("selection id", selection.id.as_str())?;
        validate_identifier("module", selection.module.as_str())?;
        validate_identifier("endpoint", &selection.endpoint)?;

        if !seen.insert(&selection.id) {
            return Err(DashboardError::ValidationError(format!(
                "Duplicate widget id: {}",
                selection.id
            )));
        }
    }

    Ok(())
}

/// Validates a filter-apply event
pub fn validate_filters(filters: &FilterState) -> DashboardResult<()> {
    filters.validate()?;

    for name in filters.filters.keys() {
        if name.trim().is_empty() {
            return Err(DashboardError::ValidationError(
                "Filter name cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_identifier(field: &str, value: &str) -> DashboardResult<()> {
    if value.trim().is_empty() {
        return Err(DashboardError::ValidationError(format!(
            "Widget {field} cannot be empty"
        )));
    }

    if value.len() > MAX_IDENTIFIER_LENGTH {
        return Err(DashboardError::ValidationError(format!(
            "Widget {field} too long: {} chars (max: {MAX_IDENTIFIER_LENGTH})",
            value.len()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn accepts_distinct_selections() {
        let selections = vec![
            Selection::new("a", "tickets", "ticket_status", "Tickets"),
            Selection::new("b", "tickets", "ticket_status", "Tickets again"),
        ];
        assert!(validate_selections(&selections).is_ok());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let selections = vec![
            Selection::new("a", "tickets", "ticket_status", "Tickets"),
            Selection::new("a", "tasks", "technical_checklist", "Checklist"),
        ];
        let err = validate_selections(&selections).unwrap_err();
        assert!(err.to_string().contains("Duplicate widget id: a"));
    }

    #[test]
    fn rejects_blank_endpoint() {
        let selections = vec![Selection::new("a", "tickets", " ", "Tickets")];
        assert!(validate_selections(&selections).is_err());
    }

    #[test]
    fn rejects_inverted_range_and_blank_filter_names() {
        let from = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert!(validate_filters(&FilterState::new(from, to)).is_err());
        assert!(validate_filters(&FilterState::new(to, from).with_filter("", "x")).is_err());
        assert!(validate_filters(&FilterState::new(to, from).with_filter("site", "x")).is_ok());
    }
}
