//! # Parameter Key Builder
//!
//! Derives the deterministic string under which a fetch result is cached from
//! the filter state in effect when the request was made. Two filter states
//! producing the same key are request-equivalent.
//!
//! Encoding: `FROM_TO` with both dates rendered as `YYYY-MM-DD`, followed by
//! `|name=value` for every additional filter in name order. An absent date is
//! written as `*`; `\`, `|` and `=` inside filter names or values are escaped
//! with a backslash, so no field can forge a separator.

use crate::constants::{key_format, messages};
use crate::error::{DashboardError, DashboardResult};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Filter dimensions applied to every widget of a pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    /// Additional filters by name; ordered so key construction is stable
    #[serde(default)]
    pub filters: BTreeMap<String, String>,
}

impl FilterState {
    pub fn new(date_from: NaiveDate, date_to: NaiveDate) -> Self {
        Self {
            date_from: Some(date_from),
            date_to: Some(date_to),
            filters: BTreeMap::new(),
        }
    }

    /// Range ending `today` and starting `lookback_days` earlier
    pub fn default_range(today: NaiveDate, lookback_days: i64) -> Self {
        let lookback = Days::new(u64::try_from(lookback_days).unwrap_or(0));
        let from = today.checked_sub_days(lookback).unwrap_or(NaiveDate::MIN);
        Self::new(from, today)
    }

    pub fn with_filter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(name.into(), value.into());
        self
    }

    /// Reject ranges whose end precedes their start
    pub fn validate(&self) -> DashboardResult<()> {
        if let (Some(from), Some(to)) = (self.date_from, self.date_to) {
            if from > to {
                return Err(DashboardError::ValidationError(format!(
                    "{}: {from} > {to}",
                    messages::INVALID_DATE_RANGE
                )));
            }
        }
        Ok(())
    }
}

/// Deterministic encoding of a [`FilterState`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterKey(String);

impl ParameterKey {
    /// Build the key for a filter state. Pure and total.
    pub fn build(filters: &FilterState) -> Self {
        let mut key = String::with_capacity(21 + filters.filters.len() * 16);
        push_date(&mut key, filters.date_from);
        key.push(key_format::RANGE_SEPARATOR);
        push_date(&mut key, filters.date_to);

        for (name, value) in &filters.filters {
            key.push(key_format::FILTER_SEPARATOR);
            push_escaped(&mut key, name);
            key.push(key_format::ASSIGN);
            push_escaped(&mut key, value);
        }

        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParameterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn push_date(out: &mut String, date: Option<NaiveDate>) {
    match date {
        Some(date) => out.push_str(&date.format(key_format::DATE_FORMAT).to_string()),
        None => out.push_str(key_format::EMPTY_FIELD),
    }
}

fn push_escaped(out: &mut String, field: &str) {
    for ch in field.chars() {
        if ch == key_format::ESCAPE || ch == key_format::FILTER_SEPARATOR || ch == key_format::ASSIGN
        {
            out.push(key_format::ESCAPE);
        }
        out.push(ch);
    }
}
