//! # Result Cache
//!
//! Process-lifetime, in-memory record of the last success and the last failure
//! per (module, endpoint). Entries are created lazily and never evicted.
//!
//! Cached data is trusted only when its success key equals the key being
//! evaluated; a failure record suppresses retries only under the same rule.
//! Changing the parameter key is the entire invalidation mechanism.

use crate::orchestration::parameter_key::ParameterKey;
use crate::orchestration::types::{EndpointKey, WidgetData};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Last success and last failure for one (module, endpoint)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheEntry {
    pub last_success_key: Option<ParameterKey>,
    pub data: Option<WidgetData>,
    pub last_fail_key: Option<ParameterKey>,
    pub error: Option<String>,
    pub succeeded_at: Option<DateTime<Utc>>,
    pub failed_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
    /// Data valid for `key`, if any. A JSON `null` payload never counts.
    pub fn fresh_data(&self, key: &ParameterKey) -> Option<&WidgetData> {
        match (&self.last_success_key, &self.data) {
            (Some(success_key), Some(data)) if success_key == key && !data.is_null() => {
                Some(data)
            }
            _ => None,
        }
    }

    /// Error recorded for `key`, if the last attempt under it failed
    pub fn failed_error(&self, key: &ParameterKey) -> Option<&str> {
        match (&self.last_fail_key, &self.error) {
            (Some(fail_key), Some(error)) if fail_key == key => Some(error.as_str()),
            _ => None,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub with_data: usize,
    pub with_error: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ResultCache {
    entries: HashMap<EndpointKey, CacheEntry>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(&self, endpoint: &EndpointKey) -> Option<&CacheEntry> {
        self.entries.get(endpoint)
    }

    pub fn fresh_data(&self, endpoint: &EndpointKey, key: &ParameterKey) -> Option<&WidgetData> {
        self.entries
            .get(endpoint)
            .and_then(|entry| entry.fresh_data(key))
    }

    pub fn failed_error(&self, endpoint: &EndpointKey, key: &ParameterKey) -> Option<&str> {
        self.entries
            .get(endpoint)
            .and_then(|entry| entry.failed_error(key))
    }

    /// Last successful payload regardless of key (stale-while-revalidate display)
    pub fn last_data(&self, endpoint: &EndpointKey) -> Option<&WidgetData> {
        self.entries
            .get(endpoint)
            .and_then(|entry| entry.data.as_ref())
    }

    /// Record a success; the failure record is left untouched
    pub fn record_success(&mut self, endpoint: &EndpointKey, key: &ParameterKey, data: WidgetData) {
        let entry = self.entries.entry(endpoint.clone()).or_default();
        entry.last_success_key = Some(key.clone());
        entry.data = Some(data);
        entry.succeeded_at = Some(Utc::now());
    }

    /// Record a failure; the success record is left untouched
    pub fn record_failure(&mut self, endpoint: &EndpointKey, key: &ParameterKey, error: String) {
        let entry = self.entries.entry(endpoint.clone()).or_default();
        entry.last_fail_key = Some(key.clone());
        entry.error = Some(error);
        entry.failed_at = Some(Utc::now());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            with_data: self.entries.values().filter(|e| e.data.is_some()).count(),
            with_error: self.entries.values().filter(|e| e.error.is_some()).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestration::parameter_key::FilterState;
    use chrono::NaiveDate;
    use serde_json::json;

    fn key(month: u32) -> ParameterKey {
        let from = NaiveDate::from_ymd_opt(2024, month, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, month, 28).unwrap();
        ParameterKey::build(&FilterState::new(from, to))
    }

    #[test]
    fn data_is_fresh_only_for_its_key() {
        let mut cache = ResultCache::new();
        let endpoint = EndpointKey::new("tickets", "ticket_status");
        cache.record_success(&endpoint, &key(1), json!({"open": 5}));

        assert_eq!(cache.fresh_data(&endpoint, &key(1)), Some(&json!({"open": 5})));
        assert_eq!(cache.fresh_data(&endpoint, &key(2)), None);
        assert_eq!(cache.last_data(&endpoint), Some(&json!({"open": 5})));
    }

    #[test]
    fn success_and_failure_records_coexist() {
        let mut cache = ResultCache::new();
        let endpoint = EndpointKey::new("amc", "status_overview");
        cache.record_success(&endpoint, &key(1), json!([1, 2]));
        cache.record_failure(&endpoint, &key(2), "HTTP 500".to_string());

        assert!(cache.fresh_data(&endpoint, &key(1)).is_some());
        assert_eq!(cache.failed_error(&endpoint, &key(2)), Some("HTTP 500"));
        assert_eq!(cache.failed_error(&endpoint, &key(1)), None);

        let entry = cache.entry(&endpoint).unwrap();
        assert_eq!(entry.last_success_key, Some(key(1)));
        assert_eq!(entry.last_fail_key, Some(key(2)));
    }

    #[test]
    fn null_payload_is_not_fresh() {
        let mut cache = ResultCache::new();
        let endpoint = EndpointKey::new("surveys", "survey_summary");
        cache.record_success(&endpoint, &key(3), serde_json::Value::Null);
        assert!(cache.fresh_data(&endpoint, &key(3)).is_none());
    }

    #[test]
    fn stats_count_entries() {
        let mut cache = ResultCache::new();
        cache.record_success(&EndpointKey::new("a", "x"), &key(1), json!(1));
        cache.record_failure(&EndpointKey::new("b", "y"), &key(1), "nope".into());
        assert_eq!(
            cache.stats(),
            CacheStats {
                entries: 2,
                with_data: 1,
                with_error: 1
            }
        );
    }
}
