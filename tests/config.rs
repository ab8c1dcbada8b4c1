//! Layered configuration loading

use dashboard_core::config::{ConfigManager, ConfigurationError, DashboardConfig, StalePassPolicy};
use dashboard_core::orchestration::DashboardCoordinator;
use dashboard_core::registry::FetcherRegistry;
use std::collections::HashMap;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::Semaphore;

fn env(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
    Some(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

#[test]
fn environment_variables_override_files() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("dashboard.toml"),
        r#"
[dispatch]
max_concurrent_fetches = 8

[notifications]
announce_pass_success = true
"#,
    )
    .unwrap();

    let manager = ConfigManager::load_with_sources(
        Some(dir.path().to_path_buf()),
        "development",
        env(&[
            ("DASHBOARD__DISPATCH__MAX_CONCURRENT_FETCHES", "4"),
            ("DASHBOARD__DISPATCH__FETCH_TIMEOUT_MS", "1500"),
            ("DASHBOARD__NOTIFICATIONS__ANNOUNCE_PASS_SUCCESS", "false"),
            ("DASHBOARD__RECONCILIATION__STALE_PASS_POLICY", "overwrite"),
        ]),
    )
    .unwrap();

    let config = manager.config();
    assert_eq!(config.dispatch.max_concurrent_fetches, 4);
    assert_eq!(
        config.dispatch.fetch_timeout(),
        Some(Duration::from_millis(1500))
    );
    assert!(!config.notifications.announce_pass_success);
    assert_eq!(
        config.reconciliation.stale_pass_policy,
        StalePassPolicy::Overwrite
    );
    assert_eq!(config.filters.default_lookback_days, 365);
}

#[test]
fn unrelated_variables_are_ignored() {
    let dir = TempDir::new().unwrap();
    let manager = ConfigManager::load_with_sources(
        Some(dir.path().to_path_buf()),
        "test",
        env(&[("DASHBOARD_ENV", "test"), ("OTHER__DISPATCH__X", "1")]),
    )
    .unwrap();

    assert_eq!(manager.config(), &DashboardConfig::default());
    assert_eq!(manager.config_directory(), dir.path());
}

#[test]
fn malformed_file_is_a_load_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("dashboard.toml"), "[dispatch\nbroken").unwrap();

    let result =
        ConfigManager::load_with_sources(Some(dir.path().to_path_buf()), "test", env(&[]));

    assert!(result.is_err());
}

#[test]
fn oversized_concurrency_override_is_rejected_at_load() {
    let dir = TempDir::new().unwrap();
    let too_many = (Semaphore::MAX_PERMITS + 1).to_string();

    let result = ConfigManager::load_with_sources(
        Some(dir.path().to_path_buf()),
        "test",
        env(&[("DASHBOARD__DISPATCH__MAX_CONCURRENT_FETCHES", too_many.as_str())]),
    );

    assert!(matches!(
        result,
        Err(ConfigurationError::InvalidValue { ref field, .. })
            if field == "dispatch.max_concurrent_fetches"
    ));
}

#[test]
fn coordinator_rejects_oversized_limits_instead_of_panicking() {
    let mut config = DashboardConfig::default();
    config.dispatch.max_concurrent_fetches = usize::MAX;
    assert!(DashboardCoordinator::with_config(FetcherRegistry::new(), config).is_err());

    let mut config = DashboardConfig::default();
    config.notifications.channel_capacity = usize::MAX;
    assert!(DashboardCoordinator::with_config(FetcherRegistry::new(), config).is_err());
}

#[test]
fn coordinator_rejects_invalid_config() {
    let mut config = DashboardConfig::default();
    config.filters.default_lookback_days = -1;

    let result = DashboardCoordinator::with_config(FetcherRegistry::new(), config);

    assert!(result.is_err());
}

#[test]
fn coordinator_starts_from_lookback_range() {
    let mut config = DashboardConfig::default();
    config.filters.default_lookback_days = 30;

    let dashboard = DashboardCoordinator::with_config(FetcherRegistry::new(), config).unwrap();
    let filters = dashboard.filters();

    let (from, to) = (filters.date_from.unwrap(), filters.date_to.unwrap());
    assert_eq!((to - from).num_days(), 30);
}
