//! Configuration Loader
//!
//! Environment-aware loading: discovers the configuration directory, layers
//! the base file, the environment file and `DASHBOARD__` variables with the
//! `config` crate, then validates the merged result.

use super::error::{ConfigResult, ConfigurationError};
use super::DashboardConfig;
use config::{Config, Environment, File};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

const BASE_FILE: &str = "dashboard.toml";
const ENV_PREFIX: &str = "DASHBOARD";
const ENV_SEPARATOR: &str = "__";
const CONFIG_DIR_VAR: &str = "DASHBOARD_CONFIG_DIR";

/// Loaded configuration plus where it came from
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: DashboardConfig,
    environment: String,
    config_directory: PathBuf,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        Self::load_from_directory(None)
    }

    /// Load configuration from a specific directory
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> ConfigResult<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load configuration from a specific directory with explicit environment
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        Self::load_with_sources(config_dir, environment, None)
    }

    /// Like [`load_from_directory_with_env`](Self::load_from_directory_with_env),
    /// reading `DASHBOARD__*` overrides from `env_vars` instead of the process
    /// environment when given
    pub fn load_with_sources(
        config_dir: Option<PathBuf>,
        environment: &str,
        env_vars: Option<HashMap<String, String>>,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let config_directory = config_dir.unwrap_or_else(Self::default_config_directory);
        if config_directory.exists() && !config_directory.is_dir() {
            return Err(ConfigurationError::file_read_error(
                config_directory.display().to_string(),
                "not a directory",
            ));
        }

        debug!(
            environment,
            directory = %config_directory.display(),
            "Loading dashboard configuration"
        );

        let config = Self::load_and_merge_config(&config_directory, environment, env_vars)?;
        config.validate()?;

        crate::log_config!(info, "Configuration loaded successfully",
            environment: environment,
            max_concurrent_fetches: config.dispatch.max_concurrent_fetches,
            stale_pass_policy: format!("{:?}", config.reconciliation.stale_pass_policy)
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory,
        }))
    }

    fn load_and_merge_config(
        config_directory: &Path,
        environment: &str,
        env_vars: Option<HashMap<String, String>>,
    ) -> ConfigResult<DashboardConfig> {
        let base = config_directory.join(BASE_FILE);
        let overlay = config_directory.join(format!("dashboard.{environment}.toml"));

        for path in [&base, &overlay] {
            if path.is_file() {
                debug!(file = %path.display(), "Merging configuration file");
            }
        }

        let merged = Config::builder()
            .add_source(File::from(base).required(false))
            .add_source(File::from(overlay).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true)
                    .source(env_vars),
            )
            .build()?;

        Ok(merged.try_deserialize()?)
    }

    /// Environment name from `DASHBOARD_ENV`, then `APP_ENV`, else `development`
    pub fn detect_environment() -> String {
        env::var("DASHBOARD_ENV")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase()
    }

    fn default_config_directory() -> PathBuf {
        env::var(CONFIG_DIR_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config"))
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }
}
