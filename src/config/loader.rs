//! Configuration Loader
//!
//! Environment-aware loading: base file, environment override file, then
//! environment variables, merged by the `config` crate.

use config::{Config, Environment, File};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use super::error::{ConfigResult, ConfigurationError};
use super::WorkflowConfig;
use crate::constants::{self, CONFIG_FILE_STEM, DEFAULT_CONFIG_DIR, DEFAULT_ENVIRONMENT};

/// Loaded configuration plus where it came from
#[derive(Debug)]
pub struct ConfigManager {
    config: WorkflowConfig,
    environment: String,
    config_directory: PathBuf,
}

impl ConfigManager {
    /// Load configuration with environment and directory auto-detection
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(Self::default_config_directory(), &environment)
    }

    /// Load configuration from a specific directory with explicit environment
    /// This is useful for testing without modifying global environment variables
    pub fn load_from_directory_with_env(
        config_directory: impl Into<PathBuf>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let config_directory = config_directory.into();

        debug!(
            environment,
            directory = %config_directory.display(),
            "Loading SOP workflow configuration"
        );

        let settings = Config::builder()
            .add_source(File::from(Self::base_file(&config_directory)).required(false))
            .add_source(
                File::from(Self::environment_file(&config_directory, environment)).required(false),
            )
            .add_source(
                Environment::with_prefix(constants::env::OVERRIDE_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ConfigurationError::LoadFailed {
                environment: environment.to_string(),
                error: e.to_string(),
            })?;

        let config: WorkflowConfig = settings
            .try_deserialize()
            .map_err(|e| ConfigurationError::Deserialization(e.to_string()))?;

        config.validate()?;

        info!(
            environment,
            config = ?config.sanitized(),
            "Configuration loaded successfully"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory,
        }))
    }

    /// Wrap an already-built configuration
    pub fn from_config(config: WorkflowConfig, environment: &str) -> ConfigResult<Arc<ConfigManager>> {
        config.validate()?;
        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory: PathBuf::from(DEFAULT_CONFIG_DIR),
        }))
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    /// Current environment from `SOP_WORKFLOW_ENV`, defaulting to development
    pub fn detect_environment() -> String {
        env::var(constants::env::ENVIRONMENT)
            .ok()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string())
    }

    fn default_config_directory() -> PathBuf {
        env::var(constants::env::CONFIG_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_DIR))
    }

    fn base_file(directory: &Path) -> PathBuf {
        directory.join(format!("{CONFIG_FILE_STEM}.toml"))
    }

    fn environment_file(directory: &Path, environment: &str) -> PathBuf {
        directory.join(format!("{CONFIG_FILE_STEM}.{environment}.toml"))
    }
}
