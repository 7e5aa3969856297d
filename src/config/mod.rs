//! # SOP Workflow Configuration
//!
//! Layered configuration loaded with the `config` crate:
//!
//! 1. `config/sop-workflow.toml`
//! 2. `config/sop-workflow.<environment>.toml`
//! 3. `SOP_WORKFLOW__<SECTION>__<KEY>` environment variables
//!
//! Every section has defaults, so any layer may be partial or absent.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use sop_workflow::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let capacity = manager.config().events.channel_capacity;
//! let lock_timeout = manager.config().concurrency.lock_timeout();
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::{
    DEFAULT_ACQUIRE_TIMEOUT_MS, DEFAULT_EVENT_CHANNEL_CAPACITY, DEFAULT_LOCK_TIMEOUT_MS,
    DEFAULT_MAX_CONNECTIONS,
};

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root configuration structure mirroring sop-workflow.toml
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Lifecycle event channel settings
    pub events: EventsConfig,

    /// Per-SOP serialization settings
    pub concurrency: ConcurrencyConfig,

    /// PostgreSQL store settings
    pub database: DatabaseConfig,

    /// Log output settings
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Capacity of the in-process broadcast channel
    pub channel_capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConcurrencyConfig {
    /// Upper bound on waiting for another writer of the same SOP
    pub lock_timeout_ms: u64,
}

impl ConcurrencyConfig {
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }
}

/// Database connection and pooling configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Connection URL; `None` selects the in-memory stores
    pub url: Option<String>,
    pub max_connections: u32,
    pub acquire_timeout_ms: u64,
    /// Apply embedded migrations on connect
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout_ms: DEFAULT_ACQUIRE_TIMEOUT_MS,
            run_migrations: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive; falls back to RUST_LOG, then the environment default
    pub level: Option<String>,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl WorkflowConfig {
    /// Reject values that would make the workflow unusable
    pub fn validate(&self) -> ConfigResult<()> {
        if self.events.channel_capacity == 0 {
            return Err(ConfigurationError::invalid_value(
                "events.channel_capacity",
                self.events.channel_capacity,
                "must be greater than zero",
            ));
        }
        if self.concurrency.lock_timeout_ms == 0 {
            return Err(ConfigurationError::invalid_value(
                "concurrency.lock_timeout_ms",
                self.concurrency.lock_timeout_ms,
                "must be greater than zero",
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigurationError::invalid_value(
                "database.max_connections",
                self.database.max_connections,
                "must be greater than zero",
            ));
        }
        if let Some(url) = &self.database.url {
            if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
                return Err(ConfigurationError::invalid_value(
                    "database.url",
                    "[redacted]",
                    "must be a postgres:// or postgresql:// URL",
                ));
            }
        }
        Ok(())
    }

    /// Configuration safe to log: credentials in the database URL are masked
    pub fn sanitized(&self) -> Self {
        let mut config = self.clone();
        if let Some(url) = &config.database.url {
            config.database.url = Some(mask_credentials(url));
        }
        config
    }
}

fn mask_credentials(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***@{}", &url[..scheme_end], &url[at + 1..])
        }
        _ => url.to_string(),
    }
}
