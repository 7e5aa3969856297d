//! # System Constants
//!
//! Topic names, environment variable names and operational defaults shared across
//! the workflow core.

// Re-export state types for convenience
pub use crate::state_machine::{SopStatus, StageRole, StageStatus};

/// Topics of the lifecycle events published to other services
pub mod events {
    pub const SOP_CREATED: &str = "sop-created";
    pub const SOP_REVIEWAL_READY: &str = "sop-reviewal-ready";
    pub const SOP_APPROVED: &str = "sop-approved";
    pub const SOP_REJECTED: &str = "sop-rejected";
}

/// Environment variables read by the configuration and logging layers
pub mod env {
    pub const ENVIRONMENT: &str = "SOP_WORKFLOW_ENV";
    pub const CONFIG_DIR: &str = "SOP_WORKFLOW_CONFIG_DIR";
    pub const OVERRIDE_PREFIX: &str = "SOP_WORKFLOW";
}

pub const DEFAULT_ENVIRONMENT: &str = "development";
pub const DEFAULT_CONFIG_DIR: &str = "config";
pub const CONFIG_FILE_STEM: &str = "sop-workflow";

pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 1024;
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_ACQUIRE_TIMEOUT_MS: u64 = 3_000;
