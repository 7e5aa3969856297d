use crate::error::WorkflowError;
use thiserror::Error;

use super::events::StageAction;
use super::states::{StageRole, StageStatus};

/// Errors raised while validating a stage transition
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateMachineError {
    #[error("Action '{action}' is not permitted for a {role} stage in status {from}")]
    InvalidTransition {
        role: StageRole,
        from: StageStatus,
        action: StageAction,
    },

    #[error("Guard condition failed: {reason}")]
    GuardFailed { reason: String },

    #[error("Action '{action}' requires a non-empty comment")]
    CommentRequired { action: StageAction },
}

/// Result type alias for state machine operations
pub type StateMachineResult<T> = Result<T, StateMachineError>;

/// Helper function to create guard failures
pub fn guard_failed(reason: impl Into<String>) -> StateMachineError {
    StateMachineError::GuardFailed {
        reason: reason.into(),
    }
}

impl From<StateMachineError> for WorkflowError {
    fn from(err: StateMachineError) -> Self {
        WorkflowError::BadRequest(err.to_string())
    }
}
