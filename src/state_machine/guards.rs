//! Guards checked before a stage transition is applied.
//!
//! A guard failure leaves the stage untouched. An approver acting while any reviewer
//! is outstanding is refused outright, so neither the decision nor its comment is
//! recorded; it is not held back for later.

use super::derivation::outstanding_reviewers;
use super::errors::{guard_failed, StateMachineError, StateMachineResult};
use super::events::StageAction;
use crate::models::WorkflowStage;

/// Everything a guard may inspect when a participant acts on their stage
#[derive(Debug, Clone, Copy)]
pub struct TransitionContext<'a> {
    pub stage: &'a WorkflowStage,
    pub action: StageAction,
    pub comment: Option<&'a str>,
    /// Every stage of the owning SOP, including `stage` itself
    pub siblings: &'a [WorkflowStage],
}

impl TransitionContext<'_> {
    /// The comment with surrounding whitespace removed, if any text remains
    pub fn trimmed_comment(&self) -> Option<&str> {
        self.comment.map(str::trim).filter(|c| !c.is_empty())
    }
}

/// Trait for implementing state transition guards
pub trait StateGuard {
    /// Check if a transition is allowed
    fn check(&self, context: &TransitionContext<'_>) -> StateMachineResult<()>;

    /// Get a description of this guard for logging
    fn description(&self) -> &'static str;
}

/// Corrections must explain what needs to change
pub struct CommentProvidedGuard;

impl StateGuard for CommentProvidedGuard {
    fn check(&self, context: &TransitionContext<'_>) -> StateMachineResult<()> {
        if context.action.requires_comment() && context.trimmed_comment().is_none() {
            return Err(StateMachineError::CommentRequired {
                action: context.action,
            });
        }
        Ok(())
    }

    fn description(&self) -> &'static str {
        "Corrections must carry a comment"
    }
}

/// Approvers cannot act while any reviewer is outstanding
pub struct ReviewersCompleteGuard;

impl StateGuard for ReviewersCompleteGuard {
    fn check(&self, context: &TransitionContext<'_>) -> StateMachineResult<()> {
        if !context.action.is_approver_action() {
            return Ok(());
        }

        let outstanding = outstanding_reviewers(context.siblings);
        if outstanding > 0 {
            return Err(guard_failed(format!(
                "Cannot {} SOP {}: {} reviewer stage(s) not yet reviewed",
                context.action, context.stage.sop_id, outstanding
            )));
        }
        Ok(())
    }

    fn description(&self) -> &'static str {
        "All reviewer stages must be reviewed before approval decisions"
    }
}
