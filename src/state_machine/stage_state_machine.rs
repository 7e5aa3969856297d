use super::{
    errors::{StateMachineError, StateMachineResult},
    events::StageAction,
    guards::{CommentProvidedGuard, ReviewersCompleteGuard, StateGuard, TransitionContext},
    states::{StageRole, StageStatus},
};

/// Transition table and guard chain for a participant's stage.
///
/// The table is keyed by (role, current status, action); any combination not listed
/// is rejected. Guards run after the table lookup succeeds.
pub struct StageStateMachine {
    guards: Vec<Box<dyn StateGuard + Send + Sync>>,
}

impl Default for StageStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StageStateMachine {
    /// Create a state machine with the standard guard chain
    pub fn new() -> Self {
        Self {
            guards: vec![
                Box::new(CommentProvidedGuard),
                Box::new(ReviewersCompleteGuard),
            ],
        }
    }

    /// Determine the target status for `action` on a stage of `role` currently in `current`
    pub fn determine_target_state(
        role: StageRole,
        current: StageStatus,
        action: StageAction,
    ) -> StateMachineResult<StageStatus> {
        use StageAction as A;
        use StageRole as R;
        use StageStatus as S;

        let target = match (role, current, action) {
            // Reviewer track
            (R::Reviewer, S::Pending | S::NeedsCorrection, A::Review) => S::InReview,
            (R::Reviewer, S::Pending | S::InReview | S::NeedsCorrection, A::ConfirmReview) => {
                S::Reviewed
            }
            (R::Reviewer, S::Pending | S::InReview | S::Reviewed, A::NeedsCorrection) => {
                S::NeedsCorrection
            }

            // Approver track
            (R::Approver, S::Pending, A::Approve) => S::Approved,
            (R::Approver, S::Pending, A::Reject) => S::Rejected,

            // Authors hold a stage for bookkeeping only; everything else is invalid
            (role, from, action) => {
                return Err(StateMachineError::InvalidTransition { role, from, action })
            }
        };

        Ok(target)
    }

    /// Validate a transition against the table and every guard, returning the new status
    pub fn validate(&self, context: &TransitionContext<'_>) -> StateMachineResult<StageStatus> {
        let target = Self::determine_target_state(
            context.stage.role,
            context.stage.status,
            context.action,
        )?;

        for guard in &self.guards {
            if let Err(err) = guard.check(context) {
                tracing::debug!(
                    guard = guard.description(),
                    stage_id = %context.stage.stage_id,
                    action = %context.action,
                    "Stage transition guard rejected action"
                );
                return Err(err);
            }
        }

        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Participant, WorkflowStage};
    use uuid::Uuid;

    #[test]
    fn test_reviewer_transitions() {
        let target = |from, action| {
            StageStateMachine::determine_target_state(StageRole::Reviewer, from, action)
        };

        assert_eq!(
            target(StageStatus::Pending, StageAction::Review).unwrap(),
            StageStatus::InReview
        );
        assert_eq!(
            target(StageStatus::InReview, StageAction::ConfirmReview).unwrap(),
            StageStatus::Reviewed
        );
        assert_eq!(
            target(StageStatus::InReview, StageAction::NeedsCorrection).unwrap(),
            StageStatus::NeedsCorrection
        );
        assert_eq!(
            target(StageStatus::NeedsCorrection, StageAction::Review).unwrap(),
            StageStatus::InReview
        );
        assert_eq!(
            target(StageStatus::Reviewed, StageAction::NeedsCorrection).unwrap(),
            StageStatus::NeedsCorrection
        );
    }

    #[test]
    fn test_approver_transitions() {
        assert_eq!(
            StageStateMachine::determine_target_state(
                StageRole::Approver,
                StageStatus::Pending,
                StageAction::Approve
            )
            .unwrap(),
            StageStatus::Approved
        );
        assert_eq!(
            StageStateMachine::determine_target_state(
                StageRole::Approver,
                StageStatus::Pending,
                StageAction::Reject
            )
            .unwrap(),
            StageStatus::Rejected
        );
    }

    #[test]
    fn test_role_mismatches_are_invalid() {
        // Approvers cannot review, reviewers cannot approve
        assert!(StageStateMachine::determine_target_state(
            StageRole::Approver,
            StageStatus::Pending,
            StageAction::Review
        )
        .is_err());
        assert!(StageStateMachine::determine_target_state(
            StageRole::Reviewer,
            StageStatus::Reviewed,
            StageAction::Approve
        )
        .is_err());
        assert!(StageStateMachine::determine_target_state(
            StageRole::Author,
            StageStatus::Pending,
            StageAction::ConfirmReview
        )
        .is_err());
    }

    #[test]
    fn test_decisions_are_final_for_approvers() {
        let err = StageStateMachine::determine_target_state(
            StageRole::Approver,
            StageStatus::Rejected,
            StageAction::Approve,
        )
        .unwrap_err();
        assert_eq!(
            err,
            StateMachineError::InvalidTransition {
                role: StageRole::Approver,
                from: StageStatus::Rejected,
                action: StageAction::Approve,
            }
        );
    }

    #[test]
    fn test_validate_runs_guards() {
        let sop_id = Uuid::new_v4();
        let stages = vec![
            WorkflowStage::pending(sop_id, &Participant::reviewer("rev-1"), 0),
            WorkflowStage::pending(sop_id, &Participant::approver("app-1"), 1),
        ];
        let machine = StageStateMachine::new();

        let missing_comment = TransitionContext {
            stage: &stages[0],
            action: StageAction::NeedsCorrection,
            comment: None,
            siblings: &stages,
        };
        assert!(matches!(
            machine.validate(&missing_comment),
            Err(StateMachineError::CommentRequired { .. })
        ));

        let premature_approval = TransitionContext {
            stage: &stages[1],
            action: StageAction::Approve,
            comment: None,
            siblings: &stages,
        };
        assert!(matches!(
            machine.validate(&premature_approval),
            Err(StateMachineError::GuardFailed { .. })
        ));

        let review = TransitionContext {
            stage: &stages[0],
            action: StageAction::Review,
            comment: None,
            siblings: &stages,
        };
        assert_eq!(machine.validate(&review).unwrap(), StageStatus::InReview);
    }
}
