use proptest::prelude::*;
use uuid::Uuid;

use sop_workflow::models::{Participant, WorkflowStage};
use sop_workflow::{StageAction, StageRole, StageStatus};

/// Any status a reviewer stage can hold
pub fn reviewer_status_strategy() -> impl Strategy<Value = StageStatus> {
    prop_oneof![
        Just(StageStatus::Pending),
        Just(StageStatus::InReview),
        Just(StageStatus::Reviewed),
        Just(StageStatus::NeedsCorrection),
    ]
}

/// Any status an approver stage can hold
pub fn approver_status_strategy() -> impl Strategy<Value = StageStatus> {
    prop_oneof![
        Just(StageStatus::Pending),
        Just(StageStatus::Approved),
        Just(StageStatus::Rejected),
    ]
}

pub fn stage_action_strategy() -> impl Strategy<Value = StageAction> {
    prop_oneof![
        Just(StageAction::Review),
        Just(StageAction::ConfirmReview),
        Just(StageAction::NeedsCorrection),
        Just(StageAction::Approve),
        Just(StageAction::Reject),
    ]
}

pub fn role_strategy() -> impl Strategy<Value = StageRole> {
    prop_oneof![
        Just(StageRole::Author),
        Just(StageRole::Reviewer),
        Just(StageRole::Approver),
    ]
}

pub fn any_status_strategy() -> impl Strategy<Value = StageStatus> {
    prop_oneof![
        Just(StageStatus::Pending),
        Just(StageStatus::InReview),
        Just(StageStatus::Reviewed),
        Just(StageStatus::NeedsCorrection),
        Just(StageStatus::Approved),
        Just(StageStatus::Rejected),
    ]
}

/// A well-formed stage set: one author, 1..=5 reviewers, 1..=3 approvers, in
/// arbitrary reachable statuses
pub fn stage_set_strategy() -> impl Strategy<Value = Vec<WorkflowStage>> {
    (
        prop::collection::vec(reviewer_status_strategy(), 1..=5),
        prop::collection::vec(approver_status_strategy(), 1..=3),
    )
        .prop_map(|(reviewers, approvers)| {
            let sop_id = Uuid::new_v4();
            let mut stages = vec![WorkflowStage::pending(sop_id, &Participant::author("author"), 0)];
            for (i, status) in reviewers.into_iter().enumerate() {
                let participant = Participant::reviewer(format!("rev-{i}"));
                stages.push(
                    WorkflowStage::pending(sop_id, &participant, stages.len() as i32)
                        .with_status(status),
                );
            }
            for (i, status) in approvers.into_iter().enumerate() {
                let participant = Participant::approver(format!("app-{i}"));
                stages.push(
                    WorkflowStage::pending(sop_id, &participant, stages.len() as i32)
                        .with_status(status),
                );
            }
            stages
        })
}
