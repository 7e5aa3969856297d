//! SOP status derivation.
//!
//! The SOP status is a pure function of its full stage set. It is re-derived from
//! scratch after every stage mutation and never patched incrementally.

use super::states::{SopStatus, StageRole, StageStatus};
use crate::models::WorkflowStage;

/// Derive the aggregate SOP status from every stage belonging to it.
///
/// Rules, in order:
/// 1. any approver `Rejected` wins: `Rejected`
/// 2. any reviewer not yet `Reviewed`: `InReview`
/// 3. at least one approver and every approver `Approved`: `Approved`
/// 4. otherwise: `InApproval`
///
/// An empty stage set means the workflow has not started and yields `Draft`.
pub fn derive_status(stages: &[WorkflowStage]) -> SopStatus {
    if stages.is_empty() {
        return SopStatus::Draft;
    }

    let mut approvers = stages
        .iter()
        .filter(|s| s.role == StageRole::Approver)
        .peekable();

    if approvers
        .clone()
        .any(|s| s.status == StageStatus::Rejected)
    {
        return SopStatus::Rejected;
    }

    if !reviewers_complete(stages) {
        return SopStatus::InReview;
    }

    if approvers.peek().is_some() && approvers.all(|s| s.status == StageStatus::Approved) {
        SopStatus::Approved
    } else {
        SopStatus::InApproval
    }
}

/// True once every reviewer stage has reached `Reviewed`.
pub fn reviewers_complete(stages: &[WorkflowStage]) -> bool {
    stages
        .iter()
        .filter(|s| s.role == StageRole::Reviewer)
        .all(|s| s.status == StageStatus::Reviewed)
}

/// Number of reviewer stages still short of `Reviewed`.
pub fn outstanding_reviewers(stages: &[WorkflowStage]) -> usize {
    stages
        .iter()
        .filter(|s| s.role == StageRole::Reviewer && s.status != StageStatus::Reviewed)
        .count()
}

/// Publication gate: at least one approver, review complete, every approver `Approved`
/// and no stage `Rejected`. Agrees with `derive_status(stages) == Approved`.
pub fn is_fully_approved(stages: &[WorkflowStage]) -> bool {
    let mut approvers = stages
        .iter()
        .filter(|s| s.role == StageRole::Approver)
        .peekable();

    approvers.peek().is_some()
        && reviewers_complete(stages)
        && approvers.all(|s| s.status == StageStatus::Approved)
        && !stages.iter().any(|s| s.status == StageStatus::Rejected)
}
