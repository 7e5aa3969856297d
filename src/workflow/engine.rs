//! # Workflow Stage Engine
//!
//! Single source of truth for stage state and for deriving SOP status from it.
//!
//! The engine never writes the SOP row. After every stage mutation it re-reads the
//! SOP's full stage set and reports the derived status; the caller persists it while
//! holding the SOP's lock.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::error::{WorkflowError, WorkflowResult};
use crate::logging::log_stage_operation;
use crate::models::{Comment, NewComment, Participant, WorkflowStage};
use crate::repository::{CommentStore, StageRepository};
use crate::state_machine::{
    derive_status, is_fully_approved, SopStatus, StageAction, StageRole, StageStateMachine,
    TransitionContext,
};

/// Outcome of a single participant action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageTransition {
    /// The stage after the action was applied
    pub stage: WorkflowStage,
    /// The comment recorded alongside the action, if any
    pub comment: Option<Comment>,
    /// SOP status derived from the full stage set after the write
    pub derived_status: SopStatus,
}

pub struct WorkflowStageEngine {
    stages: Arc<dyn StageRepository>,
    comments: Arc<dyn CommentStore>,
    state_machine: StageStateMachine,
}

impl WorkflowStageEngine {
    pub fn new(stages: Arc<dyn StageRepository>, comments: Arc<dyn CommentStore>) -> Self {
        Self {
            stages,
            comments,
            state_machine: StageStateMachine::new(),
        }
    }

    /// Create one pending stage per participant.
    ///
    /// The list must contain at least one reviewer and one approver and name each
    /// participant once. Fails with Conflict if any participant already has a stage
    /// for this SOP; nothing is written in that case.
    #[instrument(skip_all, fields(sop_id = %sop_id, count = participants.len()))]
    pub async fn create_stages(
        &self,
        sop_id: Uuid,
        participants: &[Participant],
    ) -> WorkflowResult<Vec<WorkflowStage>> {
        if participants.is_empty() {
            return Err(WorkflowError::bad_request("Participant list is empty"));
        }
        for role in [StageRole::Reviewer, StageRole::Approver] {
            if !participants.iter().any(|p| p.role == role) {
                return Err(WorkflowError::bad_request(format!(
                    "At least one {role} is required"
                )));
            }
        }

        let mut seen = HashSet::with_capacity(participants.len());
        if let Some(duplicate) = participants
            .iter()
            .find(|p| !seen.insert(p.user_id.as_str()))
        {
            return Err(WorkflowError::conflict(format!(
                "Participant {} is listed more than once for SOP {sop_id}",
                duplicate.user_id
            )));
        }

        let stages: Vec<WorkflowStage> = participants
            .iter()
            .enumerate()
            .map(|(sequence, participant)| {
                WorkflowStage::pending(sop_id, participant, sequence as i32)
            })
            .collect();

        self.stages.insert_many(&stages).await?;

        info!(sop_id = %sop_id, stages = stages.len(), "Workflow stages created");
        Ok(stages)
    }

    /// Apply a participant action to their stage and re-derive the SOP status.
    #[instrument(skip_all, fields(sop_id = %sop_id, user_id = %user_id, action = %action))]
    pub async fn transition_stage(
        &self,
        sop_id: Uuid,
        user_id: &str,
        action: StageAction,
        comment: Option<&str>,
    ) -> WorkflowResult<StageTransition> {
        let stage = self.get_stage(sop_id, user_id).await?;
        let siblings = self.stages.find_by_sop(sop_id).await?;

        let context = TransitionContext {
            stage: &stage,
            action,
            comment,
            siblings: &siblings,
        };
        let target = self.state_machine.validate(&context)?;
        let trimmed_comment = context.trimmed_comment().map(str::to_string);

        let updated = stage.with_status(target);
        self.stages.save_status(&updated).await?;

        let comment = match trimmed_comment {
            Some(content) => Some(
                self.comments
                    .append(NewComment {
                        stage_id: updated.stage_id,
                        user_id: user_id.to_string(),
                        content,
                    })
                    .await?,
            ),
            None => None,
        };

        let derived_status = self.derive_sop_status(sop_id).await?;

        log_stage_operation(
            "transition_stage",
            sop_id,
            user_id,
            Some(action.action_type()),
            &updated.status.to_string(),
            Some(&format!("from={} derived_sop_status={derived_status}", stage.status)),
        );

        Ok(StageTransition {
            stage: updated,
            comment,
            derived_status,
        })
    }

    /// Derive the SOP status from the stages currently persisted
    pub async fn derive_sop_status(&self, sop_id: Uuid) -> WorkflowResult<SopStatus> {
        let stages = self.stages.find_by_sop(sop_id).await?;
        Ok(derive_status(&stages))
    }

    /// Publication gate. NotFound if the SOP has no stages.
    pub async fn is_sop_fully_approved(&self, sop_id: Uuid) -> WorkflowResult<bool> {
        let stages = self.stages.find_by_sop(sop_id).await?;
        if stages.is_empty() {
            return Err(WorkflowError::not_found("SOP workflow", sop_id));
        }
        Ok(is_fully_approved(&stages))
    }

    pub async fn get_stage(&self, sop_id: Uuid, user_id: &str) -> WorkflowResult<WorkflowStage> {
        self.stages
            .find(sop_id, user_id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("Workflow stage", format!("{sop_id}/{user_id}")))
    }

    pub async fn get_stages_for_sop(&self, sop_id: Uuid) -> WorkflowResult<Vec<WorkflowStage>> {
        self.stages.find_by_sop(sop_id).await
    }

    pub async fn get_stages_for_user(&self, user_id: &str) -> WorkflowResult<Vec<WorkflowStage>> {
        self.stages.find_by_user(user_id).await
    }

    pub async fn comments_for_stage(&self, stage_id: Uuid) -> WorkflowResult<Vec<Comment>> {
        self.comments.list_for_stage(stage_id).await
    }

    /// A participant's stage together with its comments
    pub async fn stage_with_comments(
        &self,
        sop_id: Uuid,
        user_id: &str,
    ) -> WorkflowResult<(WorkflowStage, Vec<Comment>)> {
        let stage = self.get_stage(sop_id, user_id).await?;
        let comments = self.comments.list_for_stage(stage.stage_id).await?;
        Ok((stage, comments))
    }

    /// Replace a comment's text. Only its author may do so; stage state is untouched.
    pub async fn edit_comment(
        &self,
        comment_id: Uuid,
        user_id: &str,
        content: &str,
    ) -> WorkflowResult<Comment> {
        let content = content.trim();
        if content.is_empty() {
            return Err(WorkflowError::bad_request("Comment content cannot be empty"));
        }
        self.authored_comment(comment_id, user_id).await?;
        self.comments.update_content(comment_id, content).await
    }

    /// Delete a comment. Only its author may do so; stage state is untouched.
    pub async fn delete_comment(&self, comment_id: Uuid, user_id: &str) -> WorkflowResult<()> {
        self.authored_comment(comment_id, user_id).await?;
        if !self.comments.delete(comment_id).await? {
            return Err(WorkflowError::not_found("Comment", comment_id));
        }
        Ok(())
    }

    /// Remove every stage of an SOP and the comments attached to them
    pub async fn delete_stages_for_sop(&self, sop_id: Uuid) -> WorkflowResult<usize> {
        let stage_ids = self.stages.delete_by_sop(sop_id).await?;
        let removed_comments = self.comments.delete_for_stages(&stage_ids).await?;
        debug!(
            sop_id = %sop_id,
            stages = stage_ids.len(),
            comments = removed_comments,
            "Deleted workflow stages"
        );
        Ok(stage_ids.len())
    }

    async fn authored_comment(&self, comment_id: Uuid, user_id: &str) -> WorkflowResult<Comment> {
        let comment = self
            .comments
            .find(comment_id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("Comment", comment_id))?;

        if comment.user_id != user_id {
            return Err(WorkflowError::bad_request(format!(
                "Comment {comment_id} can only be changed by its author"
            )));
        }
        Ok(comment)
    }
}
