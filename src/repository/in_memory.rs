//! # In-Memory Stores
//!
//! Thread-safe in-memory repositories for tests and embedded use. Locks are
//! `parking_lot::RwLock` and are never held across an `.await`.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use super::{CommentStore, SopRepository, StageRepository};
use crate::error::{WorkflowError, WorkflowResult};
use crate::models::{Comment, NewComment, Sop, WorkflowStage};
use crate::state_machine::SopStatus;

#[derive(Debug, Default)]
pub struct InMemorySopRepository {
    sops: RwLock<HashMap<Uuid, Sop>>,
}

#[async_trait]
impl SopRepository for InMemorySopRepository {
    async fn insert(&self, sop: &Sop) -> WorkflowResult<()> {
        let mut sops = self.sops.write();
        if sops.contains_key(&sop.sop_id) {
            return Err(WorkflowError::conflict(format!(
                "SOP {} already exists",
                sop.sop_id
            )));
        }
        sops.insert(sop.sop_id, sop.clone());
        Ok(())
    }

    async fn find(&self, sop_id: Uuid) -> WorkflowResult<Option<Sop>> {
        Ok(self.sops.read().get(&sop_id).cloned())
    }

    async fn update_status(&self, sop_id: Uuid, status: SopStatus) -> WorkflowResult<Sop> {
        let mut sops = self.sops.write();
        let sop = sops
            .get_mut(&sop_id)
            .ok_or_else(|| WorkflowError::not_found("SOP", sop_id))?;
        sop.status = status;
        sop.updated_at = Utc::now();
        Ok(sop.clone())
    }

    async fn delete(&self, sop_id: Uuid) -> WorkflowResult<bool> {
        Ok(self.sops.write().remove(&sop_id).is_some())
    }
}

#[derive(Debug, Default)]
struct StageTable {
    by_id: HashMap<Uuid, WorkflowStage>,
    by_participant: HashMap<(Uuid, String), Uuid>,
}

#[derive(Debug, Default)]
pub struct InMemoryStageRepository {
    table: RwLock<StageTable>,
}

#[async_trait]
impl StageRepository for InMemoryStageRepository {
    async fn insert_many(&self, stages: &[WorkflowStage]) -> WorkflowResult<()> {
        let mut table = self.table.write();

        // Validate the whole batch before touching the table
        let mut batch_keys = Vec::with_capacity(stages.len());
        for stage in stages {
            let key = (stage.sop_id, stage.user_id.clone());
            if table.by_participant.contains_key(&key) || batch_keys.contains(&key) {
                return Err(WorkflowError::conflict(format!(
                    "Stage already exists for SOP {} and participant {}",
                    stage.sop_id, stage.user_id
                )));
            }
            batch_keys.push(key);
        }

        for (stage, key) in stages.iter().zip(batch_keys) {
            table.by_participant.insert(key, stage.stage_id);
            table.by_id.insert(stage.stage_id, stage.clone());
        }
        Ok(())
    }

    async fn find(&self, sop_id: Uuid, user_id: &str) -> WorkflowResult<Option<WorkflowStage>> {
        let table = self.table.read();
        Ok(table
            .by_participant
            .get(&(sop_id, user_id.to_string()))
            .and_then(|stage_id| table.by_id.get(stage_id))
            .cloned())
    }

    async fn find_by_sop(&self, sop_id: Uuid) -> WorkflowResult<Vec<WorkflowStage>> {
        let mut stages: Vec<WorkflowStage> = self
            .table
            .read()
            .by_id
            .values()
            .filter(|s| s.sop_id == sop_id)
            .cloned()
            .collect();
        stages.sort_by_key(|s| s.sequence);
        Ok(stages)
    }

    async fn find_by_user(&self, user_id: &str) -> WorkflowResult<Vec<WorkflowStage>> {
        let mut stages: Vec<WorkflowStage> = self
            .table
            .read()
            .by_id
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        stages.sort_by_key(|s| s.created_at);
        Ok(stages)
    }

    async fn save_status(&self, stage: &WorkflowStage) -> WorkflowResult<()> {
        let mut table = self.table.write();
        let stored = table
            .by_id
            .get_mut(&stage.stage_id)
            .ok_or_else(|| WorkflowError::not_found("Workflow stage", stage.stage_id))?;
        stored.status = stage.status;
        stored.updated_at = stage.updated_at;
        Ok(())
    }

    async fn delete_by_sop(&self, sop_id: Uuid) -> WorkflowResult<Vec<Uuid>> {
        let mut table = self.table.write();
        let removed: Vec<Uuid> = table
            .by_id
            .values()
            .filter(|s| s.sop_id == sop_id)
            .map(|s| s.stage_id)
            .collect();

        for stage_id in &removed {
            table.by_id.remove(stage_id);
        }
        table.by_participant.retain(|(owner, _), _| *owner != sop_id);
        Ok(removed)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryCommentStore {
    comments: RwLock<Vec<Comment>>,
}

#[async_trait]
impl CommentStore for InMemoryCommentStore {
    async fn append(&self, comment: NewComment) -> WorkflowResult<Comment> {
        let comment = comment.into_comment();
        self.comments.write().push(comment.clone());
        Ok(comment)
    }

    async fn find(&self, comment_id: Uuid) -> WorkflowResult<Option<Comment>> {
        Ok(self
            .comments
            .read()
            .iter()
            .find(|c| c.comment_id == comment_id)
            .cloned())
    }

    async fn list_for_stage(&self, stage_id: Uuid) -> WorkflowResult<Vec<Comment>> {
        Ok(self
            .comments
            .read()
            .iter()
            .filter(|c| c.stage_id == stage_id)
            .cloned()
            .collect())
    }

    async fn update_content(&self, comment_id: Uuid, content: &str) -> WorkflowResult<Comment> {
        let mut comments = self.comments.write();
        let comment = comments
            .iter_mut()
            .find(|c| c.comment_id == comment_id)
            .ok_or_else(|| WorkflowError::not_found("Comment", comment_id))?;
        comment.content = content.to_string();
        comment.updated_at = Some(Utc::now());
        Ok(comment.clone())
    }

    async fn delete(&self, comment_id: Uuid) -> WorkflowResult<bool> {
        let mut comments = self.comments.write();
        let before = comments.len();
        comments.retain(|c| c.comment_id != comment_id);
        Ok(comments.len() != before)
    }

    async fn delete_for_stages(&self, stage_ids: &[Uuid]) -> WorkflowResult<u64> {
        let mut comments = self.comments.write();
        let before = comments.len();
        comments.retain(|c| !stage_ids.contains(&c.stage_id));
        Ok((before - comments.len()) as u64)
    }
}
