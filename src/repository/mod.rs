//! # Persistence
//!
//! Narrow repository traits for the three stores the workflow core touches. Each
//! write is local and synchronous from the caller's perspective; nothing here spans a
//! transaction across stores. Serialization of the SOP status read-recompute-write
//! lives in [`crate::workflow::SopLockRegistry`], not in the stores.

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::WorkflowResult;
use crate::models::{Comment, NewComment, Sop, WorkflowStage};
use crate::state_machine::SopStatus;

pub use in_memory::{InMemoryCommentStore, InMemorySopRepository, InMemoryStageRepository};
#[cfg(feature = "postgres")]
pub use postgres::{PgCommentStore, PgSopRepository, PgStageRepository};

/// Storage for SOP aggregate rows
#[async_trait]
pub trait SopRepository: Send + Sync {
    async fn insert(&self, sop: &Sop) -> WorkflowResult<()>;

    async fn find(&self, sop_id: Uuid) -> WorkflowResult<Option<Sop>>;

    /// Persist a derived status, returning the updated row. NotFound if absent.
    async fn update_status(&self, sop_id: Uuid, status: SopStatus) -> WorkflowResult<Sop>;

    /// Delete the SOP row, returning whether it existed
    async fn delete(&self, sop_id: Uuid) -> WorkflowResult<bool>;
}

/// Storage for workflow stages, unique per (sop_id, user_id)
#[async_trait]
pub trait StageRepository: Send + Sync {
    /// Insert every stage or none. Conflict if any (sop_id, user_id) already exists.
    async fn insert_many(&self, stages: &[WorkflowStage]) -> WorkflowResult<()>;

    async fn find(&self, sop_id: Uuid, user_id: &str) -> WorkflowResult<Option<WorkflowStage>>;

    /// All stages of an SOP ordered by sequence
    async fn find_by_sop(&self, sop_id: Uuid) -> WorkflowResult<Vec<WorkflowStage>>;

    /// All stages assigned to a participant, across SOPs
    async fn find_by_user(&self, user_id: &str) -> WorkflowResult<Vec<WorkflowStage>>;

    /// Write the stage's status and updated_at. NotFound if absent.
    async fn save_status(&self, stage: &WorkflowStage) -> WorkflowResult<()>;

    /// Delete every stage of an SOP, returning the removed stage ids
    async fn delete_by_sop(&self, sop_id: Uuid) -> WorkflowResult<Vec<Uuid>>;
}

/// Append-only comment storage keyed by stage
#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn append(&self, comment: NewComment) -> WorkflowResult<Comment>;

    async fn find(&self, comment_id: Uuid) -> WorkflowResult<Option<Comment>>;

    /// Comments of a stage in creation order
    async fn list_for_stage(&self, stage_id: Uuid) -> WorkflowResult<Vec<Comment>>;

    /// Replace a comment's content. NotFound if absent.
    async fn update_content(&self, comment_id: Uuid, content: &str) -> WorkflowResult<Comment>;

    async fn delete(&self, comment_id: Uuid) -> WorkflowResult<bool>;

    /// Remove every comment attached to the given stages, returning how many were removed
    async fn delete_for_stages(&self, stage_ids: &[Uuid]) -> WorkflowResult<u64>;
}

/// The three stores bundled for wiring
#[derive(Clone)]
pub struct WorkflowStores {
    pub sops: Arc<dyn SopRepository>,
    pub stages: Arc<dyn StageRepository>,
    pub comments: Arc<dyn CommentStore>,
}

impl WorkflowStores {
    pub fn in_memory() -> Self {
        Self {
            sops: Arc::new(InMemorySopRepository::default()),
            stages: Arc::new(InMemoryStageRepository::default()),
            comments: Arc::new(InMemoryCommentStore::default()),
        }
    }

    #[cfg(feature = "postgres")]
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Self {
            sops: Arc::new(PgSopRepository::new(pool.clone())),
            stages: Arc::new(PgStageRepository::new(pool.clone())),
            comments: Arc::new(PgCommentStore::new(pool)),
        }
    }
}
