//! # Comment Model
//!
//! Feedback attached to a workflow stage. Comments are append-only as far as the
//! workflow is concerned; author-restricted edits and deletes never touch stage state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub comment_id: Uuid,
    pub stage_id: Uuid,
    pub user_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// New Comment for creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
    pub stage_id: Uuid,
    pub user_id: String,
    pub content: String,
}

impl NewComment {
    pub fn into_comment(self) -> Comment {
        Comment {
            comment_id: Uuid::new_v4(),
            stage_id: self.stage_id,
            user_id: self.user_id,
            content: self.content,
            created_at: Utc::now(),
            updated_at: None,
        }
    }
}
