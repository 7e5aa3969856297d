//! # Workflow Stage Model
//!
//! One stage per participant per SOP. The pair (`sop_id`, `user_id`) is unique and the
//! role never changes after creation; only `status` and `updated_at` move, and only
//! through the stage state machine.
//!
//! ## Database Schema
//!
//! Maps to `sop_workflow_stages`:
//! ```sql
//! CREATE TABLE sop_workflow_stages (
//!   stage_id UUID PRIMARY KEY,
//!   sop_id UUID NOT NULL REFERENCES sop_workflow_sops ON DELETE CASCADE,
//!   user_id TEXT NOT NULL,
//!   role TEXT NOT NULL,
//!   status TEXT NOT NULL DEFAULT 'pending',
//!   sequence INTEGER NOT NULL,
//!   created_at TIMESTAMPTZ NOT NULL,
//!   updated_at TIMESTAMPTZ NOT NULL,
//!   UNIQUE (sop_id, user_id)
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state_machine::{StageRole, StageStatus};

/// A participant to enroll in an SOP's workflow
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Participant {
    pub user_id: String,
    pub role: StageRole,
}

impl Participant {
    pub fn new(user_id: impl Into<String>, role: StageRole) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    pub fn author(user_id: impl Into<String>) -> Self {
        Self::new(user_id, StageRole::Author)
    }

    pub fn reviewer(user_id: impl Into<String>) -> Self {
        Self::new(user_id, StageRole::Reviewer)
    }

    pub fn approver(user_id: impl Into<String>) -> Self {
        Self::new(user_id, StageRole::Approver)
    }
}

/// A single participant's slot in an SOP's workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStage {
    pub stage_id: Uuid,
    pub sop_id: Uuid,
    pub user_id: String,
    pub role: StageRole,
    pub status: StageStatus,
    /// Creation order within the SOP
    pub sequence: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkflowStage {
    /// Build a pending stage for a participant
    pub fn pending(sop_id: Uuid, participant: &Participant, sequence: i32) -> Self {
        let now = Utc::now();
        Self {
            stage_id: Uuid::new_v4(),
            sop_id,
            user_id: participant.user_id.clone(),
            role: participant.role,
            status: StageStatus::Pending,
            sequence,
            created_at: now,
            updated_at: now,
        }
    }

    /// Copy of this stage moved to `status`
    pub fn with_status(&self, status: StageStatus) -> Self {
        Self {
            status,
            updated_at: Utc::now(),
            ..self.clone()
        }
    }
}
