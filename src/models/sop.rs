//! # SOP Model
//!
//! The aggregate root of the workflow. Its `status` is never assigned from caller
//! input: it is always the result of deriving over the SOP's current stage set.
//!
//! ## Database Schema
//!
//! Maps to `sop_workflow_sops`:
//! ```sql
//! CREATE TABLE sop_workflow_sops (
//!   sop_id UUID PRIMARY KEY,
//!   title TEXT NOT NULL,
//!   category_id TEXT NOT NULL,
//!   visibility TEXT NOT NULL,
//!   department_id TEXT,
//!   initiator_id TEXT NOT NULL,
//!   status TEXT NOT NULL DEFAULT 'draft',
//!   created_at TIMESTAMPTZ NOT NULL,
//!   updated_at TIMESTAMPTZ NOT NULL
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::workflow_stage::WorkflowStage;
use crate::state_machine::SopStatus;

/// Who may see the SOP once published
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    Department,
    Private,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::Department => write!(f, "department"),
            Self::Private => write!(f, "private"),
        }
    }
}

impl std::str::FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Self::Public),
            "department" => Ok(Self::Department),
            "private" => Ok(Self::Private),
            _ => Err(format!("Invalid visibility: {s}")),
        }
    }
}

/// Caller-supplied metadata for a new SOP
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SopMetadata {
    pub title: String,
    pub category_id: String,
    #[serde(default)]
    pub visibility: Visibility,
    pub department_id: Option<String>,
}

/// A Standard Operating Procedure moving through review and approval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sop {
    pub sop_id: Uuid,
    pub title: String,
    pub category_id: String,
    pub visibility: Visibility,
    pub department_id: Option<String>,
    pub initiator_id: String,
    pub status: SopStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Sop {
    /// Build a fresh draft SOP from caller metadata
    pub fn draft(metadata: SopMetadata, initiator_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            sop_id: Uuid::new_v4(),
            title: metadata.title,
            category_id: metadata.category_id,
            visibility: metadata.visibility,
            department_id: metadata.department_id,
            initiator_id: initiator_id.into(),
            status: SopStatus::Draft,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// An SOP together with its stage list, for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SopWithStages {
    #[serde(flatten)]
    pub sop: Sop,
    pub stages: Vec<WorkflowStage>,
}
