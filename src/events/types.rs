use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::constants::events::{SOP_APPROVED, SOP_CREATED, SOP_REJECTED, SOP_REVIEWAL_READY};
use crate::models::Sop;
use crate::state_machine::SopStatus;

/// Milestones published to other services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SopEventKind {
    #[serde(rename = "sop-created")]
    SopCreated,
    #[serde(rename = "sop-reviewal-ready")]
    SopReviewalReady,
    #[serde(rename = "sop-approved")]
    SopApproved,
    #[serde(rename = "sop-rejected")]
    SopRejected,
}

impl SopEventKind {
    /// Topic name on the messaging transport
    pub fn topic(&self) -> &'static str {
        match self {
            Self::SopCreated => SOP_CREATED,
            Self::SopReviewalReady => SOP_REVIEWAL_READY,
            Self::SopApproved => SOP_APPROVED,
            Self::SopRejected => SOP_REJECTED,
        }
    }

    /// Stage-driven milestone reached by moving from `previous` to `next`, if any.
    ///
    /// Only transitions into `InApproval`, `Approved` or `Rejected` are announced.
    pub fn for_transition(previous: SopStatus, next: SopStatus) -> Option<Self> {
        if previous == next {
            return None;
        }
        match next {
            SopStatus::InApproval => Some(Self::SopReviewalReady),
            SopStatus::Approved => Some(Self::SopApproved),
            SopStatus::Rejected => Some(Self::SopRejected),
            SopStatus::Draft | SopStatus::InReview => None,
        }
    }

    /// Every milestone a status write from `previous` to `next` announces, in order.
    ///
    /// Leaving `Draft` means the SOP's stages exist, which is announced as
    /// `SopCreated` ahead of any stage-driven milestone the same write reached.
    pub fn milestones(previous: SopStatus, next: SopStatus) -> Vec<Self> {
        let mut kinds = Vec::with_capacity(2);
        if previous == SopStatus::Draft && next != SopStatus::Draft {
            kinds.push(Self::SopCreated);
        }
        kinds.extend(Self::for_transition(previous, next));
        kinds
    }
}

impl fmt::Display for SopEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.topic())
    }
}

/// Event payload: the SOP's full metadata at the time of the milestone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SopLifecycleEvent {
    pub event_id: Uuid,
    pub kind: SopEventKind,
    pub sop: Sop,
    pub occurred_at: DateTime<Utc>,
}

impl SopLifecycleEvent {
    pub fn new(kind: SopEventKind, sop: Sop) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            kind,
            sop,
            occurred_at: Utc::now(),
        }
    }

    pub fn topic(&self) -> &'static str {
        self.kind.topic()
    }
}
