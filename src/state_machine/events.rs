use serde::{Deserialize, Serialize};
use std::fmt;

/// Actions a participant can submit against their stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageAction {
    /// Reviewer starts (or restarts) reviewing
    Review,
    /// Reviewer confirms the review
    ConfirmReview,
    /// Reviewer returns the document for correction, comment required
    NeedsCorrection,
    /// Approver approves
    Approve,
    /// Approver rejects
    Reject,
}

impl StageAction {
    /// Get a string representation of the action for logging
    pub fn action_type(&self) -> &'static str {
        match self {
            Self::Review => "review",
            Self::ConfirmReview => "confirm_review",
            Self::NeedsCorrection => "needs_correction",
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }

    /// Check if this action must be accompanied by a comment
    pub fn requires_comment(&self) -> bool {
        matches!(self, Self::NeedsCorrection)
    }

    /// Check if this action belongs to the approver track
    pub fn is_approver_action(&self) -> bool {
        matches!(self, Self::Approve | Self::Reject)
    }
}

impl fmt::Display for StageAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.action_type())
    }
}

impl std::str::FromStr for StageAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "review" => Ok(Self::Review),
            "confirm_review" => Ok(Self::ConfirmReview),
            "needs_correction" => Ok(Self::NeedsCorrection),
            "approve" => Ok(Self::Approve),
            "reject" => Ok(Self::Reject),
            _ => Err(format!("Unknown stage action: {s}")),
        }
    }
}
