use serde::{Deserialize, Serialize};
use std::fmt;

/// Aggregate status of an SOP, derived from its workflow stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SopStatus {
    /// Initial state before any stage exists
    Draft,
    /// Reviewers are still outstanding
    InReview,
    /// All reviewers are done, approvers pending
    InApproval,
    /// Every approver approved
    Approved,
    /// An approver rejected the document
    Rejected,
}

impl SopStatus {
    /// Check if this is a terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// Check if participants may still act on the SOP
    pub fn accepts_actions(&self) -> bool {
        matches!(self, Self::InReview | Self::InApproval)
    }
}

impl fmt::Display for SopStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::InReview => write!(f, "in_review"),
            Self::InApproval => write!(f, "in_approval"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for SopStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "in_review" => Ok(Self::InReview),
            "in_approval" => Ok(Self::InApproval),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(format!("Invalid SOP status: {s}")),
        }
    }
}

/// Approval status of a single participant's stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    /// Initial state when the stage is created
    Pending,
    /// Reviewer has started reviewing
    InReview,
    /// Reviewer confirmed the review
    Reviewed,
    /// Reviewer returned the document for correction
    NeedsCorrection,
    /// Approver approved
    Approved,
    /// Approver rejected
    Rejected,
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::InReview => write!(f, "in_review"),
            Self::Reviewed => write!(f, "reviewed"),
            Self::NeedsCorrection => write!(f, "needs_correction"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for StageStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "in_review" => Ok(Self::InReview),
            "reviewed" => Ok(Self::Reviewed),
            "needs_correction" => Ok(Self::NeedsCorrection),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(format!("Invalid stage status: {s}")),
        }
    }
}

/// Role a participant plays in the workflow. Immutable once a stage exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageRole {
    Author,
    Reviewer,
    Approver,
}

impl fmt::Display for StageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Author => write!(f, "author"),
            Self::Reviewer => write!(f, "reviewer"),
            Self::Approver => write!(f, "approver"),
        }
    }
}

impl std::str::FromStr for StageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "author" => Ok(Self::Author),
            "reviewer" => Ok(Self::Reviewer),
            "approver" => Ok(Self::Approver),
            _ => Err(format!("Invalid stage role: {s}")),
        }
    }
}

/// Default state for new SOPs
impl Default for SopStatus {
    fn default() -> Self {
        Self::Draft
    }
}

/// Default state for new stages
impl Default for StageStatus {
    fn default() -> Self {
        Self::Pending
    }
}
