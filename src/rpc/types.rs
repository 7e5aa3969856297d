//! Wire shapes of the two read operations exposed to other services.
//!
//! Field names are camelCase to match the consumers' contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, WorkflowError};
use crate::models::Comment;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IsSopApprovedRequest {
    pub sop_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IsSopApprovedResponse {
    pub success: bool,
    pub sop_approved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl IsSopApprovedResponse {
    pub fn approved(sop_approved: bool) -> Self {
        Self {
            success: true,
            sop_approved,
            error_message: None,
            error_kind: None,
        }
    }

    pub fn failure(error: &WorkflowError) -> Self {
        Self {
            success: false,
            sop_approved: false,
            error_message: Some(error.to_string()),
            error_kind: Some(error.kind()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetWorkflowStageInfoRequest {
    pub sop_id: String,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageComment {
    pub comment_id: String,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl From<Comment> for StageComment {
    fn from(comment: Comment) -> Self {
        Self {
            comment_id: comment.comment_id.to_string(),
            comment: comment.content,
            created_at: comment.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStageInfoResponse {
    pub success: bool,
    /// Stage status in its snake_case wire form; empty on failure
    pub status: String,
    pub comments: Vec<StageComment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl WorkflowStageInfoResponse {
    pub fn failure(error: &WorkflowError) -> Self {
        Self {
            success: false,
            status: String::new(),
            comments: Vec::new(),
            error_message: Some(error.to_string()),
            error_kind: Some(error.kind()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_responses_use_camel_case() {
        let json = serde_json::to_value(IsSopApprovedResponse::approved(true)).unwrap();
        assert_eq!(json["sopApproved"], true);
        assert!(json.get("errorMessage").is_none());

        let failure =
            WorkflowStageInfoResponse::failure(&WorkflowError::not_found("SOP", "abc"));
        let json = serde_json::to_value(failure).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["errorKind"], "not_found");
        assert!(json["errorMessage"].as_str().unwrap().contains("abc"));
    }
}
