mod common;

use common::{SopRequestBuilder, TestHarness};
use uuid::Uuid;

use sop_workflow::rpc::{GetWorkflowStageInfoRequest, IsSopApprovedRequest};
use sop_workflow::{ErrorKind, SopStatus, StageAction, WorkflowRpcService};

fn approved_request(sop_id: impl ToString) -> IsSopApprovedRequest {
    IsSopApprovedRequest {
        sop_id: sop_id.to_string(),
    }
}

#[tokio::test]
async fn test_is_sop_approved_follows_the_workflow() {
    let harness = TestHarness::new();
    let service = &harness.service;
    let rpc = WorkflowRpcService::new(service.engine());
    let sop = service
        .initiate_sop(SopRequestBuilder::new().with_reviewers(&["rev-1"]).build())
        .await
        .unwrap();

    let response = rpc.is_sop_approved(approved_request(sop.sop_id)).await;
    assert!(response.success);
    assert!(!response.sop_approved);

    service
        .submit_stage_action(sop.sop_id, "rev-1", StageAction::ConfirmReview, None)
        .await
        .unwrap();
    service
        .submit_stage_action(sop.sop_id, "app-1", StageAction::Approve, None)
        .await
        .unwrap();

    // Read-only and repeatable
    for _ in 0..3 {
        let response = rpc.is_sop_approved(approved_request(sop.sop_id)).await;
        assert!(response.success);
        assert!(response.sop_approved);
        assert!(response.error_message.is_none());
    }
}

#[tokio::test]
async fn test_is_sop_approved_reports_structured_failures() {
    let harness = TestHarness::new();
    let rpc = WorkflowRpcService::new(harness.service.engine());

    let response = rpc.is_sop_approved(approved_request("definitely-not-a-uuid")).await;
    assert!(!response.success);
    assert!(!response.sop_approved);
    assert_eq!(response.error_kind, Some(ErrorKind::BadRequest));

    let response = rpc.is_sop_approved(approved_request(Uuid::new_v4())).await;
    assert!(!response.success);
    assert_eq!(response.error_kind, Some(ErrorKind::NotFound));
    assert!(response.error_message.is_some());
}

#[tokio::test]
async fn test_stage_info_returns_status_and_comments() {
    let harness = TestHarness::new();
    let service = &harness.service;
    let rpc = WorkflowRpcService::new(service.engine());
    let sop = service
        .initiate_sop(SopRequestBuilder::new().build())
        .await
        .unwrap();

    service
        .submit_stage_action(
            sop.sop_id,
            "rev-1",
            StageAction::NeedsCorrection,
            Some("Add the emergency contact list"),
        )
        .await
        .unwrap();
    service
        .submit_stage_action(sop.sop_id, "rev-1", StageAction::Review, Some("Re-reading now"))
        .await
        .unwrap();

    let response = rpc
        .get_workflow_stage_info(GetWorkflowStageInfoRequest {
            sop_id: sop.sop_id.to_string(),
            user_id: "rev-1".to_string(),
        })
        .await;

    assert!(response.success);
    assert_eq!(response.status, "in_review");
    let comments: Vec<&str> = response.comments.iter().map(|c| c.comment.as_str()).collect();
    assert_eq!(
        comments,
        vec!["Add the emergency contact list", "Re-reading now"]
    );

    let json = serde_json::to_value(&response).unwrap();
    assert!(json["comments"][0]["commentId"].is_string());
    assert!(json["comments"][0]["createdAt"].is_string());
}

#[tokio::test]
async fn test_stage_info_for_unknown_participant() {
    let harness = TestHarness::new();
    let service = &harness.service;
    let rpc = WorkflowRpcService::new(service.engine());
    let sop = service
        .initiate_sop(SopRequestBuilder::new().build())
        .await
        .unwrap();

    let response = rpc
        .get_workflow_stage_info(GetWorkflowStageInfoRequest {
            sop_id: sop.sop_id.to_string(),
            user_id: "stranger".to_string(),
        })
        .await;
    assert!(!response.success);
    assert!(response.status.is_empty());
    assert!(response.comments.is_empty());
    assert_eq!(response.error_kind, Some(ErrorKind::NotFound));

    let response = rpc
        .get_workflow_stage_info(GetWorkflowStageInfoRequest {
            sop_id: sop.sop_id.to_string(),
            user_id: "  ".to_string(),
        })
        .await;
    assert_eq!(response.error_kind, Some(ErrorKind::BadRequest));
}

#[tokio::test]
async fn test_stage_info_is_repeatable() {
    let harness = TestHarness::new();
    let service = &harness.service;
    let rpc = WorkflowRpcService::new(service.engine());
    let sop = service
        .initiate_sop(SopRequestBuilder::new().build())
        .await
        .unwrap();
    service
        .submit_stage_action(
            sop.sop_id,
            "rev-1",
            StageAction::NeedsCorrection,
            Some("Torque values missing from step 4"),
        )
        .await
        .unwrap();

    let request = GetWorkflowStageInfoRequest {
        sop_id: sop.sop_id.to_string(),
        user_id: "rev-1".to_string(),
    };
    let first = rpc.get_workflow_stage_info(request.clone()).await;
    let second = rpc.get_workflow_stage_info(request).await;

    assert!(first.success);
    assert_eq!(first.comments.len(), 1);
    assert_eq!(first, second);
    assert_eq!(first.comments[0].comment_id, second.comments[0].comment_id);
    assert_eq!(first.comments[0].created_at, second.comments[0].created_at);

    // Reads leave the aggregate untouched
    let stored = service.get_sop(sop.sop_id).await.unwrap();
    assert_eq!(stored.sop.status, SopStatus::InReview);
}
