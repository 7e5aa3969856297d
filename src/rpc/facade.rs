use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, warn};
use uuid::Uuid;

use super::types::{
    GetWorkflowStageInfoRequest, IsSopApprovedRequest, IsSopApprovedResponse,
    WorkflowStageInfoResponse,
};
use crate::error::{WorkflowError, WorkflowResult};
use crate::workflow::WorkflowStageEngine;

/// Stateless read-only RPC surface over the stage engine.
///
/// Handlers never return an error or unwind: every failure, including a panic in
/// the layers below, becomes a `success: false` response.
#[derive(Clone)]
pub struct WorkflowRpcService {
    engine: Arc<WorkflowStageEngine>,
}

impl WorkflowRpcService {
    pub fn new(engine: Arc<WorkflowStageEngine>) -> Self {
        Self { engine }
    }

    pub async fn is_sop_approved(&self, request: IsSopApprovedRequest) -> IsSopApprovedResponse {
        let result = guarded("is_sop_approved", async {
            let sop_id = parse_id("sopId", &request.sop_id)?;
            self.engine.is_sop_fully_approved(sop_id).await
        })
        .await;

        match result {
            Ok(approved) => {
                debug!(sop_id = %request.sop_id, approved, "IsSopApproved served");
                IsSopApprovedResponse::approved(approved)
            }
            Err(e) => {
                log_failure("is_sop_approved", &e);
                IsSopApprovedResponse::failure(&e)
            }
        }
    }

    pub async fn get_workflow_stage_info(
        &self,
        request: GetWorkflowStageInfoRequest,
    ) -> WorkflowStageInfoResponse {
        let result = guarded("get_workflow_stage_info", async {
            let sop_id = parse_id("sopId", &request.sop_id)?;
            if request.user_id.trim().is_empty() {
                return Err(WorkflowError::bad_request("userId cannot be empty"));
            }
            self.engine.stage_with_comments(sop_id, &request.user_id).await
        })
        .await;

        match result {
            Ok((stage, comments)) => WorkflowStageInfoResponse {
                success: true,
                status: stage.status.to_string(),
                comments: comments.into_iter().map(Into::into).collect(),
                error_message: None,
                error_kind: None,
            },
            Err(e) => {
                log_failure("get_workflow_stage_info", &e);
                WorkflowStageInfoResponse::failure(&e)
            }
        }
    }
}

fn parse_id(field: &str, raw: &str) -> WorkflowResult<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|e| WorkflowError::bad_request(format!("Invalid {field} '{raw}': {e}")))
}

/// Run a handler body, converting a panic into an Internal error
async fn guarded<T, F>(operation: &'static str, body: F) -> WorkflowResult<T>
where
    F: Future<Output = WorkflowResult<T>>,
{
    match AssertUnwindSafe(body).catch_unwind().await {
        Ok(result) => result,
        Err(_) => {
            error!(operation, "RPC handler panicked");
            Err(WorkflowError::internal(format!("{operation} failed unexpectedly")))
        }
    }
}

fn log_failure(operation: &'static str, error: &WorkflowError) {
    if error.is_caller_error() {
        warn!(operation, kind = %error.kind(), error = %error, "RPC request rejected");
    } else {
        error!(operation, kind = %error.kind(), error = %error, "RPC request failed");
    }
}
