//! # RPC Facade
//!
//! The two read operations other services call: the publication gate
//! (`IsSopApproved`) and a participant's stage view (`GetWorkflowStageInfo`).

pub mod facade;
pub mod types;

pub use facade::WorkflowRpcService;
pub use types::{
    GetWorkflowStageInfoRequest, IsSopApprovedRequest, IsSopApprovedResponse, StageComment,
    WorkflowStageInfoResponse,
};
