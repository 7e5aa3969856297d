//! # Data Model
//!
//! The SOP aggregate root, its per-participant workflow stages, and the comments
//! participants attach to their stages. Stages reference their SOP by id rather than
//! being embedded so that participants can update them independently.

pub mod comment;
pub mod sop;
pub mod workflow_stage;

// Re-export core models for easy access
pub use comment::{Comment, NewComment};
pub use sop::{Sop, SopMetadata, SopWithStages, Visibility};
pub use workflow_stage::{Participant, WorkflowStage};
