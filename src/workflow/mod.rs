//! # Workflow Stage Engine
//!
//! Stage persistence, transitions, status derivation and the per-SOP serialization
//! primitive used by the aggregate service.

pub mod engine;
pub mod lock;

pub use engine::{StageTransition, WorkflowStageEngine};
pub use lock::{SopLockGuard, SopLockRegistry};
