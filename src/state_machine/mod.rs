// State machine module for the SOP review/approval workflow
//
// Stage transitions go through a closed (role, status, action) table plus a guard
// chain; the SOP status is derived from the full stage set, never stored independently.

pub mod derivation;
pub mod errors;
pub mod events;
pub mod guards;
pub mod stage_state_machine;
pub mod states;

// Re-export main types for convenient access
pub use derivation::{derive_status, is_fully_approved, outstanding_reviewers, reviewers_complete};
pub use errors::{StateMachineError, StateMachineResult};
pub use events::StageAction;
pub use guards::{StateGuard, TransitionContext};
pub use stage_state_machine::StageStateMachine;
pub use states::{SopStatus, StageRole, StageStatus};
