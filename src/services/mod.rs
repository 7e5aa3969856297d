pub mod sop_service;

pub use sop_service::{InitiateSop, SopAggregateService, StageActionOutcome};
