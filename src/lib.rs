#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # SOP Workflow Core
//!
//! Review and approval workflow for Standard Operating Procedures (SOPs).
//!
//! ## Overview
//!
//! An SOP is drafted by an author, reviewed by one or more reviewers and approved by
//! one or more approvers. Each participant owns a single workflow stage with its own
//! status; the SOP's status is never set directly but always derived from the full set
//! of its stages.
//!
//! ## Architecture
//!
//! - The **Workflow Stage Engine** ([`workflow`]) persists stages, validates every
//!   participant action against the stage state machine and derives the SOP status.
//! - The **SOP Aggregate Service** ([`services`]) owns the SOP record, serializes status
//!   writes per SOP and emits lifecycle events.
//! - The **RPC Facade** ([`rpc`]) exposes the publication gate and a participant's
//!   stage view to other services without ever raising a transport fault.
//!
//! ## Module Organization
//!
//! - [`state_machine`] - Stage transitions, guards and status derivation
//! - [`models`] - SOP, stage and comment records
//! - [`repository`] - Storage traits with in-memory and PostgreSQL backends
//! - [`events`] - Lifecycle events, publisher and outbound relay
//! - [`collaborators`] - Category and participant lookups
//! - [`config`] - Environment-aware configuration
//! - [`error`] - Workflow error taxonomy
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sop_workflow::collaborators::{InMemoryCategoryDirectory, InMemoryParticipantDirectory};
//! use sop_workflow::events::BroadcastEventPublisher;
//! use sop_workflow::repository::WorkflowStores;
//! use sop_workflow::{SopAggregateService, WorkflowConfig};
//!
//! let service = SopAggregateService::new(
//!     WorkflowStores::in_memory(),
//!     Arc::new(InMemoryCategoryDirectory::default()),
//!     Arc::new(InMemoryParticipantDirectory::default()),
//!     Arc::new(BroadcastEventPublisher::default()),
//!     &WorkflowConfig::default(),
//! );
//! # let _ = service;
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # Unit and integration tests
//! ```

pub mod collaborators;
pub mod config;
pub mod constants;
#[cfg(feature = "postgres")]
pub mod database;
pub mod error;
pub mod events;
pub mod logging;
pub mod models;
pub mod repository;
pub mod rpc;
pub mod services;
pub mod state_machine;
pub mod workflow;

pub use config::{ConfigManager, WorkflowConfig};
pub use error::{ErrorKind, WorkflowError, WorkflowResult};
pub use events::{EventPublisher, SopEventKind, SopLifecycleEvent};
pub use models::{Comment, Participant, Sop, SopMetadata, SopWithStages, WorkflowStage};
pub use rpc::WorkflowRpcService;
pub use services::{InitiateSop, SopAggregateService, StageActionOutcome};
pub use state_machine::{derive_status, SopStatus, StageAction, StageRole, StageStatus};
pub use workflow::{StageTransition, WorkflowStageEngine};
