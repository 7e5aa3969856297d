//! # SOP Aggregate Service
//!
//! Owns the SOP record and is the only writer of its `status`. Every status write is
//! the engine's derivation over the full stage set, performed while holding the SOP's
//! lock from [`SopLockRegistry`].
//!
//! Events are published after the status write has landed. A publish failure is
//! logged and never undoes the write; [`SopAggregateService::reconcile_sop`] re-derives
//! and re-announces a milestone the stored status missed.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::collaborators::{CategoryDirectory, ParticipantDirectory};
use crate::config::WorkflowConfig;
use crate::error::{WorkflowError, WorkflowResult};
use crate::events::{EventPublisher, SopEventKind, SopLifecycleEvent};
use crate::logging::{log_error, log_sop_operation};
use crate::models::{Comment, Participant, Sop, SopMetadata, SopWithStages, WorkflowStage};
use crate::repository::{SopRepository, WorkflowStores};
use crate::state_machine::{derive_status, SopStatus, StageAction};
use crate::workflow::{SopLockRegistry, WorkflowStageEngine};

/// Request to start a new SOP through review and approval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitiateSop {
    pub metadata: SopMetadata,
    pub initiator_id: String,
    pub author_id: String,
    pub reviewer_ids: Vec<String>,
    pub approver_ids: Vec<String>,
}

impl InitiateSop {
    /// Author first, then reviewers, then approvers
    fn participants(&self) -> Vec<Participant> {
        std::iter::once(Participant::author(self.author_id.as_str()))
            .chain(self.reviewer_ids.iter().map(|id| Participant::reviewer(id.as_str())))
            .chain(self.approver_ids.iter().map(|id| Participant::approver(id.as_str())))
            .collect()
    }
}

/// Result of a participant action as seen by the aggregate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageActionOutcome {
    pub sop: Sop,
    pub stage: WorkflowStage,
    pub comment: Option<Comment>,
    /// Milestone announced by this action, if any
    pub event: Option<SopEventKind>,
}

pub struct SopAggregateService {
    sops: Arc<dyn SopRepository>,
    engine: Arc<WorkflowStageEngine>,
    categories: Arc<dyn CategoryDirectory>,
    participants: Arc<dyn ParticipantDirectory>,
    publisher: Arc<dyn EventPublisher>,
    locks: Arc<SopLockRegistry>,
}

impl SopAggregateService {
    pub fn new(
        stores: WorkflowStores,
        categories: Arc<dyn CategoryDirectory>,
        participants: Arc<dyn ParticipantDirectory>,
        publisher: Arc<dyn EventPublisher>,
        config: &WorkflowConfig,
    ) -> Self {
        let engine = Arc::new(WorkflowStageEngine::new(stores.stages, stores.comments));
        Self {
            sops: stores.sops,
            engine,
            categories,
            participants,
            publisher,
            locks: Arc::new(SopLockRegistry::new(config.concurrency.lock_timeout())),
        }
    }

    /// The stage engine this service drives, shared with the RPC facade
    pub fn engine(&self) -> Arc<WorkflowStageEngine> {
        Arc::clone(&self.engine)
    }

    /// Create an SOP, enroll its participants and move it into review.
    ///
    /// If stage creation fails the draft row is removed again so no SOP is left
    /// without stages.
    #[instrument(skip_all, fields(title = %request.metadata.title))]
    pub async fn initiate_sop(&self, request: InitiateSop) -> WorkflowResult<Sop> {
        if request.metadata.title.trim().is_empty() {
            return Err(WorkflowError::bad_request("SOP title cannot be empty"));
        }
        if request.reviewer_ids.is_empty() {
            return Err(WorkflowError::bad_request("At least one reviewer is required"));
        }
        if request.approver_ids.is_empty() {
            return Err(WorkflowError::bad_request("At least one approver is required"));
        }

        self.categories
            .resolve_category(&request.metadata.category_id)
            .await?;

        let participants = request.participants();
        for participant in &participants {
            self.participants
                .resolve_participant(&participant.user_id)
                .await?;
        }

        let draft = Sop::draft(request.metadata.clone(), request.initiator_id.as_str());
        let sop_id = draft.sop_id;
        let _guard = self.locks.acquire(sop_id).await?;

        self.sops.insert(&draft).await?;

        if let Err(e) = self.engine.create_stages(sop_id, &participants).await {
            if let Err(cleanup) = self.sops.delete(sop_id).await {
                log_error(
                    "sop_service",
                    "initiate_sop",
                    &cleanup.to_string(),
                    Some(&format!("sop_id={sop_id} draft left behind")),
                );
            }
            return Err(e);
        }

        let status = self.engine.derive_sop_status(sop_id).await?;
        let sop = self.persist_status(draft, status).await?;

        log_sop_operation(
            "initiate_sop",
            Some(sop_id),
            &sop.status.to_string(),
            Some(&format!("participants={}", participants.len())),
        );
        Ok(sop)
    }

    /// Apply a participant action and persist the re-derived SOP status.
    ///
    /// The terminal check runs against the status derived from the stages, not the
    /// stored one, so a stored status that lags behind its stages is repaired first.
    #[instrument(skip_all, fields(sop_id = %sop_id, user_id = %user_id, action = %action))]
    pub async fn submit_stage_action(
        &self,
        sop_id: Uuid,
        user_id: &str,
        action: StageAction,
        comment: Option<&str>,
    ) -> WorkflowResult<StageActionOutcome> {
        let _guard = self.locks.acquire(sop_id).await?;

        let stored = self.require_sop(sop_id).await?;
        let derived = self.engine.derive_sop_status(sop_id).await?;
        let current = self.persist_status(stored, derived).await?;
        if !current.status.accepts_actions() {
            return Err(WorkflowError::bad_request(format!(
                "SOP {sop_id} is {} and no longer accepts {action} actions",
                current.status
            )));
        }

        let transition = self
            .engine
            .transition_stage(sop_id, user_id, action, comment)
            .await?;

        let previous = current.status;
        let sop = self
            .persist_status(current, transition.derived_status)
            .await?;
        let event = SopEventKind::for_transition(previous, sop.status);

        Ok(StageActionOutcome {
            sop,
            stage: transition.stage,
            comment: transition.comment,
            event,
        })
    }

    /// An SOP with its stages. Warns when the stored status has drifted from the stages.
    pub async fn get_sop(&self, sop_id: Uuid) -> WorkflowResult<SopWithStages> {
        let sop = self.require_sop(sop_id).await?;
        let stages = self.engine.get_stages_for_sop(sop_id).await?;

        let derived = derive_status(&stages);
        if derived != sop.status {
            warn!(
                sop_id = %sop_id,
                stored = %sop.status,
                derived = %derived,
                "Stored SOP status differs from its stages; reconcile_sop will repair it"
            );
        }

        Ok(SopWithStages { sop, stages })
    }

    /// Force a re-derivation and persist it if the stored status drifted.
    ///
    /// Publishes every milestone the stored status missed, including `SopCreated` for
    /// an SOP whose stages exist but whose status was left at `Draft`.
    #[instrument(skip_all, fields(sop_id = %sop_id))]
    pub async fn reconcile_sop(&self, sop_id: Uuid) -> WorkflowResult<Sop> {
        let _guard = self.locks.acquire(sop_id).await?;

        let current = self.require_sop(sop_id).await?;
        let derived = self.engine.derive_sop_status(sop_id).await?;
        if derived == current.status {
            return Ok(current);
        }

        info!(
            sop_id = %sop_id,
            stored = %current.status,
            derived = %derived,
            "Reconciling drifted SOP status"
        );
        self.persist_status(current, derived).await
    }

    /// Delete an SOP together with its stages and their comments
    #[instrument(skip_all, fields(sop_id = %sop_id))]
    pub async fn delete_sop(&self, sop_id: Uuid) -> WorkflowResult<()> {
        let _guard = self.locks.acquire(sop_id).await?;
        self.require_sop(sop_id).await?;

        let stages = self.engine.delete_stages_for_sop(sop_id).await?;
        self.sops.delete(sop_id).await?;

        log_sop_operation(
            "delete_sop",
            Some(sop_id),
            "deleted",
            Some(&format!("stages={stages}")),
        );
        Ok(())
    }

    /// Every stage assigned to a participant, across SOPs
    pub async fn assignments_for(&self, user_id: &str) -> WorkflowResult<Vec<WorkflowStage>> {
        self.engine.get_stages_for_user(user_id).await
    }

    async fn require_sop(&self, sop_id: Uuid) -> WorkflowResult<Sop> {
        self.sops
            .find(sop_id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("SOP", sop_id))
    }

    /// Write `derived` if it differs from the stored status and announce every milestone
    /// the write reached. Callers hold the SOP lock.
    async fn persist_status(&self, current: Sop, derived: SopStatus) -> WorkflowResult<Sop> {
        if derived == current.status {
            return Ok(current);
        }

        let previous = current.status;
        let sop = self.sops.update_status(current.sop_id, derived).await?;

        log_sop_operation(
            "update_status",
            Some(sop.sop_id),
            &sop.status.to_string(),
            Some(&format!("from={previous}")),
        );

        for kind in SopEventKind::milestones(previous, sop.status) {
            self.publish(kind, &sop);
        }
        Ok(sop)
    }

    fn publish(&self, kind: SopEventKind, sop: &Sop) {
        let event = SopLifecycleEvent::new(kind, sop.clone());
        let event_id = event.event_id;
        if let Err(e) = self.publisher.publish(event) {
            log_error(
                "sop_service",
                "publish",
                &e.to_string(),
                Some(&format!(
                    "topic={} sop_id={} event_id={event_id}",
                    kind.topic(),
                    sop.sop_id
                )),
            );
        }
    }
}
