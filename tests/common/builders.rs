//! Test fixtures for driving the workflow through its public API.

use parking_lot::Mutex;
use std::sync::Arc;

use sop_workflow::collaborators::{InMemoryCategoryDirectory, InMemoryParticipantDirectory};
use sop_workflow::events::{
    BroadcastEventPublisher, EventPublisher, PublishError, SopEventKind, SopLifecycleEvent,
};
use sop_workflow::models::{SopMetadata, Visibility};
use sop_workflow::repository::WorkflowStores;
use sop_workflow::{InitiateSop, SopAggregateService, WorkflowConfig};

pub const CATEGORY_ID: &str = "safety";

/// Publisher that keeps every event it is handed
#[derive(Debug, Default, Clone)]
pub struct RecordingPublisher {
    events: Arc<Mutex<Vec<SopLifecycleEvent>>>,
}

impl RecordingPublisher {
    pub fn kinds(&self) -> Vec<SopEventKind> {
        self.events.lock().iter().map(|e| e.kind).collect()
    }

    pub fn events(&self) -> Vec<SopLifecycleEvent> {
        self.events.lock().clone()
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish(&self, event: SopLifecycleEvent) -> Result<(), PublishError> {
        self.events.lock().push(event);
        Ok(())
    }
}

/// Publisher whose transport is always down
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingPublisher;

impl EventPublisher for FailingPublisher {
    fn publish(&self, _event: SopLifecycleEvent) -> Result<(), PublishError> {
        Err(PublishError::Transport("broker unreachable".to_string()))
    }
}

/// A service wired to in-memory stores and directories
pub struct TestHarness {
    pub service: Arc<SopAggregateService>,
    pub stores: WorkflowStores,
    pub events: RecordingPublisher,
}

impl TestHarness {
    pub fn new() -> Self {
        let events = RecordingPublisher::default();
        let (service, stores) = build_service(Arc::new(events.clone()));
        Self {
            service: Arc::new(service),
            stores,
            events,
        }
    }

    pub fn with_publisher(publisher: Arc<dyn EventPublisher>) -> Self {
        let (service, stores) = build_service(publisher);
        Self {
            service: Arc::new(service),
            stores,
            events: RecordingPublisher::default(),
        }
    }

    pub fn with_broadcast(publisher: BroadcastEventPublisher) -> Self {
        Self::with_publisher(Arc::new(publisher))
    }
}

fn build_service(publisher: Arc<dyn EventPublisher>) -> (SopAggregateService, WorkflowStores) {
    let stores = WorkflowStores::in_memory();
    let participants = InMemoryParticipantDirectory::with_users(
        ["initiator", "author"]
            .into_iter()
            .map(str::to_string)
            .chain((1..=8).map(|i| format!("rev-{i}")))
            .chain((1..=4).map(|i| format!("app-{i}"))),
    );
    let service = SopAggregateService::new(
        stores.clone(),
        Arc::new(InMemoryCategoryDirectory::with_categories([(
            CATEGORY_ID.to_string(),
            "Health and Safety".to_string(),
        )])),
        Arc::new(participants),
        publisher,
        &WorkflowConfig::default(),
    );
    (service, stores)
}

/// Builder for initiation requests; defaults to one author, two reviewers, one approver
pub struct SopRequestBuilder {
    title: String,
    category_id: String,
    reviewers: Vec<String>,
    approvers: Vec<String>,
}

impl SopRequestBuilder {
    pub fn new() -> Self {
        Self {
            title: "Chemical spill response".to_string(),
            category_id: CATEGORY_ID.to_string(),
            reviewers: vec!["rev-1".to_string(), "rev-2".to_string()],
            approvers: vec!["app-1".to_string()],
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn with_category(mut self, category_id: &str) -> Self {
        self.category_id = category_id.to_string();
        self
    }

    pub fn with_reviewers(mut self, reviewers: &[&str]) -> Self {
        self.reviewers = reviewers.iter().map(|r| r.to_string()).collect();
        self
    }

    pub fn with_approvers(mut self, approvers: &[&str]) -> Self {
        self.approvers = approvers.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn build(self) -> InitiateSop {
        InitiateSop {
            metadata: SopMetadata {
                title: self.title,
                category_id: self.category_id,
                visibility: Visibility::Department,
                department_id: Some("operations".to_string()),
            },
            initiator_id: "initiator".to_string(),
            author_id: "author".to_string(),
            reviewer_ids: self.reviewers,
            approver_ids: self.approvers,
        }
    }
}
