mod common;

use async_trait::async_trait;
use common::{SopRequestBuilder, TestHarness};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

use sop_workflow::events::{
    BroadcastEventPublisher, EventRelay, EventSink, PublishError, SopLifecycleEvent,
};
use sop_workflow::StageAction;

#[derive(Default, Clone)]
struct CollectingSink {
    delivered: Arc<Mutex<Vec<SopLifecycleEvent>>>,
}

#[async_trait]
impl EventSink for CollectingSink {
    async fn deliver(&self, event: &SopLifecycleEvent) -> Result<(), PublishError> {
        self.delivered.lock().push(event.clone());
        Ok(())
    }
}

#[tokio::test]
async fn test_relay_forwards_lifecycle_topics_in_order() {
    let publisher = BroadcastEventPublisher::new(64);
    let sink = CollectingSink::default();
    let relay = EventRelay::spawn(publisher.subscribe(), sink.clone());

    let harness = TestHarness::with_broadcast(publisher);
    let service = &harness.service;
    let sop = service
        .initiate_sop(SopRequestBuilder::new().with_reviewers(&["rev-1"]).build())
        .await
        .unwrap();
    service
        .submit_stage_action(sop.sop_id, "rev-1", StageAction::ConfirmReview, None)
        .await
        .unwrap();
    service
        .submit_stage_action(sop.sop_id, "app-1", StageAction::Approve, None)
        .await
        .unwrap();

    // Dropping the service drops the last sender and stops the relay
    drop(harness);
    let stats = relay.await.unwrap();
    assert_eq!(stats.delivered, 3);
    assert_eq!(stats.failed, 0);

    let delivered = sink.delivered.lock().clone();
    let topics: Vec<&str> = delivered.iter().map(SopLifecycleEvent::topic).collect();
    assert_eq!(topics, vec!["sop-created", "sop-reviewal-ready", "sop-approved"]);

    let ids: HashSet<_> = delivered.iter().map(|e| e.event_id).collect();
    assert_eq!(ids.len(), delivered.len());
    assert!(delivered.iter().all(|e| e.sop.sop_id == sop.sop_id));
}
