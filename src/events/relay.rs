//! Outbound adapter between the in-process event channel and the messaging transport.
//!
//! The relay runs outside the request path. A sink failure is logged and counted; it
//! never reaches the workflow that produced the event.

use async_trait::async_trait;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::publisher::PublishError;
use super::types::SopLifecycleEvent;

/// Transport the relay delivers to (message broker, webhook, ...)
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn deliver(&self, event: &SopLifecycleEvent) -> Result<(), PublishError>;
}

/// Sink that writes each event as a structured log line
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

#[async_trait]
impl EventSink for TracingEventSink {
    async fn deliver(&self, event: &SopLifecycleEvent) -> Result<(), PublishError> {
        let payload = serde_json::to_string(event)?;
        info!(
            topic = event.topic(),
            event_id = %event.event_id,
            sop_id = %event.sop.sop_id,
            payload = %payload,
            "SOP lifecycle event"
        );
        Ok(())
    }
}

/// Counters reported when the relay stops
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RelayStats {
    pub delivered: u64,
    pub failed: u64,
    pub lagged: u64,
}

pub struct EventRelay;

impl EventRelay {
    /// Drain `receiver` into `sink` until every sender is dropped
    pub fn spawn<S>(receiver: broadcast::Receiver<SopLifecycleEvent>, sink: S) -> JoinHandle<RelayStats>
    where
        S: EventSink + 'static,
    {
        tokio::spawn(Self::run(receiver, sink))
    }

    pub async fn run<S>(mut receiver: broadcast::Receiver<SopLifecycleEvent>, sink: S) -> RelayStats
    where
        S: EventSink,
    {
        let mut stats = RelayStats::default();

        loop {
            match receiver.recv().await {
                Ok(event) => match sink.deliver(&event).await {
                    Ok(()) => {
                        stats.delivered += 1;
                        debug!(event_id = %event.event_id, topic = event.topic(), "Event delivered");
                    }
                    Err(e) => {
                        stats.failed += 1;
                        error!(
                            event_id = %event.event_id,
                            topic = event.topic(),
                            sop_id = %event.sop.sop_id,
                            error = %e,
                            "Failed to deliver lifecycle event"
                        );
                    }
                },
                Err(RecvError::Lagged(skipped)) => {
                    stats.lagged += skipped;
                    warn!(skipped, "Event relay lagged behind publisher, events dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }

        info!(
            delivered = stats.delivered,
            failed = stats.failed,
            lagged = stats.lagged,
            "Event relay stopped"
        );
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::publisher::{BroadcastEventPublisher, EventPublisher};
    use crate::events::types::SopEventKind;
    use crate::models::{Sop, SopMetadata, Visibility};
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Default, Clone)]
    struct FlakySink {
        seen: Arc<Mutex<Vec<SopEventKind>>>,
    }

    #[async_trait]
    impl EventSink for FlakySink {
        async fn deliver(&self, event: &SopLifecycleEvent) -> Result<(), PublishError> {
            self.seen.lock().push(event.kind);
            if event.kind == SopEventKind::SopRejected {
                return Err(PublishError::Transport("broker unavailable".to_string()));
            }
            Ok(())
        }
    }

    fn sop() -> Sop {
        Sop::draft(
            SopMetadata {
                title: "Spill response".to_string(),
                category_id: "environment".to_string(),
                visibility: Visibility::Public,
                department_id: None,
            },
            "initiator",
        )
    }

    #[tokio::test]
    async fn test_relay_counts_deliveries_and_failures() {
        let publisher = BroadcastEventPublisher::new(16);
        let sink = FlakySink::default();
        let handle = EventRelay::spawn(publisher.subscribe(), sink.clone());

        publisher
            .publish(SopLifecycleEvent::new(SopEventKind::SopCreated, sop()))
            .unwrap();
        publisher
            .publish(SopLifecycleEvent::new(SopEventKind::SopRejected, sop()))
            .unwrap();
        drop(publisher);

        let stats = handle.await.unwrap();
        assert_eq!(
            stats,
            RelayStats {
                delivered: 1,
                failed: 1,
                lagged: 0
            }
        );
        assert_eq!(
            *sink.seen.lock(),
            vec![SopEventKind::SopCreated, SopEventKind::SopRejected]
        );
    }

    #[tokio::test]
    async fn test_tracing_sink_accepts_events() {
        let event = SopLifecycleEvent::new(SopEventKind::SopApproved, sop());
        assert!(TracingEventSink.deliver(&event).await.is_ok());
    }
}
