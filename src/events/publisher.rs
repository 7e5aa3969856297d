use tokio::sync::broadcast;

use super::types::SopLifecycleEvent;
use crate::config::EventsConfig;

/// Hands lifecycle events to the outbound side.
///
/// Implementations must not block on the transport: the workflow calls `publish`
/// after its state change is committed and only logs a failure.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: SopLifecycleEvent) -> Result<(), PublishError>;
}

/// In-process publisher backed by a tokio broadcast channel
#[derive(Debug, Clone)]
pub struct BroadcastEventPublisher {
    sender: broadcast::Sender<SopLifecycleEvent>,
}

impl BroadcastEventPublisher {
    /// Create a new event publisher with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Create a publisher sized by the `events` configuration section
    pub fn from_config(config: &EventsConfig) -> Self {
        Self::new(config.channel_capacity)
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<SopLifecycleEvent> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl EventPublisher for BroadcastEventPublisher {
    fn publish(&self, event: SopLifecycleEvent) -> Result<(), PublishError> {
        match self.sender.send(event) {
            Ok(_) => Ok(()),
            // No subscribers yet; the event is dropped like any unobserved broadcast
            Err(broadcast::error::SendError(event)) => {
                tracing::debug!(
                    event_id = %event.event_id,
                    topic = event.topic(),
                    "No subscribers for lifecycle event"
                );
                Ok(())
            }
        }
    }
}

impl Default for BroadcastEventPublisher {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_EVENT_CHANNEL_CAPACITY)
    }
}

/// Error types for event publishing
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
