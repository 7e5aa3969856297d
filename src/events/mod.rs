//! # SOP Lifecycle Events
//!
//! The workflow core emits typed [`SopLifecycleEvent`] values through an
//! [`EventPublisher`]; the [`EventRelay`] outbound adapter owns delivery to the
//! transport. Delivery is at-least-once, so every event carries an `event_id` that
//! consumers use to de-duplicate.

pub mod publisher;
pub mod relay;
pub mod types;

// Re-export key types for convenience
pub use publisher::{BroadcastEventPublisher, EventPublisher, PublishError};
pub use relay::{EventRelay, EventSink, RelayStats, TracingEventSink};
pub use types::{SopEventKind, SopLifecycleEvent};
