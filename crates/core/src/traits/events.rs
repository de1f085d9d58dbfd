use async_trait::async_trait;

use crate::events::JudgeEvent;

/// Capability for pushing notifications to the live-update transport.
///
/// Publishing is fire-and-forget: a lost event must never affect grading,
/// so the trait is infallible and implementations swallow transport
/// errors after logging them.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an event.
    async fn publish(&self, event: JudgeEvent);
}

/// No-op implementation for testing/default.
pub struct NoOpPublisher;

#[async_trait]
impl EventPublisher for NoOpPublisher {
    async fn publish(&self, _event: JudgeEvent) {}
}
