use crate::{EventBus, EventBusError, EventEnvelope};
use async_trait::async_trait;

/// Default bus: emits each envelope as a structured log line.
///
/// Useful for development and for deployments that only want the audit trail
/// in their log pipeline.
#[derive(Debug, Default)]
pub struct LogEventBus;

#[async_trait]
impl EventBus for LogEventBus {
    async fn publish(&self, envelope: EventEnvelope) -> Result<(), EventBusError> {
        tracing::info!(
            event_id = %envelope.event.id,
            event_type = ?envelope.event.event_type,
            client_id = envelope.event.client_id.as_deref().unwrap_or(""),
            user_id = envelope.event.user_id.as_deref().unwrap_or(""),
            correlation_id = %envelope.correlation_id,
            producer = %envelope.producer,
            "credential event"
        );
        Ok(())
    }
}
