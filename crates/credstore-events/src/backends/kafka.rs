use crate::{EventBus, EventBusError, EventEnvelope};
use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use std::time::Duration;

/// Kafka event publisher.
///
/// Publishes envelopes as JSON to a Kafka topic, keyed by the envelope's
/// effective idempotency key.
pub struct KafkaEventBus {
    producer: FutureProducer,
    topic: String,
}

impl KafkaEventBus {
    pub fn new(
        brokers: &str,
        topic: impl Into<String>,
        client_id: Option<String>,
    ) -> Result<Self, EventBusError> {
        let mut cfg = ClientConfig::new();
        cfg.set("bootstrap.servers", brokers);
        cfg.set("message.timeout.ms", "5000");

        if let Some(cid) = client_id {
            cfg.set("client.id", cid);
        }

        let producer: FutureProducer = cfg
            .create()
            .map_err(|e| EventBusError::Other(format!("kafka producer create: {e}")))?;

        Ok(Self {
            producer,
            topic: topic.into(),
        })
    }
}

#[async_trait]
impl EventBus for KafkaEventBus {
    async fn publish(&self, envelope: EventEnvelope) -> Result<(), EventBusError> {
        let payload = serde_json::to_vec(&envelope)
            .map_err(|e| EventBusError::Rejected(format!("serialize envelope: {e}")))?;
        let key = envelope.effective_idempotency_key();

        // We enqueue and then detach the delivery future to keep publishing best-effort.
        let delivery = self
            .producer
            .send_result(FutureRecord::to(&self.topic).payload(&payload).key(&key))
            .map_err(|(e, _msg)| EventBusError::Other(format!("kafka send: {e}")))?;

        tokio::spawn(async move {
            // A short wait so we at least surface immediate delivery failures.
            let _ = tokio::time::timeout(Duration::from_secs(2), delivery).await;
        });

        Ok(())
    }
}
