//! Composition root and library exports.
//!
//! The workspace keeps each concern in its own crate; this crate wires
//! configuration, storage selection, and event publishing together into the
//! two adapters an external OAuth2 engine (and the audit caller) consume.

use std::sync::Arc;

use credstore_core::StoreResult;
use credstore_events::{EventBusHandle, LogEventBus};

pub use credstore_adapter::{CredentialAdapter, LedgerAdapter};
pub use credstore_config::Config;
pub use credstore_observability::init_telemetry;
pub use credstore_storage_factory::{
    create_credential_store, create_ledger_store, create_stores, CredentialStore,
    DynCredentialStore, DynLedgerStore, LedgerStore, ObservedLedgerStore, ObservedStore,
};

/// Build the event bus named by configuration.
///
/// Returns `None` when eventing is disabled. An unusable Kafka selection
/// falls back to the log bus rather than failing startup; events are
/// best-effort by contract.
pub fn build_event_bus(config: &Config) -> Option<EventBusHandle> {
    if !config.events.enabled {
        return None;
    }

    if config.events.backend == "kafka" {
        #[cfg(feature = "events-kafka")]
        {
            match &config.events.kafka {
                Some(kafka) => {
                    match credstore_events::KafkaEventBus::new(
                        &kafka.brokers,
                        kafka.topic.clone(),
                        kafka.client_id.clone(),
                    ) {
                        Ok(bus) => return Some(EventBusHandle::new(Arc::new(bus))),
                        Err(err) => tracing::warn!(
                            error = %err,
                            "kafka event bus unavailable, falling back to log bus"
                        ),
                    }
                }
                None => tracing::warn!(
                    "kafka backend selected but no kafka settings present, falling back to log bus"
                ),
            }
        }

        #[cfg(not(feature = "events-kafka"))]
        tracing::warn!(
            "kafka backend requested but the binary was built without the `events-kafka` feature, falling back to log bus"
        );
    }

    Some(EventBusHandle::new(Arc::new(LogEventBus)))
}

/// Compose the credential and ledger adapters from configuration.
pub async fn from_config(config: &Config) -> StoreResult<(CredentialAdapter, LedgerAdapter)> {
    let (credentials, ledger) = create_stores(&config.database.url).await?;

    let mut credential_adapter = CredentialAdapter::new(credentials);
    let mut ledger_adapter = LedgerAdapter::new(ledger);

    if let Some(bus) = build_event_bus(config) {
        credential_adapter = credential_adapter.with_events(bus.clone());
        ledger_adapter = ledger_adapter.with_events(bus);
    }

    Ok((credential_adapter, ledger_adapter))
}
