use credstore_core::LedgerRecord;
use credstore_events::{
    CredentialEvent, EventBusHandle, EventEnvelope, EventSeverity, EventType,
};
use credstore_ports::DynLedgerStore;

use crate::degrade;

const PRODUCER: &str = "credstore-ledger";

/// Append-only audit adapter, decoupled from the credential engine.
///
/// Same sentinel contract as the credential side: a failed append and a
/// missing record both surface as `None`.
pub struct LedgerAdapter {
    store: DynLedgerStore,
    events: Option<EventBusHandle>,
}

impl LedgerAdapter {
    pub fn new(store: DynLedgerStore) -> Self {
        Self {
            store,
            events: None,
        }
    }

    pub fn with_events(mut self, events: EventBusHandle) -> Self {
        self.events = Some(events);
        self
    }

    pub async fn save(&self, record: LedgerRecord) -> Option<LedgerRecord> {
        match self.store.append_record(&record).await {
            Ok(()) => {
                if let Some(bus) = &self.events {
                    let event = CredentialEvent::new(
                        EventType::LedgerRecordAppended,
                        EventSeverity::Info,
                        None,
                        None,
                    );
                    bus.publish_best_effort(EventEnvelope::from_current_span(event, PRODUCER));
                }
                Some(record)
            }
            Err(err) => {
                tracing::warn!(
                    db_operation = "append_record",
                    error = %err,
                    "persistence failure degraded to not-found"
                );
                None
            }
        }
    }

    pub async fn find_by_id(&self, transaction_id: &str) -> Option<LedgerRecord> {
        degrade("find_record", self.store.find_record(transaction_id).await)
    }
}
