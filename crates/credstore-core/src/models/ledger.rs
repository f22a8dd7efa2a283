use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An append-only audit entry.
///
/// Records are created and then read; the ledger port exposes no update or
/// delete, so immutability is enforced by omission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub transaction_id: String,
    /// Opaque payload supplied by the caller; no schema validation beyond
    /// required-field presence.
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl LedgerRecord {
    pub fn new(transaction_id: String, payload: serde_json::Value) -> Self {
        Self {
            transaction_id,
            payload,
            created_at: Utc::now(),
        }
    }
}
