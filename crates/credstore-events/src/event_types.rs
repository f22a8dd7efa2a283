use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    TokenIssued,
    TokenRevoked,
    AuthorizationCodeIssued,
    AuthorizationCodeRevoked,
    LedgerRecordAppended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSeverity {
    Info,
    Warning,
}

/// A credential lifecycle event.
///
/// Carries identifiers only; token and code strings never appear in events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialEvent {
    pub id: String,
    pub event_type: EventType,
    pub severity: EventSeverity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl CredentialEvent {
    pub fn new(
        event_type: EventType,
        severity: EventSeverity,
        user_id: Option<String>,
        client_id: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            event_type,
            severity,
            user_id,
            client_id,
            created_at: Utc::now(),
        }
    }
}
