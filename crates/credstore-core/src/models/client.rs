use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use uuid::Uuid;

/// A registered OAuth2 client application.
///
/// Immutable after creation except through administrative `save_client`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub client_id: String,
    pub client_secret: String,
    pub grant_types: Vec<String>,
    pub redirect_uris: Vec<String>,
    /// Owning application, for administrative bookkeeping.
    pub application: String,
    pub created_at: DateTime<Utc>,
}

impl Client {
    pub fn new(
        client_id: String,
        client_secret: String,
        grant_types: Vec<String>,
        redirect_uris: Vec<String>,
        application: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            client_id,
            client_secret,
            grant_types,
            redirect_uris,
            application,
            created_at: Utc::now(),
        }
    }

    /// Constant-time comparison against a presented secret.
    pub fn secret_matches(&self, candidate: &str) -> bool {
        self.client_secret
            .as_bytes()
            .ct_eq(candidate.as_bytes())
            .into()
    }

    pub fn supports_grant(&self, grant_type: &str) -> bool {
        self.grant_types.iter().any(|g| g == grant_type)
    }
}
