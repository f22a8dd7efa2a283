use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::client::Client;
use crate::models::user::User;

/// A short-lived, single-use authorization code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationCode {
    pub id: String,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub redirect_uri: String,
    /// Whitespace-delimited granted scope.
    pub scope: String,
    pub client_id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

impl AuthorizationCode {
    pub fn new(
        code: String,
        expires_at: DateTime<Utc>,
        redirect_uri: String,
        scope: String,
        client_id: String,
        user_id: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            code,
            expires_at,
            redirect_uri,
            scope,
            client_id,
            user_id,
            created_at: Utc::now(),
        }
    }
}

/// An authorization code joined with its client and user, as returned to the
/// authorization engine by lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrantedCode {
    pub code: AuthorizationCode,
    pub client: Client,
    pub user: User,
}
