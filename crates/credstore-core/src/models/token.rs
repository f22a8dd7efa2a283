use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::client::Client;
use crate::models::user::User;

/// An issued access/refresh token pair.
///
/// Authorization codes are a distinct record type (`AuthorizationCode`); a
/// token record never doubles as a code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub id: String,
    pub access_token: String,
    pub access_token_expires_at: DateTime<Utc>,
    // Omitted when absent so a sparse unique index sees no field at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token_expires_at: Option<DateTime<Utc>>,
    /// Whitespace-delimited granted scope.
    pub scope: String,
    pub client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Token {
    /// Build a token record from the fields the authorization engine supplies.
    ///
    /// `client_id`/`user_id` are stamped by the adapter at issuance time.
    pub fn new(
        access_token: String,
        access_token_expires_at: DateTime<Utc>,
        refresh_token: Option<String>,
        refresh_token_expires_at: Option<DateTime<Utc>>,
        scope: String,
        client_id: String,
        user_id: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            access_token,
            access_token_expires_at,
            refresh_token,
            refresh_token_expires_at,
            scope,
            client_id,
            user_id,
            created_at: Utc::now(),
        }
    }
}

/// A token joined with the client and (when referenced) user it was granted
/// to, as returned to the authorization engine by lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrantedToken {
    pub token: Token,
    pub client: Client,
    pub user: Option<User>,
}
