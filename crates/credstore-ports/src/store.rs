use async_trait::async_trait;
use std::sync::Arc;

use credstore_core::{AuthorizationCode, Client, LedgerRecord, StoreResult, Token, User};

/// Trait implemented by all credential persistence backends.
///
/// Lookups return `Ok(None)` for a missing record and `Err(_)` only for real
/// persistence faults; conditional deletes return whether exactly one record
/// was removed. Collapsing faults into negative results is the adapter's job,
/// not the backend's.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Initialize the backing store (e.g., bootstrap schema / create indexes).
    async fn init(&self) -> StoreResult<()>;

    // Client operations
    async fn save_client(&self, client: &Client) -> StoreResult<()>;
    async fn find_client(&self, client_id: &str) -> StoreResult<Option<Client>>;

    // User operations
    async fn save_user(&self, user: &User) -> StoreResult<()>;
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    async fn find_user_by_id(&self, id: &str) -> StoreResult<Option<User>>;

    // Token operations
    async fn save_token(&self, token: &Token) -> StoreResult<()>;
    async fn find_token_by_access_token(&self, access_token: &str)
        -> StoreResult<Option<Token>>;
    async fn find_token_by_refresh_token(
        &self,
        refresh_token: &str,
    ) -> StoreResult<Option<Token>>;
    /// Delete the token holding this refresh token. Revocation is deletion,
    /// not a status flag; returns whether exactly one record was removed.
    async fn delete_token_by_refresh_token(&self, refresh_token: &str) -> StoreResult<bool>;

    // Authorization code operations
    async fn save_authorization_code(&self, code: &AuthorizationCode) -> StoreResult<()>;
    async fn find_authorization_code(&self, code: &str)
        -> StoreResult<Option<AuthorizationCode>>;
    async fn delete_authorization_code(&self, code: &str) -> StoreResult<bool>;

    /// Lightweight liveness/readiness check.
    ///
    /// Implementations may override to do something cheaper than `init()`.
    async fn healthcheck(&self) -> StoreResult<()> {
        self.init().await
    }
}

pub type DynCredentialStore = Arc<dyn CredentialStore>;

/// Trait implemented by ledger persistence backends.
///
/// Append-only by construction: there is no update or delete operation.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn init(&self) -> StoreResult<()>;

    async fn append_record(&self, record: &LedgerRecord) -> StoreResult<()>;
    async fn find_record(&self, transaction_id: &str) -> StoreResult<Option<LedgerRecord>>;

    async fn healthcheck(&self) -> StoreResult<()> {
        self.init().await
    }
}

pub type DynLedgerStore = Arc<dyn LedgerStore>;
