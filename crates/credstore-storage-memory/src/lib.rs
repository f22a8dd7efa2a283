//! In-memory implementation of the storage ports.
//!
//! State lives in `HashMap`s guarded by `tokio::sync::RwLock`. Not durable:
//! everything is lost on process restart. Exists for tests, local
//! development, and as the reference semantics the Mongo backend must match —
//! including uniqueness failures, which are reported as
//! `StoreError::DuplicateKey` exactly like a unique-index violation.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use credstore_core::{
    AuthorizationCode, Client, LedgerRecord, StoreError, StoreResult, Token, User,
};
use credstore_ports::{CredentialStore, LedgerStore};

/// In-memory credential + ledger store.
///
/// Reads take a shared lock and proceed concurrently; writes are serialized
/// per map. Tokens are keyed by access-token string; refresh-token lookups
/// scan values, which is acceptable at in-memory scale.
#[derive(Default)]
pub struct MemoryStorage {
    clients: Arc<RwLock<HashMap<String, Client>>>,
    users: Arc<RwLock<HashMap<String, User>>>,
    tokens: Arc<RwLock<HashMap<String, Token>>>,
    authorization_codes: Arc<RwLock<HashMap<String, AuthorizationCode>>>,
    ledger_records: Arc<RwLock<HashMap<String, LedgerRecord>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStorage {
    async fn init(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn save_client(&self, client: &Client) -> StoreResult<()> {
        let mut clients = self.clients.write().await;
        if clients.contains_key(&client.client_id) {
            return Err(StoreError::DuplicateKey(format!(
                "client_id {}",
                client.client_id
            )));
        }
        clients.insert(client.client_id.clone(), client.clone());
        Ok(())
    }

    async fn find_client(&self, client_id: &str) -> StoreResult<Option<Client>> {
        Ok(self.clients.read().await.get(client_id).cloned())
    }

    async fn save_user(&self, user: &User) -> StoreResult<()> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.id)
            || users.values().any(|u| u.username == user.username)
        {
            return Err(StoreError::DuplicateKey(format!("username {}", user.username)));
        }
        users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_user_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn save_token(&self, token: &Token) -> StoreResult<()> {
        let mut tokens = self.tokens.write().await;
        if tokens.contains_key(&token.access_token) {
            return Err(StoreError::DuplicateKey("access_token".to_string()));
        }
        if let Some(refresh) = token.refresh_token.as_deref() {
            if tokens
                .values()
                .any(|t| t.refresh_token.as_deref() == Some(refresh))
            {
                return Err(StoreError::DuplicateKey("refresh_token".to_string()));
            }
        }
        tokens.insert(token.access_token.clone(), token.clone());
        Ok(())
    }

    async fn find_token_by_access_token(
        &self,
        access_token: &str,
    ) -> StoreResult<Option<Token>> {
        Ok(self.tokens.read().await.get(access_token).cloned())
    }

    async fn find_token_by_refresh_token(
        &self,
        refresh_token: &str,
    ) -> StoreResult<Option<Token>> {
        Ok(self
            .tokens
            .read()
            .await
            .values()
            .find(|t| t.refresh_token.as_deref() == Some(refresh_token))
            .cloned())
    }

    async fn delete_token_by_refresh_token(&self, refresh_token: &str) -> StoreResult<bool> {
        let mut tokens = self.tokens.write().await;
        let key = tokens
            .values()
            .find(|t| t.refresh_token.as_deref() == Some(refresh_token))
            .map(|t| t.access_token.clone());

        match key {
            Some(key) => Ok(tokens.remove(&key).is_some()),
            None => Ok(false),
        }
    }

    async fn save_authorization_code(&self, code: &AuthorizationCode) -> StoreResult<()> {
        let mut codes = self.authorization_codes.write().await;
        if codes.contains_key(&code.code) {
            return Err(StoreError::DuplicateKey("code".to_string()));
        }
        codes.insert(code.code.clone(), code.clone());
        Ok(())
    }

    async fn find_authorization_code(
        &self,
        code: &str,
    ) -> StoreResult<Option<AuthorizationCode>> {
        Ok(self.authorization_codes.read().await.get(code).cloned())
    }

    async fn delete_authorization_code(&self, code: &str) -> StoreResult<bool> {
        Ok(self
            .authorization_codes
            .write()
            .await
            .remove(code)
            .is_some())
    }

    async fn healthcheck(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for MemoryStorage {
    async fn init(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn append_record(&self, record: &LedgerRecord) -> StoreResult<()> {
        let mut records = self.ledger_records.write().await;
        if records.contains_key(&record.transaction_id) {
            return Err(StoreError::DuplicateKey(format!(
                "transaction_id {}",
                record.transaction_id
            )));
        }
        records.insert(record.transaction_id.clone(), record.clone());
        Ok(())
    }

    async fn find_record(&self, transaction_id: &str) -> StoreResult<Option<LedgerRecord>> {
        Ok(self
            .ledger_records
            .read()
            .await
            .get(transaction_id)
            .cloned())
    }

    async fn healthcheck(&self) -> StoreResult<()> {
        Ok(())
    }
}
