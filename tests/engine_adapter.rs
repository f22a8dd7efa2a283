use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use credstore_adapter::{CredentialAdapter, LedgerAdapter};
use credstore_core::{
    AuthorizationCode, Client, LedgerRecord, StoreError, StoreResult, Token, User,
};
use credstore_ports::{CredentialStore, LedgerStore};
use credstore_storage_memory::MemoryStorage;

fn client() -> Client {
    Client::new(
        "c1".to_string(),
        "top-secret".to_string(),
        vec![
            "authorization_code".to_string(),
            "refresh_token".to_string(),
        ],
        vec!["http://localhost/cb".to_string()],
        "adapter-tests".to_string(),
    )
}

fn token(access: &str, refresh: Option<&str>, scope: &str) -> Token {
    Token::new(
        access.to_string(),
        Utc::now() + Duration::seconds(3600),
        refresh.map(|r| r.to_string()),
        refresh.map(|_| Utc::now() + Duration::seconds(86400)),
        scope.to_string(),
        String::new(),
        None,
    )
}

fn code(value: &str) -> AuthorizationCode {
    AuthorizationCode::new(
        value.to_string(),
        Utc::now() + Duration::seconds(300),
        "http://localhost/cb".to_string(),
        "read write".to_string(),
        String::new(),
        String::new(),
    )
}

async fn seeded() -> (CredentialAdapter, Client, User) {
    let storage = Arc::new(MemoryStorage::new());

    let client = client();
    let user = User::new("alice".to_string(), "hunter2", vec!["user".to_string()])
        .expect("hashing should succeed");

    storage.save_client(&client).await.expect("seed client");
    storage.save_user(&user).await.expect("seed user");

    (CredentialAdapter::new(storage), client, user)
}

#[tokio::test]
async fn lookup_client_checks_secret() {
    let (adapter, client, _user) = seeded().await;

    let found = adapter.lookup_client("c1", "top-secret").await;
    assert_eq!(found.map(|c| c.id), Some(client.id));

    assert!(adapter.lookup_client("c1", "wrong").await.is_none());
    assert!(adapter.lookup_client("c1", "").await.is_none());
    assert!(adapter.lookup_client("nobody", "top-secret").await.is_none());
}

#[tokio::test]
async fn lookup_user_verifies_password() {
    let (adapter, _client, user) = seeded().await;

    let found = adapter.lookup_user("alice", "hunter2").await;
    assert_eq!(found.map(|u| u.id), Some(user.id));

    assert!(adapter.lookup_user("alice", "hunter3").await.is_none());
    assert!(adapter.lookup_user("mallory", "hunter2").await.is_none());
}

#[tokio::test]
async fn issued_token_is_retrievable_with_joined_owners() {
    let (adapter, client, user) = seeded().await;

    let issued = adapter
        .issue_access_token(token("AT1", Some("RT1"), "read write"), &client, Some(&user))
        .await
        .expect("issuance should succeed");
    assert_eq!(issued.token.client_id, client.client_id);
    assert_eq!(issued.token.user_id.as_deref(), Some(user.id.as_str()));

    let by_access = adapter
        .lookup_access_token("AT1")
        .await
        .expect("access lookup should succeed");
    assert_eq!(by_access.client.client_id, client.client_id);
    assert_eq!(
        by_access.user.as_ref().map(|u| u.id.as_str()),
        Some(user.id.as_str())
    );

    let by_refresh = adapter
        .lookup_refresh_token("RT1")
        .await
        .expect("refresh lookup should succeed");
    assert_eq!(by_refresh.token.access_token, "AT1");
}

#[tokio::test]
async fn client_credentials_token_has_no_user() {
    let (adapter, client, _user) = seeded().await;

    adapter
        .issue_access_token(token("AT_CC", None, "read"), &client, None)
        .await
        .expect("issuance should succeed");

    let found = adapter
        .lookup_access_token("AT_CC")
        .await
        .expect("lookup should succeed");
    assert!(found.user.is_none());
    assert!(found.token.refresh_token.is_none());
}

#[tokio::test]
async fn revoke_token_is_true_exactly_once() {
    let (adapter, client, user) = seeded().await;

    adapter
        .issue_access_token(token("AT1", Some("RT1"), "read write"), &client, Some(&user))
        .await
        .expect("issuance should succeed");

    assert!(adapter.verify_scope(&token("AT1", Some("RT1"), "read write"), "read"));

    assert!(adapter.revoke_token("RT1").await);
    assert!(adapter.lookup_refresh_token("RT1").await.is_none());
    assert!(adapter.lookup_access_token("AT1").await.is_none());
    assert!(!adapter.revoke_token("RT1").await);
}

#[tokio::test]
async fn verify_scope_is_a_subset_check() {
    let (adapter, _client, _user) = seeded().await;

    let granted = token("AT1", None, "read write");
    assert!(adapter.verify_scope(&granted, "read"));
    assert!(adapter.verify_scope(&granted, "write read"));
    assert!(!adapter.verify_scope(&granted, "delete"));
    assert!(!adapter.verify_scope(&granted, "read delete"));

    let scopeless = token("AT2", None, "");
    assert!(!adapter.verify_scope(&scopeless, "read"));
    assert!(!adapter.verify_scope(&scopeless, ""));
}

// Issue a code, redeem it into a token pair, revoke the pair: none of the
// three identifier strings may resolve afterwards.
#[tokio::test]
async fn code_redemption_roundtrip_leaves_nothing_behind() {
    let (adapter, client, user) = seeded().await;

    adapter
        .issue_authorization_code(code("CODE1"), &client, &user)
        .await
        .expect("code issuance should succeed");

    let granted = adapter
        .lookup_authorization_code("CODE1")
        .await
        .expect("code lookup should succeed");
    assert_eq!(granted.user.id, user.id);
    assert_eq!(granted.client.client_id, client.client_id);

    // Redemption: the engine revokes the code and issues the token pair.
    assert!(adapter.revoke_authorization_code("CODE1").await);
    adapter
        .issue_access_token(token("AT1", Some("RT1"), "read write"), &client, Some(&user))
        .await
        .expect("token issuance should succeed");

    assert!(adapter.revoke_token("RT1").await);

    assert!(adapter.lookup_authorization_code("CODE1").await.is_none());
    assert!(adapter.lookup_access_token("AT1").await.is_none());
    assert!(adapter.lookup_refresh_token("RT1").await.is_none());

    assert!(!adapter.revoke_authorization_code("CODE1").await);
}

// Regression: an empty code must behave as a normal non-matching key, on an
// empty store and with unrelated records present.
#[tokio::test]
async fn empty_code_lookup_matches_nothing() {
    let empty = CredentialAdapter::new(Arc::new(MemoryStorage::new()));
    assert!(empty.lookup_authorization_code("").await.is_none());

    let (adapter, client, user) = seeded().await;
    adapter
        .issue_authorization_code(code("CODE1"), &client, &user)
        .await
        .expect("code issuance should succeed");
    adapter
        .issue_access_token(token("AT1", None, "read"), &client, Some(&user))
        .await
        .expect("token issuance should succeed");

    assert!(adapter.lookup_authorization_code("").await.is_none());
    assert!(!adapter.revoke_authorization_code("").await);
}

struct FailingStore;

fn outage() -> StoreError {
    StoreError::Backend("store unreachable".to_string())
}

#[async_trait]
impl CredentialStore for FailingStore {
    async fn init(&self) -> StoreResult<()> {
        Err(outage())
    }

    async fn save_client(&self, _client: &Client) -> StoreResult<()> {
        Err(outage())
    }

    async fn find_client(&self, _client_id: &str) -> StoreResult<Option<Client>> {
        Err(outage())
    }

    async fn save_user(&self, _user: &User) -> StoreResult<()> {
        Err(outage())
    }

    async fn find_user_by_username(&self, _username: &str) -> StoreResult<Option<User>> {
        Err(outage())
    }

    async fn find_user_by_id(&self, _id: &str) -> StoreResult<Option<User>> {
        Err(outage())
    }

    async fn save_token(&self, _token: &Token) -> StoreResult<()> {
        Err(outage())
    }

    async fn find_token_by_access_token(
        &self,
        _access_token: &str,
    ) -> StoreResult<Option<Token>> {
        Err(outage())
    }

    async fn find_token_by_refresh_token(
        &self,
        _refresh_token: &str,
    ) -> StoreResult<Option<Token>> {
        Err(outage())
    }

    async fn delete_token_by_refresh_token(&self, _refresh_token: &str) -> StoreResult<bool> {
        Err(outage())
    }

    async fn save_authorization_code(&self, _code: &AuthorizationCode) -> StoreResult<()> {
        Err(outage())
    }

    async fn find_authorization_code(
        &self,
        _code: &str,
    ) -> StoreResult<Option<AuthorizationCode>> {
        Err(outage())
    }

    async fn delete_authorization_code(&self, _code: &str) -> StoreResult<bool> {
        Err(outage())
    }
}

#[async_trait]
impl LedgerStore for FailingStore {
    async fn init(&self) -> StoreResult<()> {
        Err(outage())
    }

    async fn append_record(&self, _record: &LedgerRecord) -> StoreResult<()> {
        Err(outage())
    }

    async fn find_record(&self, _transaction_id: &str) -> StoreResult<Option<LedgerRecord>> {
        Err(outage())
    }
}

// A persistence fault must be indistinguishable from a missing credential
// through the engine-facing surface.
#[tokio::test]
async fn persistence_failure_degrades_to_not_found() {
    let adapter = CredentialAdapter::new(Arc::new(FailingStore));
    let client = client();
    let user = User::new("alice".to_string(), "hunter2", vec![]).expect("hashing");

    assert!(adapter.lookup_client("c1", "top-secret").await.is_none());
    assert!(adapter.lookup_user("alice", "hunter2").await.is_none());
    assert!(adapter
        .issue_access_token(token("AT1", Some("RT1"), "read"), &client, Some(&user))
        .await
        .is_none());
    assert!(adapter.lookup_access_token("AT1").await.is_none());
    assert!(adapter.lookup_refresh_token("RT1").await.is_none());
    assert!(!adapter.revoke_token("RT1").await);
    assert!(adapter
        .issue_authorization_code(code("CODE1"), &client, &user)
        .await
        .is_none());
    assert!(adapter.lookup_authorization_code("CODE1").await.is_none());
    assert!(!adapter.revoke_authorization_code("CODE1").await);
}

#[tokio::test]
async fn ledger_roundtrip_and_duplicate_degradation() {
    let adapter = LedgerAdapter::new(Arc::new(MemoryStorage::new()));

    let record = LedgerRecord::new(
        "tx_1".to_string(),
        serde_json::json!({ "entry": "credit", "amount": 7 }),
    );

    let saved = adapter.save(record.clone()).await.expect("save should succeed");
    assert_eq!(saved.transaction_id, "tx_1");

    let fetched = adapter.find_by_id("tx_1").await.expect("record should exist");
    assert_eq!(fetched.payload, record.payload);

    assert!(adapter.find_by_id("tx_2").await.is_none());

    // A second append with the same transaction id hits the unique key and
    // degrades to None.
    assert!(adapter.save(record).await.is_none());
}

#[tokio::test]
async fn ledger_failure_degrades_to_none() {
    let adapter = LedgerAdapter::new(Arc::new(FailingStore));

    let record = LedgerRecord::new("tx_1".to_string(), serde_json::json!({}));
    assert!(adapter.save(record).await.is_none());
    assert!(adapter.find_by_id("tx_1").await.is_none());
}
