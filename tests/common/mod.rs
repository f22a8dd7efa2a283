use chrono::{Duration, Utc};
use credstore_core::{AuthorizationCode, Client, LedgerRecord, Token, User};
use credstore_ports::{CredentialStore, LedgerStore};

/// A minimal contract test suite that every `CredentialStore` backend must
/// satisfy.
///
/// This keeps backend parity honest (Mongo, in-memory, and any future
/// backends).
pub async fn run_credential_contract(
    storage: &dyn CredentialStore,
) -> Result<(), Box<dyn std::error::Error>> {
    // Client roundtrip
    let client = Client::new(
        "client_1".to_string(),
        "secret".to_string(),
        vec!["authorization_code".to_string()],
        vec!["http://localhost/cb".to_string()],
        "contract-suite".to_string(),
    );

    storage
        .save_client(&client)
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    let fetched = storage
        .find_client("client_1")
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?
        .ok_or_else(|| std::io::Error::other("client should exist"))?;

    assert_eq!(fetched.client_id, client.client_id);

    // Uniqueness parity: saving the same client_id twice should fail.
    let dup = storage.save_client(&client).await;
    assert!(dup.is_err(), "saving the same client_id twice should fail");

    // User roundtrip, by username and by id
    let user = User::new("user_1".to_string(), "password", vec!["user".to_string()])
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    storage
        .save_user(&user)
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    let by_username = storage
        .find_user_by_username("user_1")
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?
        .ok_or_else(|| std::io::Error::other("user should exist"))?;

    assert_eq!(by_username.id, user.id);

    let by_id = storage
        .find_user_by_id(&user.id)
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?
        .ok_or_else(|| std::io::Error::other("user should exist by id"))?;

    assert_eq!(by_id.username, user.username);

    // Token roundtrip + revoke-by-deletion
    let token = Token::new(
        "access_token_1".to_string(),
        Utc::now() + Duration::seconds(3600),
        Some("refresh_token_1".to_string()),
        Some(Utc::now() + Duration::seconds(86400)),
        "read".to_string(),
        client.client_id.clone(),
        Some(user.id.clone()),
    );

    storage
        .save_token(&token)
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    let by_access = storage
        .find_token_by_access_token("access_token_1")
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?
        .ok_or_else(|| std::io::Error::other("token should exist"))?;

    assert_eq!(by_access.refresh_token.as_deref(), Some("refresh_token_1"));

    let by_refresh = storage
        .find_token_by_refresh_token("refresh_token_1")
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?
        .ok_or_else(|| std::io::Error::other("token should exist by refresh"))?;

    assert_eq!(by_refresh.access_token, "access_token_1");

    let deleted = storage
        .delete_token_by_refresh_token("refresh_token_1")
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    assert!(deleted, "first delete should remove exactly one token");

    assert!(storage
        .find_token_by_access_token("access_token_1")
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?
        .is_none());

    let deleted_again = storage
        .delete_token_by_refresh_token("refresh_token_1")
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    assert!(!deleted_again, "second delete should match nothing");

    // Authorization code roundtrip + revoke-by-deletion
    let code = AuthorizationCode::new(
        "code_1".to_string(),
        Utc::now() + Duration::seconds(300),
        "http://localhost/cb".to_string(),
        "read".to_string(),
        client.client_id.clone(),
        user.id.clone(),
    );

    storage
        .save_authorization_code(&code)
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    let fetched_code = storage
        .find_authorization_code("code_1")
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?
        .ok_or_else(|| std::io::Error::other("auth code should exist"))?;

    assert_eq!(fetched_code.redirect_uri, code.redirect_uri);

    // An empty lookup key is a normal query that must match nothing,
    // even with records present.
    assert!(storage
        .find_authorization_code("")
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?
        .is_none());

    let deleted = storage
        .delete_authorization_code("code_1")
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    assert!(deleted, "first delete should remove exactly one code");

    let deleted_again = storage
        .delete_authorization_code("code_1")
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    assert!(!deleted_again, "second delete should match nothing");

    Ok(())
}

/// Contract suite for `LedgerStore` backends: append, point lookup, and
/// duplicate rejection. There is deliberately no update/delete to exercise.
pub async fn run_ledger_contract(
    storage: &dyn LedgerStore,
) -> Result<(), Box<dyn std::error::Error>> {
    let record = LedgerRecord::new(
        "tx_1".to_string(),
        serde_json::json!({ "amount": 42, "currency": "USD" }),
    );

    storage
        .append_record(&record)
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    let fetched = storage
        .find_record("tx_1")
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?
        .ok_or_else(|| std::io::Error::other("ledger record should exist"))?;

    assert_eq!(fetched.payload, record.payload);

    assert!(storage
        .find_record("tx_missing")
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?
        .is_none());

    let dup = storage.append_record(&record).await;
    assert!(dup.is_err(), "appending the same transaction_id twice should fail");

    Ok(())
}
