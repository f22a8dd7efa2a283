use credstore_core::{
    AuthorizationCode, Client, GrantedCode, GrantedToken, Token, User,
};
use credstore_events::{
    CredentialEvent, EventBusHandle, EventEnvelope, EventSeverity, EventType,
};
use credstore_ports::DynCredentialStore;

use crate::degrade;

const PRODUCER: &str = "credstore";

/// The persistence contract an external OAuth2 authorization engine requires.
///
/// Each operation is invoked by the engine during a grant-flow execution and
/// resolves to the sentinel shape it expects: `Option<_>` for lookups and
/// issuance, `bool` for revocations. Faults never cross this boundary.
pub struct CredentialAdapter {
    store: DynCredentialStore,
    events: Option<EventBusHandle>,
}

impl CredentialAdapter {
    pub fn new(store: DynCredentialStore) -> Self {
        Self {
            store,
            events: None,
        }
    }

    pub fn with_events(mut self, events: EventBusHandle) -> Self {
        self.events = Some(events);
        self
    }

    /// Look up a client and check its secret in constant time.
    pub async fn lookup_client(&self, client_id: &str, client_secret: &str) -> Option<Client> {
        let client = degrade("find_client", self.store.find_client(client_id).await)?;

        if client.secret_matches(client_secret) {
            Some(client)
        } else {
            None
        }
    }

    /// Look up a user by username and verify the presented password.
    pub async fn lookup_user(&self, username: &str, password: &str) -> Option<User> {
        let user = degrade(
            "find_user_by_username",
            self.store.find_user_by_username(username).await,
        )?;

        if user.verify_password(password) {
            Some(user)
        } else {
            None
        }
    }

    /// Persist an access/refresh token pair for the given client and user.
    ///
    /// The record's owning references are stamped from the supplied client
    /// and user; whatever the engine put in those fields is overwritten.
    pub async fn issue_access_token(
        &self,
        token: Token,
        client: &Client,
        user: Option<&User>,
    ) -> Option<GrantedToken> {
        let mut record = token;
        record.client_id = client.client_id.clone();
        record.user_id = user.map(|u| u.id.clone());

        match self.store.save_token(&record).await {
            Ok(()) => {
                self.emit(
                    EventType::TokenIssued,
                    record.user_id.clone(),
                    Some(record.client_id.clone()),
                );
                Some(GrantedToken {
                    token: record,
                    client: client.clone(),
                    user: user.cloned(),
                })
            }
            Err(err) => {
                tracing::warn!(
                    db_operation = "save_token",
                    error = %err,
                    "persistence failure degraded to not-found"
                );
                None
            }
        }
    }

    pub async fn lookup_access_token(&self, access_token: &str) -> Option<GrantedToken> {
        let token = degrade(
            "find_token_by_access_token",
            self.store.find_token_by_access_token(access_token).await,
        )?;

        self.join_token(token).await
    }

    pub async fn lookup_refresh_token(&self, refresh_token: &str) -> Option<GrantedToken> {
        let token = degrade(
            "find_token_by_refresh_token",
            self.store.find_token_by_refresh_token(refresh_token).await,
        )?;

        self.join_token(token).await
    }

    /// Revoke the token holding this refresh token.
    ///
    /// True iff exactly one record was deleted; a second call with the same
    /// string returns false.
    pub async fn revoke_token(&self, refresh_token: &str) -> bool {
        match self
            .store
            .delete_token_by_refresh_token(refresh_token)
            .await
        {
            Ok(true) => {
                self.emit(EventType::TokenRevoked, None, None);
                true
            }
            Ok(false) => false,
            Err(err) => {
                tracing::warn!(
                    db_operation = "delete_token_by_refresh_token",
                    error = %err,
                    "persistence failure degraded to false"
                );
                false
            }
        }
    }

    /// Persist an authorization code for the given client and user.
    pub async fn issue_authorization_code(
        &self,
        code: AuthorizationCode,
        client: &Client,
        user: &User,
    ) -> Option<GrantedCode> {
        let mut record = code;
        record.client_id = client.client_id.clone();
        record.user_id = user.id.clone();

        match self.store.save_authorization_code(&record).await {
            Ok(()) => {
                self.emit(
                    EventType::AuthorizationCodeIssued,
                    Some(record.user_id.clone()),
                    Some(record.client_id.clone()),
                );
                Some(GrantedCode {
                    code: record,
                    client: client.clone(),
                    user: user.clone(),
                })
            }
            Err(err) => {
                tracing::warn!(
                    db_operation = "save_authorization_code",
                    error = %err,
                    "persistence failure degraded to not-found"
                );
                None
            }
        }
    }

    /// Look up an authorization code.
    ///
    /// An empty string is passed through as an ordinary lookup key, not
    /// rejected; codes live in their own collection, so it cannot match a
    /// record of another role.
    pub async fn lookup_authorization_code(&self, code: &str) -> Option<GrantedCode> {
        let record = degrade(
            "find_authorization_code",
            self.store.find_authorization_code(code).await,
        )?;

        self.join_code(record).await
    }

    pub async fn revoke_authorization_code(&self, code: &str) -> bool {
        match self.store.delete_authorization_code(code).await {
            Ok(true) => {
                self.emit(EventType::AuthorizationCodeRevoked, None, None);
                true
            }
            Ok(false) => false,
            Err(err) => {
                tracing::warn!(
                    db_operation = "delete_authorization_code",
                    error = %err,
                    "persistence failure degraded to false"
                );
                false
            }
        }
    }

    /// True iff every requested scope element is present in the token's
    /// granted scope set. A token without granted scope satisfies nothing.
    pub fn verify_scope(&self, token: &Token, requested: &str) -> bool {
        credstore_core::verify_scope(&token.scope, requested)
    }

    // A dangling client or user reference is indistinguishable from a
    // missing token.
    async fn join_token(&self, token: Token) -> Option<GrantedToken> {
        let client = degrade("find_client", self.store.find_client(&token.client_id).await)?;

        let user = match token.user_id.as_deref() {
            Some(user_id) => Some(degrade(
                "find_user_by_id",
                self.store.find_user_by_id(user_id).await,
            )?),
            None => None,
        };

        Some(GrantedToken {
            token,
            client,
            user,
        })
    }

    async fn join_code(&self, code: AuthorizationCode) -> Option<GrantedCode> {
        let client = degrade("find_client", self.store.find_client(&code.client_id).await)?;
        let user = degrade(
            "find_user_by_id",
            self.store.find_user_by_id(&code.user_id).await,
        )?;

        Some(GrantedCode { code, client, user })
    }

    fn emit(&self, event_type: EventType, user_id: Option<String>, client_id: Option<String>) {
        if let Some(bus) = &self.events {
            let event = CredentialEvent::new(event_type, EventSeverity::Info, user_id, client_id);
            bus.publish_best_effort(EventEnvelope::from_current_span(event, PRODUCER));
        }
    }
}
