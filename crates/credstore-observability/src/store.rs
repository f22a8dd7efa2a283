use async_trait::async_trait;
use tracing::{field, Instrument};

use credstore_core::{AuthorizationCode, Client, LedgerRecord, StoreResult, Token, User};
use credstore_ports::{CredentialStore, DynCredentialStore, DynLedgerStore, LedgerStore};

use crate::telemetry::annotate_span_with_trace_ids;

/// A thin wrapper around a `DynCredentialStore` that creates a tracing span
/// for each storage call.
///
/// Token, refresh-token, and code values are logged only as short prefixes.
pub struct ObservedStore {
    inner: DynCredentialStore,
    db_system: String,
}

impl ObservedStore {
    pub fn new(inner: DynCredentialStore, db_system: String) -> Self {
        Self { inner, db_system }
    }

    fn span(&self, operation: &'static str) -> tracing::Span {
        let span = tracing::info_span!(
            "db",
            trace_id = field::Empty,
            span_id = field::Empty,
            db_system = %self.db_system,
            db_operation = operation
        );
        annotate_span_with_trace_ids(&span);
        span
    }

    fn secret_prefix(value: &str) -> String {
        value.chars().take(12).collect::<String>()
    }
}

#[async_trait]
impl CredentialStore for ObservedStore {
    async fn init(&self) -> StoreResult<()> {
        let span = self.span("init");
        async move { self.inner.init().await }.instrument(span).await
    }

    async fn save_client(&self, client: &Client) -> StoreResult<()> {
        let span = tracing::info_span!(
            "db",
            trace_id = field::Empty,
            span_id = field::Empty,
            db_system = %self.db_system,
            db_operation = "save_client",
            client_id = %client.client_id
        );
        annotate_span_with_trace_ids(&span);
        async move { self.inner.save_client(client).await }
            .instrument(span)
            .await
    }

    async fn find_client(&self, client_id: &str) -> StoreResult<Option<Client>> {
        let span = tracing::info_span!(
            "db",
            trace_id = field::Empty,
            span_id = field::Empty,
            db_system = %self.db_system,
            db_operation = "find_client",
            client_id = %client_id
        );
        annotate_span_with_trace_ids(&span);
        async move { self.inner.find_client(client_id).await }
            .instrument(span)
            .await
    }

    async fn save_user(&self, user: &User) -> StoreResult<()> {
        let span = tracing::info_span!(
            "db",
            trace_id = field::Empty,
            span_id = field::Empty,
            db_system = %self.db_system,
            db_operation = "save_user",
            user_id = %user.id,
            username = %user.username
        );
        annotate_span_with_trace_ids(&span);
        async move { self.inner.save_user(user).await }
            .instrument(span)
            .await
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let span = tracing::info_span!(
            "db",
            trace_id = field::Empty,
            span_id = field::Empty,
            db_system = %self.db_system,
            db_operation = "find_user_by_username",
            username = %username
        );
        annotate_span_with_trace_ids(&span);
        async move { self.inner.find_user_by_username(username).await }
            .instrument(span)
            .await
    }

    async fn find_user_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        let span = tracing::info_span!(
            "db",
            trace_id = field::Empty,
            span_id = field::Empty,
            db_system = %self.db_system,
            db_operation = "find_user_by_id",
            user_id = %id
        );
        annotate_span_with_trace_ids(&span);
        async move { self.inner.find_user_by_id(id).await }
            .instrument(span)
            .await
    }

    async fn save_token(&self, token: &Token) -> StoreResult<()> {
        // Never log full tokens.
        let token_prefix = Self::secret_prefix(&token.access_token);
        let span = tracing::info_span!(
            "db",
            trace_id = field::Empty,
            span_id = field::Empty,
            db_system = %self.db_system,
            db_operation = "save_token",
            token_prefix = %token_prefix,
            client_id = %token.client_id,
            user_id = %token.user_id.as_deref().unwrap_or("")
        );
        annotate_span_with_trace_ids(&span);
        async move { self.inner.save_token(token).await }
            .instrument(span)
            .await
    }

    async fn find_token_by_access_token(
        &self,
        access_token: &str,
    ) -> StoreResult<Option<Token>> {
        let token_prefix = Self::secret_prefix(access_token);
        let span = tracing::info_span!(
            "db",
            trace_id = field::Empty,
            span_id = field::Empty,
            db_system = %self.db_system,
            db_operation = "find_token_by_access_token",
            token_prefix = %token_prefix,
            token_len = access_token.len()
        );
        annotate_span_with_trace_ids(&span);
        async move { self.inner.find_token_by_access_token(access_token).await }
            .instrument(span)
            .await
    }

    async fn find_token_by_refresh_token(
        &self,
        refresh_token: &str,
    ) -> StoreResult<Option<Token>> {
        let token_prefix = Self::secret_prefix(refresh_token);
        let span = tracing::info_span!(
            "db",
            trace_id = field::Empty,
            span_id = field::Empty,
            db_system = %self.db_system,
            db_operation = "find_token_by_refresh_token",
            token_prefix = %token_prefix,
            token_len = refresh_token.len()
        );
        annotate_span_with_trace_ids(&span);
        async move { self.inner.find_token_by_refresh_token(refresh_token).await }
            .instrument(span)
            .await
    }

    async fn delete_token_by_refresh_token(&self, refresh_token: &str) -> StoreResult<bool> {
        let token_prefix = Self::secret_prefix(refresh_token);
        let span = tracing::info_span!(
            "db",
            trace_id = field::Empty,
            span_id = field::Empty,
            db_system = %self.db_system,
            db_operation = "delete_token_by_refresh_token",
            token_prefix = %token_prefix,
            token_len = refresh_token.len()
        );
        annotate_span_with_trace_ids(&span);
        async move {
            self.inner
                .delete_token_by_refresh_token(refresh_token)
                .await
        }
        .instrument(span)
        .await
    }

    async fn save_authorization_code(&self, code: &AuthorizationCode) -> StoreResult<()> {
        let code_prefix = Self::secret_prefix(&code.code);
        let span = tracing::info_span!(
            "db",
            trace_id = field::Empty,
            span_id = field::Empty,
            db_system = %self.db_system,
            db_operation = "save_authorization_code",
            code_prefix = %code_prefix,
            client_id = %code.client_id,
            user_id = %code.user_id
        );
        annotate_span_with_trace_ids(&span);
        async move { self.inner.save_authorization_code(code).await }
            .instrument(span)
            .await
    }

    async fn find_authorization_code(
        &self,
        code: &str,
    ) -> StoreResult<Option<AuthorizationCode>> {
        let code_prefix = Self::secret_prefix(code);
        let span = tracing::info_span!(
            "db",
            trace_id = field::Empty,
            span_id = field::Empty,
            db_system = %self.db_system,
            db_operation = "find_authorization_code",
            code_prefix = %code_prefix,
            code_len = code.len()
        );
        annotate_span_with_trace_ids(&span);
        async move { self.inner.find_authorization_code(code).await }
            .instrument(span)
            .await
    }

    async fn delete_authorization_code(&self, code: &str) -> StoreResult<bool> {
        let code_prefix = Self::secret_prefix(code);
        let span = tracing::info_span!(
            "db",
            trace_id = field::Empty,
            span_id = field::Empty,
            db_system = %self.db_system,
            db_operation = "delete_authorization_code",
            code_prefix = %code_prefix,
            code_len = code.len()
        );
        annotate_span_with_trace_ids(&span);
        async move { self.inner.delete_authorization_code(code).await }
            .instrument(span)
            .await
    }

    async fn healthcheck(&self) -> StoreResult<()> {
        let span = self.span("healthcheck");
        async move { self.inner.healthcheck().await }
            .instrument(span)
            .await
    }
}

/// Span-per-call wrapper for ledger backends.
pub struct ObservedLedgerStore {
    inner: DynLedgerStore,
    db_system: String,
}

impl ObservedLedgerStore {
    pub fn new(inner: DynLedgerStore, db_system: String) -> Self {
        Self { inner, db_system }
    }

    fn span(&self, operation: &'static str) -> tracing::Span {
        let span = tracing::info_span!(
            "db",
            trace_id = field::Empty,
            span_id = field::Empty,
            db_system = %self.db_system,
            db_operation = operation
        );
        annotate_span_with_trace_ids(&span);
        span
    }
}

#[async_trait]
impl LedgerStore for ObservedLedgerStore {
    async fn init(&self) -> StoreResult<()> {
        let span = self.span("init");
        async move { self.inner.init().await }.instrument(span).await
    }

    async fn append_record(&self, record: &LedgerRecord) -> StoreResult<()> {
        let span = tracing::info_span!(
            "db",
            trace_id = field::Empty,
            span_id = field::Empty,
            db_system = %self.db_system,
            db_operation = "append_record",
            transaction_id = %record.transaction_id
        );
        annotate_span_with_trace_ids(&span);
        async move { self.inner.append_record(record).await }
            .instrument(span)
            .await
    }

    async fn find_record(&self, transaction_id: &str) -> StoreResult<Option<LedgerRecord>> {
        let span = tracing::info_span!(
            "db",
            trace_id = field::Empty,
            span_id = field::Empty,
            db_system = %self.db_system,
            db_operation = "find_record",
            transaction_id = %transaction_id
        );
        annotate_span_with_trace_ids(&span);
        async move { self.inner.find_record(transaction_id).await }
            .instrument(span)
            .await
    }

    async fn healthcheck(&self) -> StoreResult<()> {
        let span = self.span("healthcheck");
        async move { self.inner.healthcheck().await }
            .instrument(span)
            .await
    }
}
