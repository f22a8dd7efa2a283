use async_trait::async_trait;
use mongodb::{
    bson::doc,
    options::{ClientOptions, IndexOptions},
    Client as MongoClient, Collection, Database, IndexModel,
};

use credstore_core::{
    AuthorizationCode, Client, LedgerRecord, StoreError, StoreResult, Token, User,
};
use credstore_ports::{CredentialStore, LedgerStore};

/// MongoDB-backed storage implementation.
///
/// Notes:
/// - Uses the core records as documents via `serde`.
/// - Token/code uniqueness is enforced by unique indexes; a collision
///   surfaces as `StoreError::DuplicateKey`.
/// - Revocation deletes the record; there is no status flag to reset.
pub struct MongoStorage {
    db: Database,
    clients: Collection<Client>,
    users: Collection<User>,
    tokens: Collection<Token>,
    authorization_codes: Collection<AuthorizationCode>,
    ledger_records: Collection<LedgerRecord>,
}

impl MongoStorage {
    pub async fn new(uri: &str) -> StoreResult<Self> {
        let mut opts = ClientOptions::parse(uri)
            .await
            .map_err(Self::mongo_err_to_store)?;
        if opts.app_name.is_none() {
            opts.app_name = Some("credstore-storage-mongo".to_string());
        }

        let client = MongoClient::with_options(opts).map_err(Self::mongo_err_to_store)?;

        // If URI doesn't specify a database, fall back to "credstore".
        let db_name = client
            .default_database()
            .map(|d| d.name().to_string())
            .unwrap_or_else(|| "credstore".to_string());

        let db = client.database(&db_name);

        let clients = db.collection::<Client>("clients");
        let users = db.collection::<User>("users");
        let tokens = db.collection::<Token>("tokens");
        let authorization_codes = db.collection::<AuthorizationCode>("authorization_codes");
        let ledger_records = db.collection::<LedgerRecord>("ledger_records");

        Ok(Self {
            db,
            clients,
            users,
            tokens,
            authorization_codes,
            ledger_records,
        })
    }

    async fn ensure_indexes(&self) -> StoreResult<()> {
        // clients.client_id unique
        self.clients
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "client_id": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
                None,
            )
            .await
            .map_err(Self::mongo_err_to_store)?;

        // users.username unique
        self.users
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "username": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
                None,
            )
            .await
            .map_err(Self::mongo_err_to_store)?;

        // users.id unique (token/code owner references resolve by this key)
        self.users
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "id": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
                None,
            )
            .await
            .map_err(Self::mongo_err_to_store)?;

        // tokens.access_token unique
        self.tokens
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "access_token": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
                None,
            )
            .await
            .map_err(Self::mongo_err_to_store)?;

        // tokens.refresh_token unique sparse (allow many absent fields)
        self.tokens
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "refresh_token": 1 })
                    .options(IndexOptions::builder().unique(true).sparse(true).build())
                    .build(),
                None,
            )
            .await
            .map_err(Self::mongo_err_to_store)?;

        // authorization_codes.code unique
        self.authorization_codes
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "code": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
                None,
            )
            .await
            .map_err(Self::mongo_err_to_store)?;

        // ledger_records.transaction_id unique
        self.ledger_records
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "transaction_id": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
                None,
            )
            .await
            .map_err(Self::mongo_err_to_store)?;

        Ok(())
    }

    fn duplicate_key_error(err: &mongodb::error::Error) -> bool {
        // Canonical server-side message includes "E11000".
        err.to_string().contains("E11000")
    }

    fn mongo_err_to_store(err: mongodb::error::Error) -> StoreError {
        if Self::duplicate_key_error(&err) {
            return StoreError::DuplicateKey(err.to_string());
        }

        StoreError::Backend(err.to_string())
    }
}

#[async_trait]
impl CredentialStore for MongoStorage {
    async fn init(&self) -> StoreResult<()> {
        self.db
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(Self::mongo_err_to_store)?;
        self.ensure_indexes().await
    }

    async fn save_client(&self, client: &Client) -> StoreResult<()> {
        self.clients
            .insert_one(client, None)
            .await
            .map(|_| ())
            .map_err(Self::mongo_err_to_store)
    }

    async fn find_client(&self, client_id: &str) -> StoreResult<Option<Client>> {
        self.clients
            .find_one(doc! { "client_id": client_id }, None)
            .await
            .map_err(Self::mongo_err_to_store)
    }

    async fn save_user(&self, user: &User) -> StoreResult<()> {
        self.users
            .insert_one(user, None)
            .await
            .map(|_| ())
            .map_err(Self::mongo_err_to_store)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        self.users
            .find_one(doc! { "username": username }, None)
            .await
            .map_err(Self::mongo_err_to_store)
    }

    async fn find_user_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        self.users
            .find_one(doc! { "id": id }, None)
            .await
            .map_err(Self::mongo_err_to_store)
    }

    async fn save_token(&self, token: &Token) -> StoreResult<()> {
        self.tokens
            .insert_one(token, None)
            .await
            .map(|_| ())
            .map_err(Self::mongo_err_to_store)
    }

    async fn find_token_by_access_token(
        &self,
        access_token: &str,
    ) -> StoreResult<Option<Token>> {
        self.tokens
            .find_one(doc! { "access_token": access_token }, None)
            .await
            .map_err(Self::mongo_err_to_store)
    }

    async fn find_token_by_refresh_token(
        &self,
        refresh_token: &str,
    ) -> StoreResult<Option<Token>> {
        self.tokens
            .find_one(doc! { "refresh_token": refresh_token }, None)
            .await
            .map_err(Self::mongo_err_to_store)
    }

    async fn delete_token_by_refresh_token(&self, refresh_token: &str) -> StoreResult<bool> {
        self.tokens
            .delete_one(doc! { "refresh_token": refresh_token }, None)
            .await
            .map(|res| res.deleted_count == 1)
            .map_err(Self::mongo_err_to_store)
    }

    async fn save_authorization_code(&self, code: &AuthorizationCode) -> StoreResult<()> {
        self.authorization_codes
            .insert_one(code, None)
            .await
            .map(|_| ())
            .map_err(Self::mongo_err_to_store)
    }

    async fn find_authorization_code(
        &self,
        code: &str,
    ) -> StoreResult<Option<AuthorizationCode>> {
        self.authorization_codes
            .find_one(doc! { "code": code }, None)
            .await
            .map_err(Self::mongo_err_to_store)
    }

    async fn delete_authorization_code(&self, code: &str) -> StoreResult<bool> {
        self.authorization_codes
            .delete_one(doc! { "code": code }, None)
            .await
            .map(|res| res.deleted_count == 1)
            .map_err(Self::mongo_err_to_store)
    }

    async fn healthcheck(&self) -> StoreResult<()> {
        self.db
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map(|_| ())
            .map_err(Self::mongo_err_to_store)
    }
}

#[async_trait]
impl LedgerStore for MongoStorage {
    async fn init(&self) -> StoreResult<()> {
        CredentialStore::init(self).await
    }

    async fn append_record(&self, record: &LedgerRecord) -> StoreResult<()> {
        self.ledger_records
            .insert_one(record, None)
            .await
            .map(|_| ())
            .map_err(Self::mongo_err_to_store)
    }

    async fn find_record(&self, transaction_id: &str) -> StoreResult<Option<LedgerRecord>> {
        self.ledger_records
            .find_one(doc! { "transaction_id": transaction_id }, None)
            .await
            .map_err(Self::mongo_err_to_store)
    }

    async fn healthcheck(&self) -> StoreResult<()> {
        CredentialStore::healthcheck(self).await
    }
}
