//! Storage backend selection for credstore.
//!
//! This crate centralizes URL-based backend selection (Mongo vs in-memory)
//! and wraps the chosen implementation with the observability decorators for
//! tracing.

use std::sync::Arc;

use credstore_core::{StoreError, StoreResult};

pub use credstore_observability::{ObservedLedgerStore, ObservedStore};
pub use credstore_ports::{CredentialStore, DynCredentialStore, DynLedgerStore, LedgerStore};

/// Module path for the Mongo backend.
pub mod mongo {
    pub use credstore_storage_mongo::MongoStorage;
}

/// Module path for the in-memory backend.
pub mod memory {
    pub use credstore_storage_memory::MemoryStorage;
}

/// Create credential and ledger stores backed by the same storage, based on
/// URL scheme.
///
/// Supported:
/// - `mongodb://...` and `mongodb+srv://...` -> Mongo backend
/// - `memory://` (or the bare word `memory`) -> in-memory backend
pub async fn create_stores(
    database_url: &str,
) -> StoreResult<(DynCredentialStore, DynLedgerStore)> {
    if database_url.starts_with("mongodb://") || database_url.starts_with("mongodb+srv://") {
        let storage = Arc::new(mongo::MongoStorage::new(database_url).await?);

        let credentials: DynCredentialStore = storage.clone();
        let ledger: DynLedgerStore = storage;

        return Ok((
            Arc::new(ObservedStore::new(credentials, "mongodb".to_string())),
            Arc::new(ObservedLedgerStore::new(ledger, "mongodb".to_string())),
        ));
    }

    if database_url == "memory" || database_url.starts_with("memory://") {
        let storage = Arc::new(memory::MemoryStorage::new());

        let credentials: DynCredentialStore = storage.clone();
        let ledger: DynLedgerStore = storage;

        return Ok((
            Arc::new(ObservedStore::new(credentials, "memory".to_string())),
            Arc::new(ObservedLedgerStore::new(ledger, "memory".to_string())),
        ));
    }

    // Scheme only; the full URL may embed credentials.
    let scheme = database_url.split("://").next().unwrap_or_default();
    Err(StoreError::Unsupported(format!(
        "no storage backend for URL scheme `{scheme}`"
    )))
}

/// Convenience wrapper for callers that only need the credential side.
pub async fn create_credential_store(database_url: &str) -> StoreResult<DynCredentialStore> {
    let (credentials, _) = create_stores(database_url).await?;
    Ok(credentials)
}

/// Convenience wrapper for callers that only need the ledger side.
pub async fn create_ledger_store(database_url: &str) -> StoreResult<DynLedgerStore> {
    let (_, ledger) = create_stores(database_url).await?;
    Ok(ledger)
}
