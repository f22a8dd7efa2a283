//! Engine-facing adapters over the storage ports.
//!
//! The external OAuth2 engine drives grant flows through [`CredentialAdapter`]
//! and expects negative outcomes as sentinels (`None` / `false`), never as
//! errors. This crate is the one place where persistence faults are collapsed
//! into those sentinels; below it, the ports keep the distinct error signal
//! for logging.

mod engine;
mod ledger;

pub use engine::CredentialAdapter;
pub use ledger::LedgerAdapter;

use credstore_core::StoreResult;

/// Collapse a port result into the engine's not-found sentinel.
///
/// A persistence fault must be indistinguishable, from the engine's
/// perspective, from a credential that does not exist.
pub(crate) fn degrade<T>(operation: &'static str, result: StoreResult<Option<T>>) -> Option<T> {
    match result {
        Ok(found) => found,
        Err(err) => {
            tracing::warn!(
                db_operation = operation,
                error = %err,
                "persistence failure degraded to not-found"
            );
            None
        }
    }
}
