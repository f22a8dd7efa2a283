use std::fmt;

/// Failure signal for the persistence layer.
///
/// Not-found is not an error: lookups return `Ok(None)` and conditional
/// deletes return `Ok(false)`. These variants exist so backends can report
/// real faults distinctly; the engine-facing adapter is the only place they
/// are collapsed into the negative sentinel the authorization engine expects.
#[derive(Debug, Clone)]
pub enum StoreError {
    /// A unique index rejected the write.
    DuplicateKey(String),
    /// The backing store failed or was unreachable.
    Backend(String),
    /// Password-hashing machinery failed.
    Crypto(String),
    /// No backend matches the requested configuration.
    Unsupported(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::DuplicateKey(msg) => write!(f, "duplicate key: {msg}"),
            StoreError::Backend(msg) => write!(f, "storage backend failure: {msg}"),
            StoreError::Crypto(msg) => write!(f, "credential hashing failure: {msg}"),
            StoreError::Unsupported(msg) => write!(f, "unsupported backend: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

pub type StoreResult<T> = Result<T, StoreError>;
