/// All errors that can be returned by a Ledger implementation.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The ledger file (or its parent directory) could not be prepared.
    #[error("ledger path {path}: {message}")]
    Io { path: String, message: String },

    /// A backend-specific storage error (DB connection, statement failure, etc.).
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(e: rusqlite::Error) -> Self {
        StorageError::Backend(e.to_string())
    }
}
