use crate::error::StorageError;
use crate::record::LedgerEntry;

/// Durable record of sessions already forwarded to the destination.
///
/// The ledger is a write-once idempotency fence: an entry is created at most
/// once per session id and is never updated or removed.
///
/// ## Insert Semantics
///
/// `record` is idempotent. Recording a session that is already present is a
/// silent no-op and keeps the original `sent_at`. Implementations must make
/// the entry durable before `record` returns.
///
/// ## Concurrency
///
/// A single poll pass reads then writes with no concurrent writers, so no
/// locking is required beyond the backend's own atomic insert.
pub trait Ledger {
    /// Returns `true` if the session has already been recorded.
    fn exists(&self, session_id: &str) -> Result<bool, StorageError>;

    /// Record a session as forwarded. No-op if already present.
    fn record(&self, session_id: &str) -> Result<(), StorageError>;

    /// Read a single entry, if present.
    fn entry(&self, session_id: &str) -> Result<Option<LedgerEntry>, StorageError>;

    /// All entries, ordered by `sent_at` then `session_id`.
    fn entries(&self) -> Result<Vec<LedgerEntry>, StorageError>;
}

impl<L: Ledger + ?Sized> Ledger for &L {
    fn exists(&self, session_id: &str) -> Result<bool, StorageError> {
        (**self).exists(session_id)
    }

    fn record(&self, session_id: &str) -> Result<(), StorageError> {
        (**self).record(session_id)
    }

    fn entry(&self, session_id: &str) -> Result<Option<LedgerEntry>, StorageError> {
        (**self).entry(session_id)
    }

    fn entries(&self) -> Result<Vec<LedgerEntry>, StorageError> {
        (**self).entries()
    }
}
