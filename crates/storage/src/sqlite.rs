//! SQLite-backed ledger.
//!
//! Schema: a single `sent_sessions(session_id TEXT PRIMARY KEY, sent_at TEXT)`
//! table, created on open. Every `record` runs as its own autocommit
//! statement, so the entry is on disk when the call returns.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::StorageError;
use crate::record::{utc_timestamp, LedgerEntry};
use crate::traits::Ledger;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS sent_sessions \
                      (session_id TEXT PRIMARY KEY, sent_at TEXT)";

/// Durable ledger stored in a local SQLite database file.
#[derive(Debug)]
pub struct SqliteLedger {
    conn: Connection,
}

impl SqliteLedger {
    /// Open (or create) the ledger at `path`, creating parent directories.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::Io {
                path: parent.display().to_string(),
                message: e.to_string(),
            })?;
        }
        let conn = Connection::open(path)?;
        Self::bootstrap(conn)
    }

    /// A ledger backed by a private in-memory database.
    pub fn in_memory() -> Result<Self, StorageError> {
        Self::bootstrap(Connection::open_in_memory()?)
    }

    fn bootstrap(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }
}

impl Ledger for SqliteLedger {
    fn exists(&self, session_id: &str) -> Result<bool, StorageError> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM sent_sessions WHERE session_id = ?1",
                params![session_id],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn record(&self, session_id: &str) -> Result<(), StorageError> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO sent_sessions(session_id, sent_at) VALUES (?1, ?2)",
            params![session_id, utc_timestamp()],
        )?;
        if inserted == 0 {
            tracing::debug!(session_id, "ledger entry already present");
        }
        Ok(())
    }

    fn entry(&self, session_id: &str) -> Result<Option<LedgerEntry>, StorageError> {
        let entry = self
            .conn
            .query_row(
                "SELECT session_id, sent_at FROM sent_sessions WHERE session_id = ?1",
                params![session_id],
                |row| {
                    Ok(LedgerEntry {
                        session_id: row.get(0)?,
                        sent_at: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    })
                },
            )
            .optional()?;
        Ok(entry)
    }

    fn entries(&self) -> Result<Vec<LedgerEntry>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT session_id, sent_at FROM sent_sessions ORDER BY sent_at ASC, session_id ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(LedgerEntry {
                session_id: row.get(0)?,
                sent_at: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(StorageError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conformance::run_conformance_suite;

    #[test]
    fn in_memory_sqlite_passes_conformance() {
        let report = run_conformance_suite(|| SqliteLedger::in_memory().expect("open in-memory"));
        assert!(report.failed == 0, "{report}");
    }

    #[test]
    fn entries_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db").join("sent.db");

        {
            let ledger = SqliteLedger::open(&path).unwrap();
            ledger.record("hv-session-1").unwrap();
        }

        let reopened = SqliteLedger::open(&path).unwrap();
        assert!(reopened.exists("hv-session-1").unwrap());
        assert!(!reopened.exists("hv-session-2").unwrap());
        assert_eq!(reopened.entries().unwrap().len(), 1);
    }

    #[test]
    fn open_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("ledger.db");
        SqliteLedger::open(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn open_reads_table_written_by_another_tool() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(SCHEMA).unwrap();
            conn.execute(
                "INSERT INTO sent_sessions(session_id, sent_at) VALUES ('legacy', NULL)",
                [],
            )
            .unwrap();
        }

        let ledger = SqliteLedger::open(&path).unwrap();
        let entry = ledger.entry("legacy").unwrap().expect("legacy row");
        assert_eq!(entry.sent_at, "");
    }
}
