use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::error::StorageError;
use crate::record::{utc_timestamp, LedgerEntry};
use crate::traits::Ledger;

/// Non-durable ledger kept in process memory.
///
/// Useful for dry runs and tests; entries vanish when the value is dropped.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>, StorageError> {
        self.entries
            .lock()
            .map_err(|_| StorageError::Backend("memory ledger lock poisoned".to_string()))
    }
}

impl Ledger for MemoryLedger {
    fn exists(&self, session_id: &str) -> Result<bool, StorageError> {
        Ok(self.lock()?.contains_key(session_id))
    }

    fn record(&self, session_id: &str) -> Result<(), StorageError> {
        self.lock()?
            .entry(session_id.to_string())
            .or_insert_with(utc_timestamp);
        Ok(())
    }

    fn entry(&self, session_id: &str) -> Result<Option<LedgerEntry>, StorageError> {
        Ok(self.lock()?.get(session_id).map(|sent_at| LedgerEntry {
            session_id: session_id.to_string(),
            sent_at: sent_at.clone(),
        }))
    }

    fn entries(&self) -> Result<Vec<LedgerEntry>, StorageError> {
        let mut entries: Vec<LedgerEntry> = self
            .lock()?
            .iter()
            .map(|(session_id, sent_at)| LedgerEntry {
                session_id: session_id.clone(),
                sent_at: sent_at.clone(),
            })
            .collect();
        entries.sort_by(|a, b| {
            a.sent_at
                .cmp(&b.sent_at)
                .then_with(|| a.session_id.cmp(&b.session_id))
        });
        Ok(entries)
    }
}
