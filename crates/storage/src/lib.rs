pub mod conformance;
mod error;
mod memory;
mod record;
mod sqlite;
mod traits;

pub use error::StorageError;
pub use memory::MemoryLedger;
pub use record::{utc_timestamp, LedgerEntry};
pub use sqlite::SqliteLedger;
pub use traits::Ledger;
