use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::OffsetDateTime;

/// A session that has already been forwarded downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub session_id: String,
    /// RFC 3339 UTC timestamp string, second precision.
    pub sent_at: String,
}

/// Current UTC time formatted as `YYYY-MM-DDTHH:MM:SSZ`.
pub fn utc_timestamp() -> String {
    let format = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");
    OffsetDateTime::now_utc()
        .format(&format)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}
