use std::path::Path;

use hvlink_storage::{Ledger, SqliteLedger};
use serde_json::json;

use crate::OutputFormat;

pub(crate) fn cmd_ledger(
    path: &Path,
    output: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = SqliteLedger::open(path)?;
    let entries = ledger.entries()?;

    match output {
        OutputFormat::Json => {
            let rows: Vec<serde_json::Value> = entries
                .iter()
                .map(|e| json!({"session_id": e.session_id, "sent_at": e.sent_at}))
                .collect();
            println!("{}", serde_json::Value::Array(rows));
        }
        OutputFormat::Text => {
            if entries.is_empty() {
                println!("no sessions forwarded yet ({})", path.display());
            }
            for e in &entries {
                println!("{}  {}", e.sent_at, e.session_id);
            }
        }
    }
    Ok(())
}
