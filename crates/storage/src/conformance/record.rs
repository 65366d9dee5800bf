use super::TestResult;
use crate::Ledger;

pub(super) fn run_record_tests<L, F>(factory: &F) -> Vec<TestResult>
where
    L: Ledger,
    F: Fn() -> L,
{
    vec![
        TestResult::from_result(
            "record",
            "fresh_ledger_is_empty",
            fresh_ledger_is_empty(factory),
        ),
        TestResult::from_result(
            "record",
            "record_then_exists",
            record_then_exists(factory),
        ),
        TestResult::from_result(
            "record",
            "duplicate_record_is_absorbed",
            duplicate_record_is_absorbed(factory),
        ),
        TestResult::from_result(
            "record",
            "duplicate_record_keeps_first_timestamp",
            duplicate_record_keeps_first_timestamp(factory),
        ),
        TestResult::from_result(
            "record",
            "sessions_are_independent",
            sessions_are_independent(factory),
        ),
    ]
}

// ── Test implementations ──────────────────────────────────────────────────────

fn fresh_ledger_is_empty<L: Ledger, F: Fn() -> L>(factory: &F) -> Result<(), String> {
    let l = factory();
    if l.exists("hv-session-1").map_err(|e| e.to_string())? {
        return Err("fresh ledger reports an existing session".to_string());
    }
    let entries = l.entries().map_err(|e| e.to_string())?;
    if !entries.is_empty() {
        return Err(format!("expected no entries, got {}", entries.len()));
    }
    Ok(())
}

fn record_then_exists<L: Ledger, F: Fn() -> L>(factory: &F) -> Result<(), String> {
    let l = factory();
    l.record("hv-session-1").map_err(|e| e.to_string())?;
    if !l.exists("hv-session-1").map_err(|e| e.to_string())? {
        return Err("recorded session not found".to_string());
    }
    Ok(())
}

/// Recording twice must neither error nor create a second entry.
fn duplicate_record_is_absorbed<L: Ledger, F: Fn() -> L>(factory: &F) -> Result<(), String> {
    let l = factory();
    l.record("hv-session-1").map_err(|e| e.to_string())?;
    l.record("hv-session-1")
        .map_err(|e| format!("duplicate record raised an error: {e}"))?;
    let entries = l.entries().map_err(|e| e.to_string())?;
    if entries.len() != 1 {
        return Err(format!("expected 1 entry, got {}", entries.len()));
    }
    Ok(())
}

fn duplicate_record_keeps_first_timestamp<L: Ledger, F: Fn() -> L>(
    factory: &F,
) -> Result<(), String> {
    let l = factory();
    l.record("hv-session-1").map_err(|e| e.to_string())?;
    let first = l
        .entry("hv-session-1")
        .map_err(|e| e.to_string())?
        .ok_or("entry missing after record")?;
    l.record("hv-session-1").map_err(|e| e.to_string())?;
    let second = l
        .entry("hv-session-1")
        .map_err(|e| e.to_string())?
        .ok_or("entry missing after duplicate record")?;
    if first.sent_at != second.sent_at {
        return Err(format!(
            "sent_at changed from {} to {}",
            first.sent_at, second.sent_at
        ));
    }
    Ok(())
}

fn sessions_are_independent<L: Ledger, F: Fn() -> L>(factory: &F) -> Result<(), String> {
    let l = factory();
    l.record("hv-session-a").map_err(|e| e.to_string())?;
    if l.exists("hv-session-b").map_err(|e| e.to_string())? {
        return Err("recording one session marked another".to_string());
    }
    Ok(())
}
