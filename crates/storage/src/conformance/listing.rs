use super::TestResult;
use crate::Ledger;

pub(super) fn run_listing_tests<L, F>(factory: &F) -> Vec<TestResult>
where
    L: Ledger,
    F: Fn() -> L,
{
    vec![
        TestResult::from_result(
            "listing",
            "entry_for_unknown_session_is_none",
            entry_for_unknown_session_is_none(factory),
        ),
        TestResult::from_result(
            "listing",
            "entry_carries_timestamp",
            entry_carries_timestamp(factory),
        ),
        TestResult::from_result(
            "listing",
            "entries_lists_every_session_once",
            entries_lists_every_session_once(factory),
        ),
    ]
}

fn entry_for_unknown_session_is_none<L: Ledger, F: Fn() -> L>(factory: &F) -> Result<(), String> {
    let l = factory();
    match l.entry("missing").map_err(|e| e.to_string())? {
        None => Ok(()),
        Some(e) => Err(format!("unexpected entry {e:?}")),
    }
}

fn entry_carries_timestamp<L: Ledger, F: Fn() -> L>(factory: &F) -> Result<(), String> {
    let l = factory();
    l.record("hv-session-1").map_err(|e| e.to_string())?;
    let entry = l
        .entry("hv-session-1")
        .map_err(|e| e.to_string())?
        .ok_or("entry missing after record")?;
    if entry.session_id != "hv-session-1" {
        return Err(format!("wrong session id {}", entry.session_id));
    }
    if !entry.sent_at.ends_with('Z') {
        return Err(format!("sent_at is not a UTC timestamp: {}", entry.sent_at));
    }
    Ok(())
}

fn entries_lists_every_session_once<L: Ledger, F: Fn() -> L>(factory: &F) -> Result<(), String> {
    let l = factory();
    for id in ["s-3", "s-1", "s-2", "s-1"] {
        l.record(id).map_err(|e| e.to_string())?;
    }
    let mut ids: Vec<String> = l
        .entries()
        .map_err(|e| e.to_string())?
        .into_iter()
        .map(|e| e.session_id)
        .collect();
    ids.sort();
    if ids != ["s-1", "s-2", "s-3"] {
        return Err(format!("unexpected entries {ids:?}"));
    }
    Ok(())
}
