use hvlink_client::{HvClient, PikClient};
use hvlink_core::{
    AllowList, AllowListResolver, Connector, ConnectorConfig, HandleResolver, IdentityResolver,
    IdentityStrategy, PassReport, RunMode,
};
use hvlink_storage::SqliteLedger;
use serde_json::json;

use crate::OutputFormat;

pub(crate) fn cmd_run(
    config: &ConnectorConfig,
    mode: RunMode,
    output: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mode_label = match mode {
        RunMode::Continuous => format!("polling every {}s", config.poll_interval.as_secs()),
        other => other.to_string(),
    };
    tracing::info!(hv_api = %config.hv_api_url, "Heroes' Veritas connector");
    tracing::info!(
        pik_api = %config.pik_api_url,
        ledger = %config.ledger_path.display(),
        mode = %mode_label,
        "connector configured"
    );

    let ledger = SqliteLedger::open(&config.ledger_path)?;
    let mut connector = Connector::new(
        HvClient::new(config),
        PikClient::new(config),
        resolver(config),
        ledger,
    );

    if mode == RunMode::Continuous {
        connector.run(mode, config.poll_interval, || true)?;
        return Ok(());
    }

    let report = connector.poll_once(mode)?;
    print_report(&report, mode, output);
    Ok(())
}

fn resolver(config: &ConnectorConfig) -> Box<dyn IdentityResolver> {
    let directory = PikClient::new(config);
    match config.identity {
        IdentityStrategy::AllowList => {
            Box::new(AllowListResolver::new(directory, AllowList::demo()))
        }
        IdentityStrategy::Handle => Box::new(HandleResolver::new(directory)),
    }
}

fn print_report(report: &PassReport, mode: RunMode, output: OutputFormat) {
    match output {
        OutputFormat::Json => {
            let projections: Vec<serde_json::Value> = report
                .projections
                .iter()
                .map(|p| {
                    let recipients: Vec<&str> =
                        p.planned.iter().map(|d| d.root_id.as_str()).collect();
                    let events: usize = p.planned.iter().map(|d| d.events.len()).sum();
                    json!({
                        "session_id": p.summary.session_id,
                        "difficulty": p.summary.difficulty,
                        "nodes_completed": p.summary.nodes_completed,
                        "boss_damage_pct": p.summary.boss_damage_pct,
                        "title": p.summary.title.map(|t| t.title_id()),
                        "recipients": recipients,
                        "events": events,
                    })
                })
                .collect();
            let out = json!({
                "mode": mode.to_string(),
                "source_error": report.source_error.as_ref().map(|e| e.to_string()),
                "fetched": report.fetched,
                "eligible": report.eligible,
                "committed": report.committed,
                "events_sent": report.events_sent,
                "events_failed": report.events_failed,
                "unresolved_players": report.unresolved_players,
                "projections": projections,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&out).unwrap_or_else(|_| out.to_string())
            );
        }
        OutputFormat::Text => {
            if let Some(e) = &report.source_error {
                println!("HV unreachable: {}", e);
                return;
            }
            for p in &report.projections {
                let s = &p.summary;
                println!(
                    "[dry run] {}  difficulty={} nodes={} boss_pct={} title={} players={}",
                    s.session_id,
                    s.difficulty,
                    s.nodes_completed,
                    s.boss_damage_pct,
                    s.title.map(|t| t.title_id()).unwrap_or("-"),
                    p.planned.len()
                );
            }
            println!(
                "fetched {}, new {}, forwarded {}, events sent {}, failed {}, unresolved players {}",
                report.fetched,
                report.eligible,
                report.committed.len(),
                report.events_sent,
                report.events_failed,
                report.unresolved_players
            );
        }
    }
}
