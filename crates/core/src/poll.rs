//! The poll loop: fetch → filter → translate → deliver → commit.
//!
//! Everything runs on the calling thread, one session at a time, one player
//! at a time, one event at a time.
//!
//! ## Commit policy
//!
//! A session is committed to the ledger once every resolved player's events
//! have been *attempted*. Individual ingest failures are logged and counted
//! but do not hold the commit back, so a failed event is not re-sent on a
//! later pass. Stronger per-event guarantees would need a per-event ledger.

use std::collections::HashSet;
use std::time::Duration;

use hvlink_storage::Ledger;

use crate::config::RunMode;
use crate::delivery::EventSink;
use crate::error::{PollError, SourceError};
use crate::event::{EventPayload, EventType};
use crate::identity::IdentityResolver;
use crate::session::{Session, SessionSource};
use crate::translate::{translate, PlayerEvents, SessionSummary};

/// What a dry run would have delivered for one session.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub summary: SessionSummary,
    pub planned: Vec<PlayerEvents>,
}

/// Counters and outcomes of a single pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassReport {
    /// Set when the listing could not be fetched; the pass did nothing else.
    pub source_error: Option<SourceError>,
    pub fetched: usize,
    /// Completed sessions not yet in the ledger.
    pub eligible: usize,
    /// Session ids written to the ledger in this pass.
    pub committed: Vec<String>,
    pub events_sent: usize,
    pub events_failed: usize,
    pub unresolved_players: usize,
    pub projections: Vec<Projection>,
}

/// Wires a source, sink, resolver and ledger into a poll loop.
pub struct Connector<S, K, R, L> {
    source: S,
    sink: K,
    resolver: R,
    ledger: L,
}

impl<S, K, R, L> Connector<S, K, R, L>
where
    S: SessionSource,
    K: EventSink,
    R: IdentityResolver,
    L: Ledger,
{
    pub fn new(source: S, sink: K, resolver: R, ledger: L) -> Self {
        Connector {
            source,
            sink,
            resolver,
            ledger,
        }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Run according to `mode`.
    ///
    /// `Once` and `DryRun` make a single pass and return its error, if any.
    /// `Continuous` logs pass errors and keeps going, sleeping `interval`
    /// between passes, until `keep_going` returns false.
    pub fn run<F>(
        &mut self,
        mode: RunMode,
        interval: Duration,
        mut keep_going: F,
    ) -> Result<(), PollError>
    where
        F: FnMut() -> bool,
    {
        match mode {
            RunMode::Once | RunMode::DryRun => self.poll_once(mode).map(|_| ()),
            RunMode::Continuous => loop {
                if let Err(e) = self.poll_once(mode) {
                    tracing::error!(error = %e, "unhandled error in poll pass");
                }
                if !keep_going() {
                    return Ok(());
                }
                std::thread::sleep(interval);
            },
        }
    }

    /// One Fetching → Filtering → Processing pass.
    pub fn poll_once(&mut self, mode: RunMode) -> Result<PassReport, PollError> {
        let mut report = PassReport::default();

        let sessions = match self.source.list_sessions() {
            Ok(sessions) => sessions,
            Err(e) => {
                tracing::warn!(error = %e, "could not reach HV API, will retry");
                report.source_error = Some(e);
                return Ok(report);
            }
        };
        report.fetched = sessions.len();

        let mut unsent = Vec::new();
        for session in sessions {
            if session.is_completed() && !self.ledger.exists(&session.session_id)? {
                unsent.push(session);
            }
        }
        report.eligible = unsent.len();
        if unsent.is_empty() {
            tracing::debug!(fetched = report.fetched, "no new completed sessions");
            return Ok(report);
        }

        tracing::info!(count = unsent.len(), "found new completed session(s)");
        self.resolver.refresh();

        let mut seen = HashSet::new();
        for session in &unsent {
            if !seen.insert(session.session_id.as_str()) {
                tracing::debug!(
                    session_id = %session.session_id,
                    "duplicate listing entry skipped"
                );
                continue;
            }
            self.process_session(session, mode, &mut report)?;
        }
        Ok(report)
    }

    fn process_session(
        &self,
        session: &Session,
        mode: RunMode,
        report: &mut PassReport,
    ) -> Result<(), PollError> {
        let sid = session.session_id.as_str();
        tracing::info!(session_id = sid, "processing completed session");

        let translation = translate(session, &self.resolver);
        if session.players.is_empty() {
            tracing::info!(session_id = sid, "no players in session, nothing to deliver");
        }
        for player in &translation.unresolved {
            tracing::info!(
                session_id = sid,
                player_id = %player.player_id,
                "no PIK root_id found, skipping player"
            );
        }
        report.unresolved_players += translation.unresolved.len();

        if mode.is_dry_run() {
            let s = &translation.summary;
            for delivery in &translation.deliveries {
                tracing::info!(
                    session_id = sid,
                    player_id = %delivery.player.player_id,
                    root_id = %delivery.root_id,
                    difficulty = %s.difficulty,
                    nodes = s.nodes_completed,
                    boss_pct = s.boss_damage_pct,
                    title = s.title.map(|t| t.title_id()).unwrap_or("-"),
                    events = delivery.events.len(),
                    "[dry run] would send session_completed"
                );
            }
            report.projections.push(Projection {
                summary: translation.summary,
                planned: translation.deliveries,
            });
            return Ok(());
        }

        for delivery in &translation.deliveries {
            self.deliver(delivery, report);
        }

        self.ledger.record(sid)?;
        report.committed.push(sid.to_string());
        tracing::info!(session_id = sid, "session forwarded to PIK");
        Ok(())
    }

    fn deliver(&self, delivery: &PlayerEvents, report: &mut PassReport) {
        let player_id = delivery.player.player_id.as_str();
        for event in &delivery.events {
            match self.sink.send(event) {
                Ok(receipt) => {
                    report.events_sent += 1;
                    match &event.payload {
                        EventPayload::SessionCompleted { .. } => {
                            tracing::info!(
                                player_id,
                                root_id = %delivery.root_id,
                                xp = receipt.xp_total,
                                "+{} Fate XP",
                                receipt.xp_total
                            );
                            if let Some(lvl) = &receipt.level_up {
                                tracing::info!(
                                    player_id,
                                    from = %lvl.from,
                                    to = %lvl.to,
                                    "level up"
                                );
                            }
                        }
                        EventPayload::TitleGranted { title_id } => {
                            tracing::info!(player_id, title_id = %title_id, "granted title");
                        }
                        EventPayload::FateMarker { marker } => {
                            tracing::debug!(player_id, marker = %marker, "fate marker recorded");
                        }
                    }
                }
                Err(failure) => {
                    report.events_failed += 1;
                    tracing::warn!(
                        player_id,
                        event_type = %event.event_type,
                        url = %failure.url,
                        status = failure.status,
                        message = %failure.message,
                        "{} ingest failed",
                        short_name(event.event_type)
                    );
                }
            }
        }
    }
}

fn short_name(event_type: EventType) -> &'static str {
    match event_type {
        EventType::SessionCompleted => "session_completed",
        EventType::TitleGranted => "title_granted",
        EventType::FateMarker => "fate_marker",
    }
}
