//! Session → progression event translation.
//!
//! Per resolved player, events are emitted in a fixed order:
//! 1. `session_completed`, always
//! 2. `title_granted`, only when boss damage meets a tier threshold
//! 3. `fate_marker`, one per completed node
//!
//! Unresolved players are collected, not retried.

use crate::event::{ProgressionEvent, TitleTier};
use crate::identity::{IdentityResolver, Resolution};
use crate::session::{PlayerRef, Session};

/// Projected outcome of a session, independent of who played it.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub session_id: String,
    pub difficulty: String,
    pub nodes_completed: usize,
    pub boss_damage_pct: f64,
    pub title: Option<TitleTier>,
}

impl SessionSummary {
    pub fn of(session: &Session) -> Self {
        let boss_damage_pct = session.boss_damage_pct();
        SessionSummary {
            session_id: session.session_id.clone(),
            difficulty: session.difficulty.clone(),
            nodes_completed: session.nodes_completed(),
            boss_damage_pct,
            title: TitleTier::for_boss_damage(boss_damage_pct),
        }
    }
}

/// The events owed to one resolved player.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerEvents {
    pub player: PlayerRef,
    pub root_id: String,
    pub events: Vec<ProgressionEvent>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    pub summary: SessionSummary,
    pub deliveries: Vec<PlayerEvents>,
    pub unresolved: Vec<PlayerRef>,
}

impl Translation {
    pub fn event_count(&self) -> usize {
        self.deliveries.iter().map(|d| d.events.len()).sum()
    }
}

/// Translate one session for every participating player that resolves.
///
/// Sessions that are not `completed` translate to nothing.
pub fn translate<R: IdentityResolver + ?Sized>(session: &Session, resolver: &R) -> Translation {
    let summary = SessionSummary::of(session);
    let mut translation = Translation {
        summary,
        deliveries: Vec::new(),
        unresolved: Vec::new(),
    };
    if !session.is_completed() {
        return translation;
    }

    for player in &session.players {
        if !player.has_id() {
            translation.unresolved.push(player.clone());
            continue;
        }
        match resolver.resolve(&player.player_id) {
            Resolution::Resolved(root_id) => {
                let events = events_for(session, &translation.summary, &root_id);
                translation.deliveries.push(PlayerEvents {
                    player: player.clone(),
                    root_id,
                    events,
                });
            }
            Resolution::Unresolved => translation.unresolved.push(player.clone()),
        }
    }
    translation
}

fn events_for(session: &Session, summary: &SessionSummary, root_id: &str) -> Vec<ProgressionEvent> {
    let sid = &session.session_id;
    let mut events = vec![ProgressionEvent::session_completed(
        root_id,
        sid,
        &summary.difficulty,
        summary.nodes_completed,
        summary.boss_damage_pct,
    )];
    if let Some(tier) = summary.title {
        events.push(ProgressionEvent::title_granted(root_id, sid, tier));
    }
    events.extend(
        session
            .completed_nodes()
            .map(|node_id| ProgressionEvent::fate_marker(root_id, sid, node_id)),
    );
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventPayload, EventType};
    use serde_json::json;

    /// Resolves `p1`/`p2` to `A`/`B`; everyone else is unknown.
    struct Fixed;

    impl IdentityResolver for Fixed {
        fn resolve(&self, player_id: &str) -> Resolution {
            match player_id {
                "p1" => Resolution::Resolved("A".to_string()),
                "p2" => Resolution::Resolved("B".to_string()),
                _ => Resolution::Unresolved,
            }
        }
    }

    fn session(value: serde_json::Value) -> Session {
        serde_json::from_value(value).unwrap()
    }

    fn completed_with_damage(pct: f64) -> Session {
        session(json!({
            "session_id": "s1",
            "state": "completed",
            "players": [{"player_id": "p1"}],
            "economy_summary": {"boss_damage_pct": pct}
        }))
    }

    fn titles(t: &Translation) -> Vec<EventPayload> {
        t.deliveries[0]
            .events
            .iter()
            .filter(|e| e.event_type == EventType::TitleGranted)
            .map(|e| e.payload.clone())
            .collect()
    }

    #[test]
    fn single_player_full_translation() {
        let s = session(json!({
            "session_id": "s1",
            "state": "completed",
            "players": [{"id": "p1"}],
            "node_states": {"n1": {"status": "completed"}},
            "economy_summary": {"boss_damage_pct": 100}
        }));
        let t = translate(&s, &Fixed);
        assert_eq!(t.deliveries.len(), 1);
        assert_eq!(t.deliveries[0].root_id, "A");
        assert_eq!(
            t.deliveries[0].events,
            vec![
                ProgressionEvent::session_completed("A", "s1", "normal", 1, 100.0),
                ProgressionEvent::title_granted("A", "s1", TitleTier::Tier100),
                ProgressionEvent::fate_marker("A", "s1", "n1"),
            ]
        );
    }

    #[test]
    fn eighty_five_percent_grants_only_the_75_tier() {
        let t = translate(&completed_with_damage(85.0), &Fixed);
        assert_eq!(
            titles(&t),
            vec![EventPayload::TitleGranted {
                title_id: "title_veilbreaker_75".to_string()
            }]
        );
        assert_eq!(t.summary.title.map(TitleTier::tier), Some("75"));
    }

    #[test]
    fn twelve_percent_grants_no_title() {
        let t = translate(&completed_with_damage(12.0), &Fixed);
        assert!(titles(&t).is_empty());
        assert_eq!(t.deliveries[0].events.len(), 1);
    }

    #[test]
    fn only_completed_nodes_produce_markers() {
        let s = session(json!({
            "session_id": "s1",
            "state": "completed",
            "players": [{"player_id": "p1"}],
            "node_states": {
                "a": {"status": "completed"},
                "b": {"status": "completed"},
                "c": {"status": "completed"},
                "d": {"status": "completed"},
                "e": {"status": "completed"},
                "f": {"status": "pending"}
            }
        }));
        let t = translate(&s, &Fixed);
        let mut markers: Vec<String> = t.deliveries[0]
            .events
            .iter()
            .filter_map(|e| match &e.payload {
                EventPayload::FateMarker { marker } => Some(marker.clone()),
                _ => None,
            })
            .collect();
        markers.sort();
        assert_eq!(markers, ["node:a", "node:b", "node:c", "node:d", "node:e"]);
        assert_eq!(t.summary.nodes_completed, 5);
    }

    #[test]
    fn events_keep_fixed_order_per_player() {
        let s = session(json!({
            "session_id": "s1",
            "state": "completed",
            "players": [{"player_id": "p1"}],
            "node_states": {"x": {"status": "completed"}, "y": {"status": "completed"}},
            "economy_summary": {"boss_damage_pct": 30.0}
        }));
        let t = translate(&s, &Fixed);
        let kinds: Vec<EventType> = t.deliveries[0].events.iter().map(|e| e.event_type).collect();
        assert_eq!(
            kinds,
            [
                EventType::SessionCompleted,
                EventType::TitleGranted,
                EventType::FateMarker,
                EventType::FateMarker
            ]
        );
    }

    #[test]
    fn unresolved_players_are_reported_not_translated() {
        let s = session(json!({
            "session_id": "s1",
            "state": "completed",
            "players": [{"player_id": "p1"}, {"player_id": "ghost"}, {"player_id": "p2"}]
        }));
        let t = translate(&s, &Fixed);
        let roots: Vec<&str> = t.deliveries.iter().map(|d| d.root_id.as_str()).collect();
        assert_eq!(roots, ["A", "B"]);
        assert_eq!(t.unresolved.len(), 1);
        assert_eq!(t.unresolved[0].player_id, "ghost");
        assert_eq!(t.event_count(), 2);
    }

    #[test]
    fn player_without_id_is_unresolved_and_others_still_translate() {
        let s = session(json!({
            "session_id": "s1",
            "state": "completed",
            "players": [{"display_name": "anon"}, {"player_id": "p1"}]
        }));
        let t = translate(&s, &Fixed);
        assert_eq!(t.deliveries.len(), 1);
        assert_eq!(t.deliveries[0].root_id, "A");
        assert_eq!(t.unresolved.len(), 1);
        assert_eq!(t.unresolved[0].display_name.as_deref(), Some("anon"));
    }

    #[test]
    fn non_completed_session_yields_nothing() {
        let s = session(json!({
            "session_id": "s1",
            "state": "in_progress",
            "players": [{"player_id": "p1"}],
            "node_states": {"n1": {"status": "completed"}}
        }));
        let t = translate(&s, &Fixed);
        assert!(t.deliveries.is_empty());
        assert!(t.unresolved.is_empty());
    }

    #[test]
    fn session_without_players_yields_nothing() {
        let s = session(json!({"session_id": "s1", "state": "completed"}));
        let t = translate(&s, &Fixed);
        assert_eq!(t.event_count(), 0);
        assert!(t.unresolved.is_empty());
    }
}
