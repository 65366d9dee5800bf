//! HV session records as returned by the session-listing endpoint.
//!
//! Parsing is lenient the same way HV itself is: missing optional fields
//! fall back to defaults, and one malformed record in a listing is skipped
//! rather than failing the whole listing.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::SourceError;

/// Node status value that counts towards completion.
const COMPLETED: &str = "completed";

/// Lifecycle state of an HV session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SessionState {
    Pending,
    InProgress,
    Completed,
    Other(String),
}

impl SessionState {
    pub fn as_str(&self) -> &str {
        match self {
            SessionState::Pending => "pending",
            SessionState::InProgress => "in_progress",
            SessionState::Completed => COMPLETED,
            SessionState::Other(s) => s,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::Other(String::new())
    }
}

impl From<String> for SessionState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pending" => SessionState::Pending,
            "in_progress" => SessionState::InProgress,
            COMPLETED => SessionState::Completed,
            _ => SessionState::Other(s),
        }
    }
}

impl From<SessionState> for String {
    fn from(state: SessionState) -> Self {
        state.as_str().to_string()
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A participant, keyed by the HV player identifier.
///
/// Any JSON value deserializes: the id is taken from `player_id`, falling
/// back to `id`, and is empty when neither is a non-empty string. Players
/// with an empty id never resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "serde_json::Value")]
pub struct PlayerRef {
    pub player_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl PlayerRef {
    pub fn has_id(&self) -> bool {
        !self.player_id.is_empty()
    }
}

impl From<serde_json::Value> for PlayerRef {
    fn from(value: serde_json::Value) -> Self {
        let text = |key: &str| {
            value
                .get(key)
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        PlayerRef {
            player_id: text("player_id").or_else(|| text("id")).unwrap_or_default(),
            display_name: text("display_name"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeState {
    #[serde(default)]
    pub status: String,
}

impl NodeState {
    pub fn is_completed(&self) -> bool {
        self.status == COMPLETED
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EconomySummary {
    /// Share of the boss's health removed, 0-100.
    #[serde(default)]
    pub boss_damage_pct: f64,
}

/// One play session. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    #[serde(default)]
    pub state: SessionState,
    #[serde(default = "default_difficulty", deserialize_with = "difficulty_or_default")]
    pub difficulty: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub players: Vec<PlayerRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub node_states: BTreeMap<String, NodeState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub economy_summary: Option<EconomySummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

fn default_difficulty() -> String {
    "normal".to_string()
}

fn difficulty_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_difficulty))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Session {
    pub fn is_completed(&self) -> bool {
        self.state == SessionState::Completed
    }

    /// Identifiers of nodes whose status is `completed`, in map order.
    pub fn completed_nodes(&self) -> impl Iterator<Item = &str> {
        self.node_states
            .iter()
            .filter(|(_, node)| node.is_completed())
            .map(|(id, _)| id.as_str())
    }

    pub fn nodes_completed(&self) -> usize {
        self.completed_nodes().count()
    }

    /// Boss damage from the economy summary, 0.0 when absent.
    pub fn boss_damage_pct(&self) -> f64 {
        self.economy_summary
            .as_ref()
            .map(|e| e.boss_damage_pct)
            .unwrap_or(0.0)
    }
}

/// Parse the `{status, data: [...]}` listing envelope.
///
/// Records that fail to deserialize are logged and dropped; an envelope
/// whose status is not `ok`, or whose `data` is not an array, is an error.
pub fn parse_listing(url: &str, body: &serde_json::Value) -> Result<Vec<Session>, SourceError> {
    let status = body.get("status").and_then(|s| s.as_str());
    if status != Some("ok") {
        return Err(SourceError::Malformed {
            url: url.to_string(),
            message: format!("listing status is {}", status.unwrap_or("missing")),
        });
    }
    let records = match body.get("data") {
        Some(serde_json::Value::Array(records)) => records,
        Some(serde_json::Value::Null) | None => return Ok(Vec::new()),
        Some(_) => {
            return Err(SourceError::Malformed {
                url: url.to_string(),
                message: "listing data is not an array".to_string(),
            })
        }
    };

    let mut sessions = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        match serde_json::from_value::<Session>(record.clone()) {
            Ok(session) => sessions.push(session),
            Err(e) => tracing::warn!(index, error = %e, "skipping malformed HV session record"),
        }
    }
    Ok(sessions)
}

/// A passive source of session records.
pub trait SessionSource {
    /// Fetch every session the source currently lists.
    fn list_sessions(&self) -> Result<Vec<Session>, SourceError>;
}

impl<S: SessionSource + ?Sized> SessionSource for &S {
    fn list_sessions(&self) -> Result<Vec<Session>, SourceError> {
        (**self).list_sessions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn session(value: serde_json::Value) -> Session {
        serde_json::from_value(value).expect("valid session")
    }

    #[test]
    fn parses_full_hv_record() {
        let s = session(json!({
            "session_id": "hv-session-1a2b3c4d",
            "state": "completed",
            "difficulty": "hard",
            "players": [{"player_id": "demo-player-001", "display_name": "Player One"}],
            "node_states": {
                "node-alpha": {"status": "completed"},
                "node-beta": {"status": "pending"}
            },
            "economy_summary": {"boss_damage_pct": 85.0},
            "completed_at": "2025-06-01T12:00:00+00:00"
        }));
        assert!(s.is_completed());
        assert_eq!(s.difficulty, "hard");
        assert_eq!(s.players[0].display_name.as_deref(), Some("Player One"));
        assert_eq!(s.nodes_completed(), 1);
        assert_eq!(s.boss_damage_pct(), 85.0);
    }

    #[test]
    fn missing_optional_fields_use_defaults() {
        let s = session(json!({"session_id": "s1", "state": "completed"}));
        assert_eq!(s.difficulty, "normal");
        assert!(s.players.is_empty());
        assert_eq!(s.nodes_completed(), 0);
        assert_eq!(s.boss_damage_pct(), 0.0);
    }

    #[test]
    fn empty_economy_summary_means_zero_damage() {
        let s = session(json!({"session_id": "s1", "economy_summary": {}}));
        assert_eq!(s.boss_damage_pct(), 0.0);
    }

    #[test]
    fn integer_boss_damage_is_accepted() {
        let s = session(json!({"session_id": "s1", "economy_summary": {"boss_damage_pct": 100}}));
        assert_eq!(s.boss_damage_pct(), 100.0);
    }

    #[test]
    fn player_id_accepts_id_alias() {
        let s = session(json!({"session_id": "s1", "players": [{"id": "p1"}]}));
        assert_eq!(s.players[0].player_id, "p1");
    }

    #[test]
    fn state_strings_round_trip_through_enum() {
        for (wire, state) in [
            ("pending", SessionState::Pending),
            ("in_progress", SessionState::InProgress),
            ("completed", SessionState::Completed),
            ("abandoned", SessionState::Other("abandoned".to_string())),
        ] {
            assert_eq!(SessionState::from(wire.to_string()), state);
            assert_eq!(state.as_str(), wire);
        }
        let missing = session(json!({"session_id": "s1"}));
        assert!(!missing.is_completed());
    }

    #[test]
    fn listing_skips_malformed_records() {
        let body = json!({
            "status": "ok",
            "data": [
                {"session_id": "good", "state": "completed"},
                {"state": "completed"},
                "not-an-object"
            ]
        });
        let sessions = parse_listing("http://hv/api/sessions", &body).unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].session_id, "good");
    }

    #[test]
    fn null_difficulty_falls_back_to_normal() {
        let s = session(json!({"session_id": "s1", "difficulty": null, "players": null}));
        assert_eq!(s.difficulty, "normal");
        assert!(s.players.is_empty());
    }

    #[test]
    fn player_without_id_keeps_the_rest_of_the_session() {
        let s = session(json!({
            "session_id": "s2",
            "players": [
                {"player_id": "demo-player-001"},
                {"display_name": "anon"},
                {"player_id": null, "id": "p7"},
                "stray"
            ]
        }));
        let ids: Vec<&str> = s.players.iter().map(|p| p.player_id.as_str()).collect();
        assert_eq!(ids, ["demo-player-001", "", "p7", ""]);
        assert_eq!(s.players[1].display_name.as_deref(), Some("anon"));
        assert!(!s.players[1].has_id());
    }

    #[test]
    fn listing_keeps_sessions_with_loose_fields() {
        let body = json!({
            "status": "ok",
            "data": [
                {"session_id": "s1", "state": "completed", "difficulty": null},
                {
                    "session_id": "s2",
                    "state": "completed",
                    "players": [{"player_id": "demo-player-001"}, {"display_name": "anon"}]
                }
            ]
        });
        let sessions = parse_listing("http://hv/api/sessions", &body).unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].difficulty, "normal");
        assert_eq!(sessions[1].players.len(), 2);
    }

    #[test]
    fn listing_with_error_status_is_rejected() {
        let body = json!({"status": "error", "message": "down"});
        let err = parse_listing("http://hv/api/sessions", &body).unwrap_err();
        assert!(matches!(err, SourceError::Malformed { .. }));
    }

    #[test]
    fn listing_without_data_is_empty() {
        let body = json!({"status": "ok"});
        assert!(parse_listing("u", &body).unwrap().is_empty());
    }
}
