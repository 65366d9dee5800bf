//! Session records served by the mock.

use rand::Rng;
use serde_json::{json, Value};

fn session_id() -> String {
    format!("hv-session-{:08x}", rand::thread_rng().gen::<u32>())
}

/// Two completed sessions (85% and 40% boss damage) and one in progress.
pub(crate) fn generate_sessions() -> Vec<Value> {
    let now = hvlink_storage::utc_timestamp();
    vec![
        json!({
            "session_id": session_id(),
            "state": "completed",
            "difficulty": "hard",
            "players": [
                {"player_id": "demo-player-001", "display_name": "Player One"}
            ],
            "node_states": {
                "node-alpha": {"status": "completed"},
                "node-beta": {"status": "completed"},
                "node-gamma": {"status": "completed"},
                "node-delta": {"status": "completed"},
                "node-epsilon": {"status": "completed"}
            },
            "economy_summary": {"boss_damage_pct": 85.0},
            "completed_at": now,
        }),
        json!({
            "session_id": session_id(),
            "state": "completed",
            "difficulty": "normal",
            "players": [
                {"player_id": "demo-player-003", "display_name": "Player Three"}
            ],
            "node_states": {
                "node-alpha": {"status": "completed"},
                "node-beta": {"status": "completed"},
                "node-gamma": {"status": "completed"}
            },
            "economy_summary": {"boss_damage_pct": 40.0},
            "completed_at": now,
        }),
        json!({
            "session_id": session_id(),
            "state": "in_progress",
            "difficulty": "hard",
            "players": [
                {"player_id": "demo-player-002", "display_name": "Player Two"}
            ],
            "node_states": {},
            "economy_summary": {},
        }),
    ]
}
