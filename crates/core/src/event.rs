//! Outbound progression events and their ingest wire shape.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "progression.session_completed")]
    SessionCompleted,
    #[serde(rename = "progression.title_granted")]
    TitleGranted,
    #[serde(rename = "progression.fate_marker")]
    FateMarker,
}

impl EventType {
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::SessionCompleted => "progression.session_completed",
            EventType::TitleGranted => "progression.title_granted",
            EventType::FateMarker => "progression.fate_marker",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Boss-damage title tiers, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TitleTier {
    Tier25,
    Tier50,
    Tier75,
    Tier100,
}

impl TitleTier {
    /// The highest tier whose threshold `pct` meets, if any.
    ///
    /// Only one tier is ever returned; lower tiers are implied, not granted.
    pub fn for_boss_damage(pct: f64) -> Option<Self> {
        if pct >= 100.0 {
            Some(TitleTier::Tier100)
        } else if pct >= 75.0 {
            Some(TitleTier::Tier75)
        } else if pct >= 50.0 {
            Some(TitleTier::Tier50)
        } else if pct >= 25.0 {
            Some(TitleTier::Tier25)
        } else {
            None
        }
    }

    pub fn tier(self) -> &'static str {
        match self {
            TitleTier::Tier25 => "25",
            TitleTier::Tier50 => "50",
            TitleTier::Tier75 => "75",
            TitleTier::Tier100 => "100",
        }
    }

    pub fn title_id(self) -> &'static str {
        match self {
            TitleTier::Tier25 => "title_veilbreaker_25",
            TitleTier::Tier50 => "title_veilbreaker_50",
            TitleTier::Tier75 => "title_veilbreaker_75",
            TitleTier::Tier100 => "title_veilbreaker_100",
        }
    }
}

/// Type-specific event body. Serialized without a tag; the event type
/// travels next to it in [`ProgressionEvent::event_type`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventPayload {
    SessionCompleted {
        difficulty: String,
        nodes_completed: usize,
        boss_damage_pct: f64,
    },
    TitleGranted {
        title_id: String,
    },
    FateMarker {
        marker: String,
    },
}

/// One ingest request body: `{root_id, event_type, session_ref, payload}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionEvent {
    pub root_id: String,
    pub event_type: EventType,
    pub session_ref: String,
    pub payload: EventPayload,
}

impl ProgressionEvent {
    pub fn session_completed(
        root_id: &str,
        session_ref: &str,
        difficulty: &str,
        nodes_completed: usize,
        boss_damage_pct: f64,
    ) -> Self {
        ProgressionEvent {
            root_id: root_id.to_string(),
            event_type: EventType::SessionCompleted,
            session_ref: session_ref.to_string(),
            payload: EventPayload::SessionCompleted {
                difficulty: difficulty.to_string(),
                nodes_completed,
                boss_damage_pct,
            },
        }
    }

    pub fn title_granted(root_id: &str, session_ref: &str, tier: TitleTier) -> Self {
        ProgressionEvent {
            root_id: root_id.to_string(),
            event_type: EventType::TitleGranted,
            session_ref: session_ref.to_string(),
            payload: EventPayload::TitleGranted {
                title_id: tier.title_id().to_string(),
            },
        }
    }

    /// Marker event for one completed node, `marker = "node:<node_id>"`.
    pub fn fate_marker(root_id: &str, session_ref: &str, node_id: &str) -> Self {
        ProgressionEvent {
            root_id: root_id.to_string(),
            event_type: EventType::FateMarker,
            session_ref: session_ref.to_string(),
            payload: EventPayload::FateMarker {
                marker: format!("node:{}", node_id),
            },
        }
    }
}
