//! Ingest responses and the sink seam.
//!
//! A structured success looks like
//! `{"status": "ok", "data": {"changes_applied": {...}}}`. The XP and
//! level-up figures pulled out of it are for logging only; nothing in the
//! poll loop branches on them.

use serde_json::Value;

use crate::error::DeliveryFailure;
use crate::event::ProgressionEvent;

/// `changes_applied` fields that carry XP deltas.
const XP_FIELDS: [&str; 3] = ["session_xp", "boss_bonus_xp", "node_xp"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelUp {
    pub from: String,
    pub to: String,
}

/// What PIK reported back for one accepted event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReceipt {
    pub xp_total: i64,
    pub level_up: Option<LevelUp>,
}

impl IngestReceipt {
    /// Interpret an ingest response body.
    ///
    /// Anything other than `status == "ok"` is a failure carrying the
    /// server's `message` (or `error`) text when present.
    pub fn from_response(url: &str, body: &Value) -> Result<Self, DeliveryFailure> {
        if body.get("status").and_then(Value::as_str) != Some("ok") {
            let message = body
                .get("message")
                .or_else(|| body.get("error"))
                .map(render)
                .unwrap_or_else(|| format!("unexpected response: {}", body));
            return Err(DeliveryFailure {
                url: url.to_string(),
                status: None,
                message,
            });
        }

        let changes = body
            .get("data")
            .and_then(|d| d.get("changes_applied"))
            .cloned()
            .unwrap_or(Value::Null);

        let xp_total = XP_FIELDS
            .iter()
            .filter_map(|field| changes.get(field))
            .map(as_xp)
            .fold(0i64, i64::saturating_add);

        let level_up = changes
            .get("level_up")
            .filter(|v| v.as_object().is_some_and(|o| !o.is_empty()))
            .map(|lvl| LevelUp {
                from: lvl.get("from").map(render).unwrap_or_default(),
                to: lvl.get("to").map(render).unwrap_or_default(),
            });

        Ok(IngestReceipt { xp_total, level_up })
    }
}

fn as_xp(value: &Value) -> i64 {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f.round() as i64))
        .unwrap_or(0)
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Destination for progression events.
pub trait EventSink {
    fn send(&self, event: &ProgressionEvent) -> Result<IngestReceipt, DeliveryFailure>;
}

impl<K: EventSink + ?Sized> EventSink for &K {
    fn send(&self, event: &ProgressionEvent) -> Result<IngestReceipt, DeliveryFailure> {
        (**self).send(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const URL: &str = "http://pik/api/ingest";

    #[test]
    fn sums_recognized_xp_fields() {
        let body = json!({
            "status": "ok",
            "data": {"changes_applied": {
                "session_xp": 120,
                "boss_bonus_xp": 40,
                "node_xp": 25,
                "other_xp": 1000
            }}
        });
        let receipt = IngestReceipt::from_response(URL, &body).unwrap();
        assert_eq!(receipt.xp_total, 185);
        assert_eq!(receipt.level_up, None);
    }

    #[test]
    fn missing_fields_count_as_zero() {
        let body = json!({"status": "ok", "data": {"changes_applied": {"node_xp": 7.0}}});
        assert_eq!(IngestReceipt::from_response(URL, &body).unwrap().xp_total, 7);

        let bare = json!({"status": "ok"});
        assert_eq!(
            IngestReceipt::from_response(URL, &bare).unwrap(),
            IngestReceipt::default()
        );
    }

    #[test]
    fn extracts_level_up_transition() {
        let body = json!({
            "status": "ok",
            "data": {"changes_applied": {"session_xp": 10, "level_up": {"from": 3, "to": 4}}}
        });
        let receipt = IngestReceipt::from_response(URL, &body).unwrap();
        assert_eq!(
            receipt.level_up,
            Some(LevelUp {
                from: "3".to_string(),
                to: "4".to_string()
            })
        );
    }

    #[test]
    fn falsy_level_up_is_ignored() {
        let body = json!({"status": "ok", "data": {"changes_applied": {"level_up": null}}});
        assert_eq!(IngestReceipt::from_response(URL, &body).unwrap().level_up, None);
    }

    #[test]
    fn empty_level_up_object_is_ignored() {
        let body = json!({"status": "ok", "data": {"changes_applied": {"level_up": {}}}});
        assert_eq!(IngestReceipt::from_response(URL, &body).unwrap().level_up, None);
    }

    #[test]
    fn huge_xp_values_saturate_instead_of_overflowing() {
        let body = json!({
            "status": "ok",
            "data": {"changes_applied": {"session_xp": i64::MAX, "boss_bonus_xp": 1}}
        });
        assert_eq!(
            IngestReceipt::from_response(URL, &body).unwrap().xp_total,
            i64::MAX
        );
    }

    #[test]
    fn error_status_becomes_failure_with_message() {
        let body = json!({"status": "error", "message": "unknown root_id"});
        let failure = IngestReceipt::from_response(URL, &body).unwrap_err();
        assert_eq!(failure.url, URL);
        assert_eq!(failure.message, "unknown root_id");
    }
}
