use serde_json::Value;

use super::coerce::{as_bool, as_text, field, object, unwrap_data};
use crate::domain::{IntentItem, IntentStatus, ItemEffects, ItemQuality};

/// Map the latest-intent payload onto [`IntentStatus`].
///
/// The backend answers `{"error": "n/a", "intent": "n/a"}` when no intent is
/// on disk, so a non-object `intent` is treated as absent. Items are read
/// from `intent.items`, falling back to a top-level `items`.
pub fn normalize_intent(payload: Option<&Value>) -> IntentStatus {
    let Some(root) = payload.map(unwrap_data) else {
        return IntentStatus::default();
    };
    let intent = object(root, &["intent"]);

    let from_intent_or_root =
        |keys: &[&str]| intent.and_then(|i| field(i, keys)).or_else(|| field(root, keys));

    let items = from_intent_or_root(&["items"])
        .and_then(Value::as_array)
        .map(|items| items.iter().map(normalize_item).collect())
        .unwrap_or_default();

    IntentStatus {
        event_id: as_text(field(root, &["event_id", "eventId"])).into(),
        ts_iso: as_text(field(root, &["ts_iso", "tsIso"])).into(),
        execution_mode: as_text(from_intent_or_root(&["execution_mode", "executionMode"])).into(),
        dry_run: as_bool(from_intent_or_root(&["dry_run", "dryRun"])).unwrap_or(false),
        error: as_text(field(root, &["error"])).into(),
        items,
    }
}

fn normalize_item(item: &Value) -> IntentItem {
    let quality = object(item, &["quality"]);
    let effects = quality.and_then(|q| object(q, &["effects"]));

    IntentItem {
        symbol: as_text(field(item, &["symbol"])).into(),
        quality: ItemQuality {
            evidence_ok: as_bool(quality.and_then(|q| field(q, &["evidence_ok", "evidenceOk"])))
                .unwrap_or(false),
            effects: ItemEffects {
                deny: as_bool(effects.and_then(|e| field(e, &["deny"]))).unwrap_or(false),
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Reported;
    use serde_json::json;

    #[test]
    fn test_outbox_intent() {
        let status = normalize_intent(Some(&json!({
            "event_id": "EVT-9",
            "ts_iso": "2026-01-01T00:00:00Z",
            "intent": {
                "execution_mode": "paper",
                "dry_run": true,
                "items": [
                    {"symbol": "BTC", "quality": {"evidence_ok": true, "effects": {"deny": false}}},
                    {"symbol": "ETH", "quality": {"evidence_ok": false, "effects": {"deny": true}}}
                ]
            }
        })));

        assert_eq!(status.event_id, Reported::Known("EVT-9".into()));
        assert_eq!(status.execution_mode, Reported::Known("paper".into()));
        assert!(status.dry_run);
        assert_eq!(status.items.len(), 2);
        assert_eq!(status.deny_count(), 1);
        assert_eq!(status.evidence_bad_count(), 1);
    }

    #[test]
    fn test_no_intent_placeholder() {
        let status = normalize_intent(Some(&json!({"error": "n/a", "intent": "n/a"})));
        assert!(status.items.is_empty());
        assert_eq!(status.error, Reported::Unknown);
        assert_eq!(status.event_id, Reported::Unknown);
    }

    #[test]
    fn test_items_missing_quality_count_as_bad_evidence() {
        let status = normalize_intent(Some(&json!({
            "data": {"intent": {"items": [{"symbol": "SOL"}, "garbage", null]}}
        })));
        assert_eq!(status.items.len(), 3);
        assert_eq!(status.evidence_bad_count(), 3);
        assert_eq!(status.deny_count(), 0);
        assert_eq!(status.items[1].symbol, Reported::Unknown);
    }

    #[test]
    fn test_top_level_items_and_non_array() {
        let status = normalize_intent(Some(&json!({
            "items": [{"symbol": "BTC", "quality": {"evidence_ok": "1"}}]
        })));
        assert_eq!(status.items.len(), 1);
        assert_eq!(status.evidence_bad_count(), 0);

        let status = normalize_intent(Some(&json!({"intent": {"items": "n/a"}})));
        assert!(status.items.is_empty());
    }
}
