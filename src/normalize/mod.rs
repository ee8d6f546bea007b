//! Per-source payload normalizers
//!
//! Upstream sources evolve independently: fields go missing, get renamed to
//! camelCase, arrive as strings or get wrapped in one or two `data`
//! envelopes. Each normalizer is total. It never panics and never leaves a
//! field unset, so the decision engine only ever sees defaulted data.

pub mod chain;
pub mod coerce;
pub mod executor;
pub mod intent;
pub mod risk;

pub use chain::normalize_chain;
pub use executor::normalize_executor;
pub use intent::normalize_intent;
pub use risk::normalize_risk;

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::Value;

    const KNOWN_KEYS: &[&str] = &[
        "data",
        "kill_switch",
        "fail_streak",
        "last_http_code",
        "last_event_id",
        "event_id",
        "ts_iso",
        "intent",
        "items",
        "symbol",
        "quality",
        "evidence_ok",
        "effects",
        "deny",
        "execution_intent",
        "paper_orders",
        "paper_fills",
        "lines",
        "last_hash",
        "current_regime",
        "cooldown_remaining_ms",
        "reasons",
        "missing",
    ];

    fn arb_key() -> impl Strategy<Value = String> {
        prop_oneof![
            3 => prop::sample::select(KNOWN_KEYS).prop_map(str::to_string),
            1 => "[a-z_]{1,8}",
        ]
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            any::<f64>().prop_map(|f| {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }),
            "(n/a|true|0|[0-9]{1,4}|[a-zA-Z ]{0,8})".prop_map(Value::String),
        ];
        leaf.prop_recursive(5, 64, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
                prop::collection::vec((arb_key(), inner), 0..6)
                    .prop_map(|pairs| Value::Object(pairs.into_iter().collect())),
            ]
        })
    }

    fn contains_null(value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::Array(items) => items.iter().any(contains_null),
            Value::Object(map) => map.values().any(contains_null),
            _ => false,
        }
    }

    proptest! {
        #[test]
        fn property_canonical_records_never_contain_null(payload in arb_json()) {
            let executor = serde_json::to_value(normalize_executor(Some(&payload))).unwrap();
            let intent = serde_json::to_value(normalize_intent(Some(&payload))).unwrap();
            let chain = serde_json::to_value(normalize_chain(Some(&payload))).unwrap();
            let risk = serde_json::to_value(normalize_risk(Some(&payload))).unwrap();

            for record in [&executor, &intent, &chain, &risk] {
                prop_assert!(!contains_null(record), "null leaked into {record}");
            }
            prop_assert!(executor["kill_switch"].is_boolean());
            prop_assert!(executor["fail_streak"].is_u64());
            prop_assert!(risk["cooldown_remaining_ms"].is_u64());
            prop_assert!(intent["items"].is_array());
        }

        #[test]
        fn property_data_envelope_is_transparent(payload in arb_json()) {
            // only meaningful when the payload is not itself enveloped
            prop_assume!(payload.get("data").map_or(true, |d| !d.is_object()));
            let wrapped = serde_json::json!({ "data": payload.clone() });
            prop_assume!(payload.is_object());
            prop_assert_eq!(
                normalize_executor(Some(&wrapped)),
                normalize_executor(Some(&payload))
            );
            prop_assert_eq!(normalize_risk(Some(&wrapped)), normalize_risk(Some(&payload)));
        }
    }
}
