use serde_json::Value;

use super::coerce::{as_string_list, as_text, as_u64, field, unwrap_data};
use crate::domain::RiskStatus;

pub fn normalize_risk(payload: Option<&Value>) -> RiskStatus {
    let Some(root) = payload.map(unwrap_data) else {
        return RiskStatus::default();
    };

    RiskStatus {
        current_regime: as_text(field(root, &["current_regime", "currentRegime"])).into(),
        target_regime: as_text(field(root, &["target_regime", "targetRegime"])).into(),
        cooldown_remaining_ms: as_u64(field(
            root,
            &["cooldown_remaining_ms", "cooldownRemainingMs"],
        ))
        .unwrap_or(0),
        reasons: as_string_list(field(root, &["reasons"])),
        missing: as_string_list(field(root, &["missing"])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Reported;
    use serde_json::json;

    #[test]
    fn test_regime_snapshot() {
        let status = normalize_risk(Some(&json!({
            "current_regime": "SHOCK",
            "target_regime": "NORMAL",
            "reasons": ["gate_count=0", "missing_inputs_fail_closed"],
            "missing": ["vix", "dxy"],
            "entered_at": 0,
            "cooldown_remaining_ms": 456
        })));

        assert_eq!(status.current_regime, Reported::Known("SHOCK".into()));
        assert_eq!(status.target_regime, Reported::Known("NORMAL".into()));
        assert_eq!(status.cooldown_remaining_ms, 456);
        assert_eq!(status.reasons, vec!["gate_count=0", "missing_inputs_fail_closed"]);
        assert_eq!(status.missing, vec!["vix", "dxy"]);
    }

    #[test]
    fn test_mistyped_fields_default() {
        let status = normalize_risk(Some(&json!({
            "current_regime": {"nested": true},
            "cooldown_remaining_ms": "soon",
            "reasons": "single",
        })));
        assert_eq!(status, RiskStatus::default());
    }
}
