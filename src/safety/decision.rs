//! Fail-closed decision engine
//!
//! Pure functions from canonical state to the safety banner and the two lock
//! flags. Nothing here performs IO or reads a clock, and nothing can fail:
//! every input has already been defaulted by the normalizers.
//!
//! Banner precedence, first match wins:
//! 1. kill switch active -> HALTED
//! 2. executor unreachable (no code, or code 0) -> DEGRADED
//! 3. executor answered >= 500 -> DEGRADED
//! 4. fail streak >= 2 -> DEGRADED
//! 5. otherwise OK
//!
//! `automation_locked` is exactly `level != OK` and is the only authority that
//! gates the kill-switch action. `lock_recommended` is advisory.

use serde::Serialize;

use crate::domain::{Banner, BannerLevel, DashboardSnapshot, ExecutorStatus, IntentStatus};

/// Streak at which the executor is considered degraded
pub const FAIL_STREAK_THRESHOLD: u64 = 2;

/// Decide the banner from the executor record and the status code observed
/// on the latest executor poll (`None` or `Some(0)` when unreachable).
pub fn decide(executor: &ExecutorStatus, observed_code: Option<u16>) -> Banner {
    if executor.kill_switch {
        return Banner::halted("KILL SWITCH ACTIVE: execution halted by design (fail-closed)");
    }

    match observed_code {
        None | Some(0) => {
            return Banner::degraded("EXECUTOR API UNREACHABLE: automation locked (fail-closed)");
        }
        Some(code) if code >= 500 => {
            return Banner::degraded(format!(
                "EXECUTOR API ERROR (HTTP {code}): automation locked (fail-closed)"
            ));
        }
        Some(_) => {}
    }

    if executor.fail_streak >= FAIL_STREAK_THRESHOLD {
        return Banner::degraded(format!(
            "EXECUTOR DEGRADED (fail_streak={}): automation locked (fail-closed)",
            executor.fail_streak
        ));
    }

    Banner::ok()
}

pub fn automation_locked(banner: &Banner) -> bool {
    banner.level != BannerLevel::Ok
}

/// Advisory hint inviting the operator to lock. Does not gate anything.
pub fn lock_recommended(executor: &ExecutorStatus, intent: &IntentStatus) -> bool {
    executor.fail_streak >= FAIL_STREAK_THRESHOLD
        || intent.deny_count() > 0
        || intent.evidence_bad_count() > 0
}

/// Everything derived from one snapshot. Recomputed on every change, never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SafetyVerdict {
    pub banner: Banner,
    pub automation_locked: bool,
    pub lock_recommended: bool,
    pub deny_count: usize,
    pub evidence_bad_count: usize,
}

impl SafetyVerdict {
    pub fn evaluate(snapshot: &DashboardSnapshot) -> Self {
        let executor = &snapshot.executor.canonical;
        let intent = &snapshot.intent.canonical;
        let banner = decide(executor, snapshot.observed_executor_code());

        Self {
            automation_locked: automation_locked(&banner),
            lock_recommended: lock_recommended(executor, intent),
            deny_count: intent.deny_count(),
            evidence_bad_count: intent.evidence_bad_count(),
            banner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{IntentItem, ItemEffects, ItemQuality, Reported, SourceResult};
    use chrono::Utc;
    use proptest::prelude::*;

    fn executor(kill_switch: bool, fail_streak: u64) -> ExecutorStatus {
        ExecutorStatus {
            kill_switch,
            fail_streak,
            ..Default::default()
        }
    }

    fn item(evidence_ok: bool, deny: bool) -> IntentItem {
        IntentItem {
            symbol: Reported::Known("BTC".into()),
            quality: ItemQuality {
                evidence_ok,
                effects: ItemEffects { deny },
            },
        }
    }

    #[test]
    fn test_kill_switch_wins_over_everything() {
        let banner = decide(&executor(true, 0), Some(200));
        assert_eq!(banner.level, BannerLevel::Halted);
        assert!(banner.message.contains("KILL SWITCH"));

        assert_eq!(decide(&executor(true, 9), None).level, BannerLevel::Halted);
        assert_eq!(decide(&executor(true, 9), Some(503)).level, BannerLevel::Halted);
    }

    #[test]
    fn test_unreachable_executor() {
        for code in [None, Some(0)] {
            let banner = decide(&executor(false, 0), code);
            assert_eq!(banner.level, BannerLevel::Degraded);
            assert!(banner.message.contains("UNREACHABLE"), "{}", banner.message);
        }
    }

    #[test]
    fn test_server_error_code_in_message() {
        let banner = decide(&executor(false, 5), Some(503));
        assert_eq!(banner.level, BannerLevel::Degraded);
        assert!(banner.message.contains("503"));
        assert!(!banner.message.contains("fail_streak"));
    }

    #[test]
    fn test_fail_streak_threshold() {
        let banner = decide(&executor(false, 2), Some(200));
        assert_eq!(banner.level, BannerLevel::Degraded);
        assert!(banner.message.contains("fail_streak=2"));

        assert_eq!(decide(&executor(false, 1), Some(200)), Banner::ok());
    }

    #[test]
    fn test_client_error_is_not_degraded() {
        assert_eq!(decide(&executor(false, 0), Some(404)), Banner::ok());
    }

    #[test]
    fn test_lock_recommended_is_independent_of_lock() {
        let mut intent = IntentStatus::default();
        intent.items.push(item(true, true));

        let exec = executor(false, 0);
        assert!(lock_recommended(&exec, &intent));
        assert!(!automation_locked(&decide(&exec, Some(200))));

        intent.items.clear();
        assert!(!lock_recommended(&exec, &intent));

        intent.items.push(item(false, false));
        assert!(lock_recommended(&exec, &intent));

        assert!(lock_recommended(&executor(false, 2), &IntentStatus::default()));
    }

    #[test]
    fn test_verdict_from_end_to_end_snapshot() {
        let mut snapshot = DashboardSnapshot::default();
        let payload = serde_json::json!({
            "kill_switch": false,
            "fail_streak": 3,
            "last_http_code": 200
        });
        let canonical = crate::normalize::normalize_executor(Some(&payload));
        snapshot
            .executor
            .settle(SourceResult::received(200, Some(payload)), canonical, Utc::now());

        let verdict = SafetyVerdict::evaluate(&snapshot);
        assert_eq!(verdict.banner.level, BannerLevel::Degraded);
        assert!(verdict.banner.message.contains("fail_streak=3"));
        assert!(verdict.automation_locked);
        assert!(verdict.lock_recommended);
    }

    #[test]
    fn test_unpolled_snapshot_is_locked() {
        let verdict = SafetyVerdict::evaluate(&DashboardSnapshot::default());
        assert!(verdict.automation_locked);
        assert!(!verdict.lock_recommended);
    }

    fn arb_code() -> impl Strategy<Value = Option<u16>> {
        prop_oneof![
            Just(None),
            Just(Some(0u16)),
            (100u16..600).prop_map(Some),
            any::<u16>().prop_map(Some),
        ]
    }

    proptest! {
        #[test]
        fn property_automation_locked_matches_banner(
            kill_switch in any::<bool>(),
            fail_streak in 0u64..10,
            code in arb_code(),
        ) {
            let banner = decide(&executor(kill_switch, fail_streak), code);
            prop_assert_eq!(automation_locked(&banner), banner.level != BannerLevel::Ok);
            if kill_switch {
                prop_assert_eq!(banner.level, BannerLevel::Halted);
            }
            if banner.level == BannerLevel::Ok {
                prop_assert!(banner.message.is_empty());
            }
        }

        #[test]
        fn property_deny_always_recommends_lock(
            fail_streak in 0u64..10,
            extra in prop::collection::vec((any::<bool>(), any::<bool>()), 0..6),
        ) {
            let mut intent = IntentStatus::default();
            intent.items.push(item(true, true));
            intent.items.extend(extra.into_iter().map(|(ok, deny)| item(ok, deny)));
            prop_assert!(lock_recommended(&executor(false, fail_streak), &intent));
        }
    }
}
