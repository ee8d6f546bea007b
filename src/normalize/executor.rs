use serde_json::Value;

use super::coerce::{as_bool, as_text, as_u16, as_u64, field, unwrap_data};
use crate::domain::ExecutorStatus;

/// Map an executor status payload onto [`ExecutorStatus`].
///
/// Absent, unparsable or mistyped input yields the defaults: kill switch off,
/// zero streak, `n/a` for everything else.
pub fn normalize_executor(payload: Option<&Value>) -> ExecutorStatus {
    let Some(root) = payload.map(unwrap_data) else {
        return ExecutorStatus::default();
    };

    ExecutorStatus {
        kill_switch: as_bool(field(root, &["kill_switch", "killSwitch"])).unwrap_or(false),
        fail_streak: as_u64(field(root, &["fail_streak", "failStreak"])).unwrap_or(0),
        last_http_code: as_u16(field(root, &["last_http_code", "lastHttpCode"])).into(),
        last_event_id: as_text(field(root, &["last_event_id", "lastEventId"])).into(),
        source_path: as_text(field(root, &["source_path", "sourcePath"])).into(),
        ts_checked_iso: as_text(field(root, &["ts_checked_iso", "tsCheckedIso"])).into(),
    }
}
