use serde_json::Value;

use super::coerce::{as_text, as_u64, field, object, unwrap_data};
use crate::domain::{ChainStatus, LedgerStatus};

/// Map the audit chain payload onto [`ChainStatus`]; each ledger defaults
/// independently.
pub fn normalize_chain(payload: Option<&Value>) -> ChainStatus {
    let Some(root) = payload.map(unwrap_data) else {
        return ChainStatus::default();
    };

    ChainStatus {
        execution_intent: ledger(root, &["execution_intent", "executionIntent"]),
        paper_orders: ledger(root, &["paper_orders", "paperOrders"]),
        paper_fills: ledger(root, &["paper_fills", "paperFills"]),
    }
}

fn ledger(root: &Value, keys: &[&str]) -> LedgerStatus {
    let Some(obj) = object(root, keys) else {
        return LedgerStatus::default();
    };
    LedgerStatus {
        lines: as_u64(field(obj, &["lines"])).into(),
        last_hash: as_text(field(obj, &["last_hash", "lastHash"])).into(),
        schema_expected: as_text(field(obj, &["schema_expected", "schemaExpected"])).into(),
    }
}
