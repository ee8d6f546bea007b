//! Control-plane endpoint map, all relative to one base URL

use url::Url;

use crate::domain::SourceKind;
use crate::error::Result;

pub const INTENT_LATEST_PATH: &str = "/api/intent/latest";
pub const AUDIT_CHAIN_STATUS_PATH: &str = "/api/audit/chain/status";
pub const EXECUTOR_STATUS_PATH: &str = "/api/executor/status";
pub const RISK_REGIME_PATH: &str = "/api/risk/regime";
pub const EXECUTOR_KILL_PATH: &str = "/api/executor/kill";
pub const EXECUTOR_LOCK_PATH: &str = "/api/executor/lock";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: String,
}

impl Endpoints {
    /// Build the endpoint map. A path prefix on the base is preserved
    /// (`http://host/ops` yields `http://host/ops/api/...`).
    pub fn new(base_url: &str) -> Result<Self> {
        let parsed = Url::parse(base_url.trim())?;
        let base = parsed.as_str().trim_end_matches('/').to_string();
        Ok(Self { base })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn status_path(kind: SourceKind) -> &'static str {
        match kind {
            SourceKind::Intent => INTENT_LATEST_PATH,
            SourceKind::Chain => AUDIT_CHAIN_STATUS_PATH,
            SourceKind::Executor => EXECUTOR_STATUS_PATH,
            SourceKind::Risk => RISK_REGIME_PATH,
        }
    }

    pub fn status_url(&self, kind: SourceKind) -> String {
        self.url(Self::status_path(kind))
    }

    pub fn kill_url(&self) -> String {
        self.url(EXECUTOR_KILL_PATH)
    }

    pub fn lock_url(&self) -> String {
        self.url(EXECUTOR_LOCK_PATH)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }
}
