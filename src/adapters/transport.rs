//! HTTP seam between the dashboard core and the control-plane API

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::domain::SourceResult;

/// The request never produced an HTTP response
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportFailure(pub String);

/// A completed HTTP exchange, whatever its status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatusTransport: Send + Sync {
    /// Bounded GET of one status endpoint. Never fails: every failure mode is
    /// folded into the returned [`SourceResult`]. No retry at this layer.
    async fn get_status(&self, url: &str) -> SourceResult;

    /// POST an empty JSON object (`{}`) to an action endpoint.
    async fn post_action(&self, url: &str) -> Result<HttpReply, TransportFailure>;
}
