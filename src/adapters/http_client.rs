//! reqwest-backed [`StatusTransport`]

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::transport::{HttpReply, StatusTransport, TransportFailure};
use crate::domain::SourceResult;
use crate::error::Result;

/// Status and action client for the control-plane API
#[derive(Debug, Clone)]
pub struct HttpStatusClient {
    http: Client,
}

impl HttpStatusClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self { http })
    }
}

/// Compact reason for a failed request, without the full URL noise
fn describe(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        "connection failed".to_string()
    } else {
        err.to_string()
    }
}

#[async_trait]
impl StatusTransport for HttpStatusClient {
    async fn get_status(&self, url: &str) -> SourceResult {
        let resp = match self.http.get(url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                debug!("GET {} transport failure: {}", url, e);
                return SourceResult::transport_failure(describe(&e));
            }
        };

        let status = resp.status().as_u16();
        let body = match resp.bytes().await {
            Ok(body) => body,
            Err(e) => {
                debug!("GET {} body read failed after HTTP {}: {}", url, status, e);
                return SourceResult::received(status, None).with_error(describe(&e));
            }
        };

        if !(200..300).contains(&status) {
            debug!("GET {} -> HTTP {}", url, status);
            return SourceResult::received(status, None).with_error(format!("HTTP {status}"));
        }

        if body.iter().all(|b| b.is_ascii_whitespace()) {
            return SourceResult::received(status, None).with_error("empty body");
        }

        match serde_json::from_slice::<Value>(&body) {
            Ok(payload) => {
                debug!("GET {} -> HTTP {} ({} bytes)", url, status, body.len());
                SourceResult::received(status, Some(payload))
            }
            Err(e) => {
                debug!("GET {} -> HTTP {} unparsable body: {}", url, status, e);
                SourceResult::received(status, None).with_error(format!("unparsable body: {e}"))
            }
        }
    }

    async fn post_action(&self, url: &str) -> std::result::Result<HttpReply, TransportFailure> {
        let resp = self
            .http
            .post(url)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| TransportFailure(describe(&e)))?;

        let status = resp.status().as_u16();
        // A 2xx status line is not a success if the body never arrived
        let body = resp.text().await.map_err(|e| {
            debug!("POST {} body read failed after HTTP {}: {}", url, status, e);
            TransportFailure(describe(&e))
        })?;
        debug!("POST {} -> HTTP {}", url, status);
        Ok(HttpReply::new(status, body))
    }
}
