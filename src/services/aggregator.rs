//! Status aggregator
//!
//! Polls every source on a fixed interval and on demand. Each source's
//! fetch-normalize pipeline settles on its own, so a slow or failing source
//! never delays another. The aggregator is the only writer of the published
//! [`DashboardSnapshot`]; everything else reads it through a `watch` receiver.

use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::adapters::{Endpoints, StatusTransport};
use crate::domain::{DashboardSnapshot, FetchOutcome, SourceKind, SourceResult, SourceSlot};
use crate::normalize::{normalize_chain, normalize_executor, normalize_intent, normalize_risk};

/// Out-of-band refresh request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshRequest {
    All,
    Source(SourceKind),
}

/// Cloneable handle used by the UI and the action dispatcher to ask for an
/// immediate refresh.
#[derive(Debug, Clone)]
pub struct RefreshHandle {
    tx: mpsc::UnboundedSender<RefreshRequest>,
}

impl RefreshHandle {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<RefreshRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Returns false once the aggregator loop is gone
    pub fn refresh_all(&self) -> bool {
        self.tx.send(RefreshRequest::All).is_ok()
    }

    pub fn refresh(&self, kind: SourceKind) -> bool {
        self.tx.send(RefreshRequest::Source(kind)).is_ok()
    }
}

pub struct Aggregator {
    transport: Arc<dyn StatusTransport>,
    endpoints: Endpoints,
    state: watch::Sender<DashboardSnapshot>,
    closed: AtomicBool,
}

impl Aggregator {
    pub fn new(transport: Arc<dyn StatusTransport>, endpoints: Endpoints) -> Self {
        let (state, _) = watch::channel(DashboardSnapshot::default());
        Self {
            transport,
            endpoints,
            state,
            closed: AtomicBool::new(false),
        }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardSnapshot> {
        self.state.subscribe()
    }

    /// Copy of the latest published state
    pub fn snapshot(&self) -> DashboardSnapshot {
        self.state.borrow().clone()
    }

    /// Stop applying results. In-flight fetches finish but are discarded.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Fetch, normalize and publish one source
    pub async fn refresh_source(&self, kind: SourceKind) {
        if self.is_closed() {
            return;
        }

        self.state.send_modify(|s| match kind {
            SourceKind::Intent => s.intent.begin_fetch(),
            SourceKind::Chain => s.chain.begin_fetch(),
            SourceKind::Executor => s.executor.begin_fetch(),
            SourceKind::Risk => s.risk.begin_fetch(),
        });

        let url = self.endpoints.status_url(kind);
        let result = self.transport.get_status(&url).await;

        if self.is_closed() {
            debug!("Dropping {} result that landed after teardown", kind);
            return;
        }
        self.apply(kind, result);
    }

    /// Refresh every source concurrently; each one publishes as soon as it settles
    pub async fn refresh_all(&self) {
        tokio::join!(
            self.refresh_source(SourceKind::Intent),
            self.refresh_source(SourceKind::Chain),
            self.refresh_source(SourceKind::Executor),
            self.refresh_source(SourceKind::Risk),
        );
    }

    fn apply(&self, kind: SourceKind, result: SourceResult) {
        let now = Utc::now();
        self.state.send_modify(|s| match kind {
            SourceKind::Intent => {
                let canonical = normalize_intent(result.usable_payload());
                settle_logged(kind, &mut s.intent, result, canonical, now);
            }
            SourceKind::Chain => {
                let canonical = normalize_chain(result.usable_payload());
                settle_logged(kind, &mut s.chain, result, canonical, now);
            }
            SourceKind::Executor => {
                let canonical = normalize_executor(result.usable_payload());
                settle_logged(kind, &mut s.executor, result, canonical, now);
            }
            SourceKind::Risk => {
                let canonical = normalize_risk(result.usable_payload());
                settle_logged(kind, &mut s.risk, result, canonical, now);
            }
        });
    }

    fn spawn_refresh(self: &Arc<Self>, request: RefreshRequest) {
        let aggregator = Arc::clone(self);
        tokio::spawn(async move {
            match request {
                RefreshRequest::All => aggregator.refresh_all().await,
                RefreshRequest::Source(kind) => aggregator.refresh_source(kind).await,
            }
        });
    }

    /// Poll loop: one cycle per `interval` tick plus one per refresh request,
    /// until `shutdown` flips or its sender is dropped.
    pub async fn run(
        self: Arc<Self>,
        interval: Duration,
        mut requests: mpsc::UnboundedReceiver<RefreshRequest>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        info!(
            "Aggregator polling {} every {}ms",
            self.endpoints.base(),
            interval.as_millis()
        );

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.spawn_refresh(RefreshRequest::All);
                }
                Some(request) = requests.recv() => {
                    debug!("Manual refresh: {:?}", request);
                    self.spawn_refresh(request);
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        self.close();
        info!("Aggregator stopped");
    }
}

fn settle_logged<T>(
    kind: SourceKind,
    slot: &mut SourceSlot<T>,
    result: SourceResult,
    canonical: T,
    at: chrono::DateTime<Utc>,
) {
    let was_healthy = slot.outcome != Some(FetchOutcome::Error);
    let reason = result
        .error
        .clone()
        .unwrap_or_else(|| format!("HTTP {:?}", result.http_status));

    slot.settle(result, canonical, at);

    match (was_healthy, slot.is_healthy()) {
        (true, false) => warn!("Source {} unavailable: {}", kind, reason),
        (false, true) => info!("Source {} recovered", kind),
        _ => debug!("Source {} settled ({:?})", kind, slot.outcome),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::endpoints::{EXECUTOR_STATUS_PATH, RISK_REGIME_PATH};
    use crate::adapters::MockStatusTransport;
    use crate::domain::{FetchPhase, Reported};
    use serde_json::json;

    fn healthy_payload(url: &str) -> SourceResult {
        let payload = if url.ends_with(EXECUTOR_STATUS_PATH) {
            json!({"kill_switch": false, "fail_streak": 0, "last_http_code": 200})
        } else if url.ends_with("/api/intent/latest") {
            json!({"event_id": "EVT-1", "intent": {"items": []}})
        } else if url.ends_with("/api/audit/chain/status") {
            json!({"execution_intent": {"lines": 4, "last_hash": "h"}})
        } else {
            json!({"current_regime": "NORMAL", "cooldown_remaining_ms": 0})
        };
        SourceResult::received(200, Some(payload))
    }

    fn aggregator(mock: MockStatusTransport) -> Aggregator {
        Aggregator::new(
            Arc::new(mock),
            Endpoints::new("http://127.0.0.1:8787").unwrap(),
        )
    }

    #[tokio::test]
    async fn test_risk_failure_does_not_contaminate_other_sources() {
        let mut mock = MockStatusTransport::new();
        mock.expect_get_status().times(4).returning(|url| {
            if url.ends_with(RISK_REGIME_PATH) {
                SourceResult::transport_failure("connection refused")
            } else {
                healthy_payload(url)
            }
        });

        let agg = aggregator(mock);
        agg.refresh_all().await;
        let snapshot = agg.snapshot();

        assert!(snapshot.intent.is_healthy());
        assert!(snapshot.chain.is_healthy());
        assert!(snapshot.executor.is_healthy());
        assert!(!snapshot.risk.is_healthy());

        assert_eq!(snapshot.intent.canonical.event_id, Reported::Known("EVT-1".into()));
        assert_eq!(snapshot.chain.canonical.execution_intent.lines, Reported::Known(4));
        assert_eq!(snapshot.observed_executor_code(), Some(200));
        assert!(snapshot.risk.result.transport_failed);
        assert_eq!(snapshot.risk.canonical, Default::default());

        for kind in SourceKind::ALL {
            assert_eq!(snapshot.phase(kind), FetchPhase::Idle);
        }
    }

    #[tokio::test]
    async fn test_later_poll_overwrites_payload_and_keeps_code() {
        let mut mock = MockStatusTransport::new();
        let mut seq = mockall::Sequence::new();
        mock.expect_get_status()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                SourceResult::received(200, Some(json!({"kill_switch": true, "fail_streak": 5})))
            });
        mock.expect_get_status()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| SourceResult::transport_failure("timeout"));

        let agg = aggregator(mock);
        agg.refresh_source(SourceKind::Executor).await;
        assert!(agg.snapshot().executor.canonical.kill_switch);

        agg.refresh_source(SourceKind::Executor).await;
        let snapshot = agg.snapshot();
        assert!(!snapshot.executor.canonical.kill_switch);
        assert_eq!(snapshot.executor.canonical.fail_streak, 0);
        assert_eq!(snapshot.executor.last_http_code, Some(200));
        assert_eq!(snapshot.observed_executor_code(), None);
    }

    #[tokio::test]
    async fn test_error_status_discards_payload() {
        let mut mock = MockStatusTransport::new();
        mock.expect_get_status()
            .returning(|_| SourceResult::received(503, Some(json!({"kill_switch": true}))));

        let agg = aggregator(mock);
        agg.refresh_source(SourceKind::Executor).await;
        let snapshot = agg.snapshot();
        assert!(!snapshot.executor.canonical.kill_switch);
        assert_eq!(snapshot.observed_executor_code(), Some(503));
    }

    #[tokio::test]
    async fn test_closed_aggregator_ignores_refresh() {
        let mut mock = MockStatusTransport::new();
        mock.expect_get_status().times(0);

        let agg = aggregator(mock);
        let mut rx = agg.subscribe();
        agg.close();
        agg.refresh_all().await;
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_subscribers_see_each_settle() {
        let mut mock = MockStatusTransport::new();
        mock.expect_get_status().returning(healthy_payload);

        let agg = aggregator(mock);
        let mut rx = agg.subscribe();
        agg.refresh_source(SourceKind::Chain).await;
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().chain.is_healthy());
    }

    #[tokio::test]
    async fn test_run_loop_polls_and_stops_on_shutdown() {
        let mut mock = MockStatusTransport::new();
        mock.expect_get_status().returning(healthy_payload);

        let agg = Arc::new(aggregator(mock));
        let mut rx = agg.subscribe();
        let (handle, requests) = RefreshHandle::channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(Arc::clone(&agg).run(
            Duration::from_millis(50),
            requests,
            shutdown_rx,
        ));

        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                rx.changed().await.unwrap();
                if rx.borrow().last_full_refresh().is_some() {
                    break;
                }
            }
        })
        .await
        .expect("first cycle should settle every source");

        assert!(handle.refresh(SourceKind::Executor));
        shutdown_tx.send(true).unwrap();
        task.await.unwrap();
        assert!(agg.is_closed());
    }
}
