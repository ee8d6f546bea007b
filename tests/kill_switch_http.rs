//! Kill-switch dispatch against a real HTTP server

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, routing::get, routing::post, Json, Router};
use serde_json::json;

use sentinel_dash::adapters::{Endpoints, HttpStatusClient, StatusTransport};
use sentinel_dash::domain::{ActionStatus, SourceKind};
use sentinel_dash::safety::{DialogPhase, KillDialog, KillSwitchDispatcher, SafetyVerdict};
use sentinel_dash::services::{Aggregator, RefreshHandle, RefreshRequest};

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn counted(
    hits: &Arc<AtomicUsize>,
    status: StatusCode,
    body: serde_json::Value,
) -> axum::routing::MethodRouter {
    let hits = Arc::clone(hits);
    post(move || {
        let hits = Arc::clone(&hits);
        let body = body.clone();
        async move {
            hits.fetch_add(1, Ordering::SeqCst);
            (status, Json(body))
        }
    })
}

fn transport() -> Arc<dyn StatusTransport> {
    Arc::new(HttpStatusClient::new(Duration::from_secs(2)).unwrap())
}

fn healthy_executor() -> axum::routing::MethodRouter {
    get(|| async { Json(json!({"kill_switch": false, "fail_streak": 0, "last_http_code": 200})) })
}

/// Open gate: executor polled healthy over the same server
async fn open_gate(base: &str) -> sentinel_dash::domain::DashboardSnapshot {
    let aggregator = Aggregator::new(transport(), Endpoints::new(base).unwrap());
    aggregator.refresh_source(SourceKind::Executor).await;
    let snapshot = aggregator.snapshot();
    assert!(!SafetyVerdict::evaluate(&snapshot).automation_locked);
    snapshot
}

#[tokio::test]
async fn primary_404_falls_back_to_lock_once() {
    let kill_hits = Arc::new(AtomicUsize::new(0));
    let lock_hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/api/executor/status", healthy_executor())
        .route(
            "/api/executor/kill",
            counted(&kill_hits, StatusCode::NOT_FOUND, json!({"detail": "Not Found"})),
        )
        .route(
            "/api/executor/lock",
            counted(&lock_hits, StatusCode::OK, json!({"ok": true, "kill_switch": true})),
        );
    let base = serve(app).await;
    let gate = open_gate(&base).await;

    let (handle, mut requests) = RefreshHandle::channel();
    let dispatcher =
        KillSwitchDispatcher::new(transport(), Endpoints::new(&base).unwrap()).with_refresh(handle);
    let mut dialog = KillDialog::new();
    dialog.open();

    let outcome = dispatcher.confirm(&mut dialog, &gate).await.unwrap();
    assert_eq!(outcome.status, ActionStatus::Success);
    assert_eq!(outcome.detail, "OK (200)");
    assert_eq!(kill_hits.load(Ordering::SeqCst), 1);
    assert_eq!(lock_hits.load(Ordering::SeqCst), 1);
    assert_eq!(dialog.phase(), DialogPhase::Succeeded);
    assert_eq!(
        requests.try_recv().unwrap(),
        RefreshRequest::Source(SourceKind::Executor)
    );
}

#[tokio::test]
async fn primary_500_is_terminal() {
    let kill_hits = Arc::new(AtomicUsize::new(0));
    let lock_hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/api/executor/status", healthy_executor())
        .route(
            "/api/executor/kill",
            counted(
                &kill_hits,
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"detail": "state file is read-only"}),
            ),
        )
        .route("/api/executor/lock", counted(&lock_hits, StatusCode::OK, json!({})));
    let base = serve(app).await;
    let gate = open_gate(&base).await;

    let dispatcher = KillSwitchDispatcher::new(transport(), Endpoints::new(&base).unwrap());
    let mut dialog = KillDialog::new();
    dialog.open();

    let outcome = dispatcher.confirm(&mut dialog, &gate).await.unwrap();
    assert_eq!(outcome.status, ActionStatus::Failed);
    assert_eq!(outcome.http_code, Some(500));
    assert_eq!(outcome.detail, "FAIL (500): state file is read-only");
    assert_eq!(kill_hits.load(Ordering::SeqCst), 1);
    assert_eq!(lock_hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn long_server_detail_is_truncated() {
    let kill_hits = Arc::new(AtomicUsize::new(0));
    let long = "x".repeat(500);
    let app = Router::new().route(
        "/api/executor/kill",
        counted(&kill_hits, StatusCode::BAD_REQUEST, json!({"error": long})),
    );
    let base = serve(app).await;

    let dispatcher = KillSwitchDispatcher::new(transport(), Endpoints::new(&base).unwrap());
    let mut dialog = KillDialog::new();
    dialog.open();

    let verdict = SafetyVerdict {
        automation_locked: false,
        ..SafetyVerdict::evaluate(&Default::default())
    };
    let outcome = dispatcher.confirm(&mut dialog, &verdict).await.unwrap();
    assert_eq!(outcome.detail, format!("FAIL (400): {}", "x".repeat(200)));
}

#[tokio::test]
async fn locked_gate_never_reaches_the_server() {
    let kill_hits = Arc::new(AtomicUsize::new(0));
    let lock_hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route(
            "/api/executor/status",
            get(|| async {
                Json(json!({"kill_switch": false, "fail_streak": 3, "last_http_code": 200}))
            }),
        )
        .route("/api/executor/kill", counted(&kill_hits, StatusCode::OK, json!({})))
        .route("/api/executor/lock", counted(&lock_hits, StatusCode::OK, json!({})));
    let base = serve(app).await;

    let aggregator = Aggregator::new(transport(), Endpoints::new(&base).unwrap());
    aggregator.refresh_source(SourceKind::Executor).await;
    let snapshot = aggregator.snapshot();
    let verdict = SafetyVerdict::evaluate(&snapshot);
    assert!(verdict.banner.message.contains("fail_streak=3"));

    let dispatcher = KillSwitchDispatcher::new(transport(), Endpoints::new(&base).unwrap());
    let mut dialog = KillDialog::new();
    dialog.open();
    let outcome = dispatcher.confirm(&mut dialog, &snapshot).await.unwrap();

    assert_eq!(outcome.status, ActionStatus::Blocked);
    assert_eq!(dialog.phase(), DialogPhase::Blocked);
    assert_eq!(kill_hits.load(Ordering::SeqCst), 0);
    assert_eq!(lock_hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unreachable_server_is_an_error_outcome() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let dispatcher = KillSwitchDispatcher::new(transport(), Endpoints::new(&base).unwrap());
    let mut dialog = KillDialog::new();
    dialog.open();
    let verdict = SafetyVerdict {
        automation_locked: false,
        ..SafetyVerdict::evaluate(&Default::default())
    };

    let outcome = dispatcher.confirm(&mut dialog, &verdict).await.unwrap();
    assert_eq!(outcome.status, ActionStatus::Error);
    assert_eq!(outcome.http_code, None);
    assert!(outcome.detail.starts_with("ERROR: "), "{}", outcome.detail);
    assert_eq!(dialog.phase(), DialogPhase::Errored);
}

#[tokio::test]
async fn body_cut_off_after_2xx_is_an_error_outcome() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    // Promises 100 bytes, sends 2, then hangs up
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let _ = socket.read(&mut buf).await;
        let _ = socket
            .write_all(
                b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 100\r\n\r\n{}",
            )
            .await;
        let _ = socket.shutdown().await;
    });

    let dispatcher = KillSwitchDispatcher::new(transport(), Endpoints::new(&base).unwrap());
    let mut dialog = KillDialog::new();
    dialog.open();
    let verdict = SafetyVerdict {
        automation_locked: false,
        ..SafetyVerdict::evaluate(&Default::default())
    };

    let outcome = dispatcher.confirm(&mut dialog, &verdict).await.unwrap();
    assert_eq!(outcome.status, ActionStatus::Error, "{:?}", outcome);
    assert!(outcome.detail.starts_with("ERROR: "), "{}", outcome.detail);
    assert_eq!(dialog.phase(), DialogPhase::Errored);
}
