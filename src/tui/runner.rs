//! Dashboard runner with live data integration
//!
//! Connects the aggregator's published snapshots and the kill-switch
//! dispatcher to the terminal view.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use crate::adapters::{Endpoints, HttpStatusClient, StatusTransport};
use crate::config::AppConfig;
use crate::domain::ActionOutcome;
use crate::error::{DashError, Result};
use crate::safety::{Confirmation, KillSwitchDispatcher};
use crate::services::{Aggregator, RefreshHandle, RefreshRequest};
use crate::tui::app::{AppCommand, DashboardApp};
use crate::tui::event::KeyAction;
use crate::tui::{init_terminal, restore_terminal, ui};

/// Dashboard runner that manages the poll loop and the TUI
pub struct DashboardRunner {
    app: DashboardApp,
    aggregator: Arc<Aggregator>,
    dispatcher: KillSwitchDispatcher,
    refresh: RefreshHandle,
    requests: mpsc::UnboundedReceiver<RefreshRequest>,
    interval: Duration,
}

impl DashboardRunner {
    pub fn new(transport: Arc<dyn StatusTransport>, endpoints: Endpoints, interval: Duration) -> Self {
        let (refresh, requests) = RefreshHandle::channel();
        let app = DashboardApp::new(endpoints.base(), interval);
        let dispatcher = KillSwitchDispatcher::new(Arc::clone(&transport), endpoints.clone())
            .with_refresh(refresh.clone());
        let aggregator = Arc::new(Aggregator::new(transport, endpoints));

        Self {
            app,
            aggregator,
            dispatcher,
            refresh,
            requests,
            interval,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let endpoints = Endpoints::new(&config.api.base_url)?;
        let client = HttpStatusClient::new(config.request_timeout())?;
        Ok(Self::new(Arc::new(client), endpoints, config.poll_interval()))
    }

    /// Run the dashboard until the operator quits
    pub async fn run(self) -> Result<()> {
        let Self {
            mut app,
            aggregator,
            dispatcher,
            refresh,
            requests,
            interval,
        } = self;

        info!("Starting dashboard against {}", app.base_url);

        let mut terminal = init_terminal()
            .map_err(|e| DashError::Terminal(format!("Failed to init terminal: {}", e)))?;

        let mut snapshots = aggregator.subscribe();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let poller = tokio::spawn(Arc::clone(&aggregator).run(interval, requests, shutdown_rx));

        // Outcomes of in-flight kill requests
        let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel::<ActionOutcome>();

        let result = loop {
            if let Err(e) = terminal.draw(|f| ui::render(f, &app)) {
                break Err(DashError::Terminal(format!("Failed to render: {}", e)));
            }

            tokio::select! {
                // Handle keyboard input
                _ = tokio::time::sleep(Duration::from_millis(50)) => {
                    if crossterm::event::poll(Duration::from_millis(0)).unwrap_or(false) {
                        if let Ok(crossterm::event::Event::Key(key)) = crossterm::event::read() {
                            match app.handle_key(KeyAction::from(key)) {
                                AppCommand::Quit => {}
                                AppCommand::Refresh => {
                                    debug!("Manual refresh");
                                    refresh.refresh_all();
                                }
                                AppCommand::ConfirmKill => {
                                    // The gate is the freshest published snapshot, not the
                                    // one last drawn.
                                    if let Confirmation::Dispatch(request) =
                                        dispatcher.begin(&mut app.dialog, &snapshots)
                                    {
                                        let outcome_tx = outcome_tx.clone();
                                        tokio::spawn(async move {
                                            let _ = outcome_tx.send(request.send().await);
                                        });
                                    }
                                }
                                AppCommand::None => {}
                            }
                        }
                    }
                }

                // Published state changed
                Ok(()) = snapshots.changed() => {
                    let snapshot = snapshots.borrow_and_update().clone();
                    app.apply_snapshot(snapshot);
                }

                // A kill request resolved
                Some(outcome) = outcome_rx.recv() => {
                    dispatcher.finish(&mut app.dialog, outcome);
                }
            }

            if !app.is_running() {
                break Ok(());
            }
        };

        // Cleanup
        let _ = shutdown_tx.send(true);
        let _ = poller.await;
        restore_terminal()
            .map_err(|e| DashError::Terminal(format!("Failed to restore terminal: {}", e)))?;

        info!("Dashboard stopped");
        result
    }
}

/// Build the runner from config and run it
pub async fn run_dashboard(config: &AppConfig) -> Result<()> {
    DashboardRunner::from_config(config)?.run().await
}
