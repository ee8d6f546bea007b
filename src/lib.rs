pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod normalize;
pub mod safety;
pub mod services;
pub mod tui;

pub use adapters::{Endpoints, HttpStatusClient, StatusTransport};
pub use config::AppConfig;
pub use domain::{Banner, BannerLevel, DashboardSnapshot, SourceKind};
pub use error::{DashError, Result};
pub use safety::{KillSwitchDispatcher, SafetyVerdict};
pub use services::Aggregator;
