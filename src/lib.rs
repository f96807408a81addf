//! Usagelog Equipment Usage Logbook
//!
//! A Rust implementation of the equipment usage logbook server, providing a
//! REST JSON API over a remote spreadsheet-style record store: session login,
//! per-machine usage records, utilization and breakdown statistics, bulk
//! import of the external reporting template, and CSV/XLSX export.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
pub mod tabular;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
