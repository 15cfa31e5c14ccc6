//! Famlink Server Library
//!
//! This module exports the core types and functions for testing and reuse.

pub mod auth;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod models;
pub mod notify;
pub mod routes;
pub mod security;

pub use config::Config;
pub use error::{AppError, Result};
pub use notify::Notifier;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: sqlx::PgPool,
    pub config: Config,
    pub notifier: Notifier,
}

impl AppState {
    /// Create a new AppState with the given pool and configuration
    pub fn new(pool: sqlx::PgPool, config: Config) -> Self {
        let notifier = Notifier::new(config.notification_service_url.clone());
        Self {
            pool,
            config,
            notifier,
        }
    }
}
