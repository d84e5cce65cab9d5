//! Application state shared across Axum route handlers.

use common::AppConfig;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Central application state: the database connection plus the
/// configuration loaded once at startup. Handlers and guards read the JWT
/// secret from here rather than the process environment.
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: AppConfig) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Cloned connection for spawned tasks that need ownership.
    pub fn db_clone(&self) -> DatabaseConnection {
        self.db.clone()
    }
}
