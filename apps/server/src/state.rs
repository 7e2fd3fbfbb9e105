//! Shared application state.

use spares_db::Database;

use crate::config::ServerConfig;

/// Handed to every handler. Cloning is cheap: the database is a pool handle.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(db: Database, config: ServerConfig) -> Self {
        AppState { db, config }
    }
}
