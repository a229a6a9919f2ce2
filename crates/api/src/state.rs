use std::sync::Arc;

use jotter_core::storage::MediaStorage;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind an `Arc` or is already a handle.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: jotter_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Backend that stores uploaded audio files.
    pub storage: Arc<dyn MediaStorage>,
}
