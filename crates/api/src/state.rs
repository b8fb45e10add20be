use std::sync::Arc;

use kolorit_pipeline::StorageLayout;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`. Cheaply cloneable.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: kolorit_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Rendered-image storage layout, shared with spawned runs.
    pub storage: StorageLayout,
}
