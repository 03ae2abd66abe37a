use std::sync::Arc;

use restyle_pipeline::Pipeline;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything inside is behind `Arc` or is a pool handle.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool, used by the health check.
    pub pool: restyle_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// The job pipeline run by each trigger.
    pub pipeline: Arc<Pipeline>,
}
