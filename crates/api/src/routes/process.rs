use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Mount the trigger at the root.
///
/// ```text
/// GET  /    run one invocation
/// POST /    run one invocation
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(handlers::process::process_next).post(handlers::process::process_next),
    )
}
