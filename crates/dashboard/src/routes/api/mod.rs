//! JSON API route handlers.

pub mod analyses;
pub mod analyze;
pub mod stats;

use axum::Router;

use crate::state::AppState;

/// Build the complete API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(analyze::router())
        .merge(analyses::router())
        .merge(stats::router())
}
