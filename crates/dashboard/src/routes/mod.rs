//! HTTP route handlers for the dashboard.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Record/upload page
//!
//! # Dashboard (HTML, signed-in users)
//! GET  /dashboard              - Admin overview, or the caller's own emotion log
//! GET  /dashboard/{user_id}    - One user's emotion log (admin or self)
//!
//! # API (JSON, 401 when signed out)
//! POST /api/analyze            - Classify an upload and store the result
//! GET  /api/analyses           - Emotion logs (?user_id=, admin or self)
//! GET  /api/stats/emotions     - Emotion distribution (admin)
//! GET  /api/stats/daily-users  - Daily active users (admin)
//! ```
//!
//! `/health` and `/health/ready` are mounted by [`crate::app`].

pub mod api;
pub mod dashboard;
pub mod home;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Build the complete router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::index))
        .route("/dashboard", get(dashboard::index))
        .route("/dashboard/{user_id}", get(dashboard::user_logs))
        .merge(api::router())
}

/// Navigation bar view shared by every page.
#[derive(Debug, Clone)]
pub struct NavView {
    pub user_id: Option<String>,
    pub is_admin: bool,
    pub current_path: String,
    pub sign_in_url: String,
}

impl NavView {
    #[must_use]
    pub fn new(user: Option<&crate::middleware::CurrentUser>, path: &str, state: &AppState) -> Self {
        Self {
            user_id: user.map(|u| u.id.to_string()),
            is_admin: user.is_some_and(|u| u.is_admin),
            current_path: path.to_string(),
            sign_in_url: state.config().sign_in_url.clone(),
        }
    }
}

/// Render a template to HTML, logging render failures.
pub fn render<T: askama::Template>(template: &T) -> axum::response::Html<String> {
    axum::response::Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
}
