//! Record/upload page.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use crate::{filters, middleware::OptionalUser, state::AppState};

use super::NavView;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub nav: NavView,
    pub signed_in: bool,
    /// Upload limit shown next to the file picker.
    pub max_upload_mb: usize,
}

/// Record/upload page handler.
#[instrument(skip(user, state))]
pub async fn index(OptionalUser(user): OptionalUser, State(state): State<AppState>) -> HomeTemplate {
    HomeTemplate {
        nav: NavView::new(user.as_ref(), "/", &state),
        signed_in: user.is_some(),
        max_upload_mb: state.config().max_upload_bytes / (1024 * 1024),
    }
}
