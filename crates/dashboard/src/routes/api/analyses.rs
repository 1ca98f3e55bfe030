//! Emotion log API.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;
use tracing::instrument;

use ser_core::{EmotionLog, UserId};

use crate::{
    db::AnalysisRepository, error::AppError, middleware::RequireUser, state::AppState,
};

/// Build the analyses router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/analyses", get(list))
}

/// Query parameters for listing analyses.
#[derive(Debug, Default, Deserialize)]
pub struct AnalysesQuery {
    /// Whose analyses to list; defaults to the caller.
    pub user_id: Option<String>,
}

/// List a user's analyses, newest first.
///
/// # Errors
///
/// Returns `AppError::Forbidden` when a non-admin asks for another user, or
/// `AppError::Database` if the query fails.
#[instrument(skip(user, state), fields(user_id = %user.id))]
pub async fn list(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Query(query): Query<AnalysesQuery>,
) -> Result<Json<Vec<EmotionLog>>, AppError> {
    let subject = query
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map_or_else(|| user.id.clone(), UserId::new);

    if !user.can_view(&subject) {
        return Err(AppError::Forbidden(
            "Cannot view another user's analyses".to_string(),
        ));
    }

    let logs = AnalysisRepository::new(state.pool())
        .list_for_user(&subject)
        .await?;
    Ok(Json(logs))
}
