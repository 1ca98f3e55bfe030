//! Aggregate statistics API (admin only).

use axum::{Json, Router, extract::State, routing::get};
use tracing::instrument;

use ser_core::stats::{DailyStat, EmotionSummary};

use crate::{middleware::RequireAdmin, services::stats, state::AppState};

/// Build the stats router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/stats/emotions", get(emotions))
        .route("/api/stats/daily-users", get(daily_users))
}

/// Emotion distribution over every stored analysis.
///
/// Empty when the store is unavailable.
#[instrument(skip_all)]
pub async fn emotions(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Json<Vec<EmotionSummary>> {
    Json(stats::emotion_distribution(state.pool()).await)
}

/// Distinct active users per day over the trailing week.
///
/// Empty when the store is unavailable.
#[instrument(skip_all)]
pub async fn daily_users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Json<Vec<DailyStat>> {
    Json(stats::daily_active_users(state.pool(), state.config().utc_offset).await)
}
