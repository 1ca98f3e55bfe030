//! Dashboard route handlers.
//!
//! `/dashboard` is a per-request branch: admins get the overview (summary
//! cards, charts, users table), everyone else gets their own emotion log.

use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use tracing::instrument;

use ser_core::stats::{DailyStat, DashboardSummary, EmotionSummary};
use ser_core::table::TableParams;
use ser_core::{EmotionLog, UserId, UserRecord};

use crate::{
    components::{TableChrome, emotion_log_table_config, users_table_config},
    db::AnalysisRepository,
    filters,
    middleware::{CurrentUser, RequireUser},
    services::{SnapshotKey, stats},
    state::AppState,
};

use super::{NavView, render};

/// Notice shown when a table fell back to its last-known snapshot.
const STALE_NOTICE: &str = "Couldn't load the latest data. Showing the last results we have.";

// =============================================================================
// View models
// =============================================================================

/// Emotion log row view for templates.
#[derive(Debug, Clone)]
pub struct LogRowView {
    pub emotion: &'static str,
    pub emotion_label: &'static str,
    pub confidence: f64,
    pub recorded_at: String,
    pub timestamp_iso: String,
}

impl LogRowView {
    fn new(log: &EmotionLog, offset: FixedOffset) -> Self {
        Self {
            emotion: log.emotion.as_str(),
            emotion_label: log.emotion.label(),
            confidence: log.confidence,
            recorded_at: format_local(log.timestamp, offset),
            timestamp_iso: log.timestamp_iso(),
        }
    }
}

/// Users table row view for templates.
#[derive(Debug, Clone)]
pub struct UserRowView {
    pub id: String,
    pub name: String,
    pub initials: String,
    pub email: String,
    pub image_url: String,
    pub role: String,
    pub status: &'static str,
    pub status_label: &'static str,
    pub last_active: String,
    pub total_recordings: u64,
}

impl UserRowView {
    fn new(user: &UserRecord, offset: FixedOffset) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            initials: user.initials(),
            email: user.email.clone(),
            image_url: user.image_url.clone(),
            role: user.role.clone(),
            status: user.status.as_str(),
            status_label: user.status.label(),
            last_active: format_local(user.last_active, offset),
            total_recordings: user.total_recordings,
        }
    }
}

/// One bar or slice of a chart.
#[derive(Debug, Clone, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: u64,
    pub color: &'static str,
}

/// Chart data handed to the browser as JSON.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChartData {
    pub emotions: Vec<ChartPoint>,
    pub daily_users: Vec<ChartPoint>,
}

impl ChartData {
    fn new(distribution: &[EmotionSummary], daily: &[DailyStat]) -> Self {
        Self {
            emotions: distribution
                .iter()
                .map(|s| ChartPoint {
                    label: s.emotion.label().to_string(),
                    value: s.count,
                    color: s.emotion.color(),
                })
                .collect(),
            daily_users: daily
                .iter()
                .map(|d| ChartPoint {
                    label: d.date.clone(),
                    value: u64::try_from(d.users).unwrap_or(u64::MAX),
                    color: "#6366f1",
                })
                .collect(),
        }
    }
}

fn format_local(at: DateTime<Utc>, offset: FixedOffset) -> String {
    at.with_timezone(&offset).format("%b %-d, %Y %H:%M").to_string()
}

// =============================================================================
// Templates
// =============================================================================

/// Emotion log page template.
#[derive(Template)]
#[template(path = "dashboard/logs.html")]
pub struct LogsTemplate {
    pub nav: NavView,
    pub title: String,
    pub subject_user_id: String,
    pub table: TableChrome,
    pub rows: Vec<LogRowView>,
    pub notice: Option<String>,
}

/// Admin overview template.
#[derive(Template)]
#[template(path = "dashboard/admin.html")]
pub struct AdminTemplate {
    pub nav: NavView,
    pub summary: DashboardSummary,
    pub distribution: Vec<EmotionSummary>,
    pub daily: Vec<DailyStat>,
    pub chart_json: String,
    pub table: TableChrome,
    pub rows: Vec<UserRowView>,
    pub notice: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Dashboard handler: admin overview or the caller's own log.
#[instrument(skip(user, state, params), fields(user_id = %user.id, admin = user.is_admin))]
pub async fn index(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Query(params): Query<TableParams>,
) -> Response {
    if user.is_admin {
        admin_overview(&user, &state, &params).await.into_response()
    } else {
        let title = "Your Emotion Log".to_string();
        logs_page(&user, &state, &user.id, title, "/dashboard", &params)
            .await
            .into_response()
    }
}

/// One user's emotion log. Admins may view anyone; others only themselves.
#[instrument(skip(user, state, params), fields(user_id = %user.id, subject = %subject))]
pub async fn user_logs(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(subject): Path<String>,
    Query(params): Query<TableParams>,
) -> Response {
    let subject = UserId::new(subject);
    if !user.can_view(&subject) {
        tracing::warn!("Denied access to another user's emotion log");
        return Redirect::to("/dashboard").into_response();
    }

    let title = if subject == user.id {
        "Your Emotion Log".to_string()
    } else {
        match state.identity().get_user(&subject).await {
            Ok(profile) if !profile.full_name().is_empty() => {
                format!("{}'s Emotion Log", profile.full_name())
            }
            Ok(_) => format!("Emotion Log for {subject}"),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch user profile");
                format!("Emotion Log for {subject}")
            }
        }
    };

    let path = format!("/dashboard/{}", url_segment(subject.as_str()));
    logs_page(&user, &state, &subject, title, &path, &params)
        .await
        .into_response()
}

async fn logs_page(
    user: &CurrentUser,
    state: &AppState,
    subject: &UserId,
    title: String,
    path: &str,
    params: &TableParams,
) -> axum::response::Html<String> {
    let config = emotion_log_table_config();
    let mut controller = config.controller::<EmotionLog>(params);

    let repo = AnalysisRepository::new(state.pool());
    let notice = state
        .snapshots()
        .refresh(
            SnapshotKey::UserLogs(subject.clone()),
            &mut controller,
            repo.list_for_user(subject),
        )
        .await
        .err()
        .map(|e| {
            tracing::error!(error = %e, "Failed to fetch emotion logs");
            STALE_NOTICE.to_string()
        });

    let offset = state.config().utc_offset;
    let view = controller.view();
    let table = TableChrome::new(&config, path, controller.state(), &view);
    let rows = view.rows.iter().map(|log| LogRowView::new(log, offset)).collect();

    let template = LogsTemplate {
        nav: NavView::new(Some(user), path, state),
        title,
        subject_user_id: subject.to_string(),
        table,
        rows,
        notice,
    };
    render(&template)
}

async fn admin_overview(
    user: &CurrentUser,
    state: &AppState,
    params: &TableParams,
) -> axum::response::Html<String> {
    let config = users_table_config();
    let mut controller = config.controller::<UserRecord>(params);

    let (users_result, distribution, daily) = tokio::join!(
        state.snapshots().refresh(
            SnapshotKey::Users,
            &mut controller,
            stats::user_records(state.pool(), state.identity()),
        ),
        stats::emotion_distribution(state.pool()),
        stats::daily_active_users(state.pool(), state.config().utc_offset),
    );
    let notice = users_result.err().map(|e| {
        tracing::error!(error = %e, "Failed to fetch users");
        STALE_NOTICE.to_string()
    });

    let offset = state.config().utc_offset;
    let summary = DashboardSummary::from_users(controller.snapshot());
    let chart_json = serde_json::to_string(&ChartData::new(&distribution, &daily))
        .unwrap_or_else(|_| "{}".to_string());
    let view = controller.view();
    let table = TableChrome::new(&config, "/dashboard", controller.state(), &view);
    let rows = view.rows.iter().map(|u| UserRowView::new(u, offset)).collect();

    let template = AdminTemplate {
        nav: NavView::new(Some(user), "/dashboard", state),
        summary,
        distribution,
        daily,
        chart_json,
        table,
        rows,
        notice,
    };
    render(&template)
}

/// Percent-encode a user id for use as a single path segment.
fn url_segment(id: &str) -> String {
    url::form_urlencoded::byte_serialize(id.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ser_core::{AnalysisId, Emotion};

    #[test]
    fn test_log_row_uses_local_time() {
        let log = EmotionLog {
            id: AnalysisId::new("a1"),
            user_id: UserId::new("u1"),
            emotion: Emotion::Calm,
            confidence: 0.42,
            timestamp: Utc.with_ymd_and_hms(2025, 3, 16, 23, 30, 0).unwrap(),
        };
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let row = LogRowView::new(&log, offset);

        assert_eq!(row.recorded_at, "Mar 17, 2025 01:30");
        assert_eq!(row.timestamp_iso, "2025-03-16T23:30:00.000Z");
        assert_eq!(row.emotion_label, "Calm");
    }

    #[test]
    fn test_chart_data_keeps_order() {
        let distribution = vec![
            EmotionSummary { emotion: Emotion::Happy, count: 2 },
            EmotionSummary { emotion: Emotion::Sad, count: 1 },
        ];
        let chart = ChartData::new(&distribution, &[]);
        assert_eq!(chart.emotions[0].label, "Happy");
        assert_eq!(chart.emotions[1].value, 1);
        assert_eq!(chart.emotions[0].color, Emotion::Happy.color());
    }

    #[test]
    fn test_url_segment_escapes() {
        assert_eq!(url_segment("user_2abc"), "user_2abc");
        assert_eq!(url_segment("a/b c"), "a%2Fb%20c");
    }
}
