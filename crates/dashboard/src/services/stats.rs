//! Dashboard aggregates backed by the analysis store.
//!
//! Chart data degrades: when the store is unavailable the chart renders
//! empty and a warning is logged. The users table is a hard fetch and
//! returns its error for the snapshot cache to handle.

use std::collections::HashMap;

use chrono::{Duration, FixedOffset, Utc};
use sqlx::PgPool;

use ser_core::stats::{self, DAILY_WINDOW_DAYS, DailyStat, EmotionSummary};
use ser_core::{Emotion, UserId, UserProfile, UserRecord};

use crate::db::AnalysisRepository;
use crate::error::AppError;
use crate::identity::IdentityClient;

/// Emotion counts over every stored analysis, most frequent first.
pub async fn emotion_distribution(pool: &PgPool) -> Vec<EmotionSummary> {
    match AnalysisRepository::new(pool).list_emotions().await {
        Ok(emotions) => stats::emotion_distribution(emotions),
        Err(e) => {
            tracing::warn!(error = %e, "Emotion distribution unavailable");
            Vec::new()
        }
    }
}

/// Distinct active users per local calendar day over the trailing week.
pub async fn daily_active_users(pool: &PgPool, offset: FixedOffset) -> Vec<DailyStat> {
    let now = Utc::now();
    let window = i64::try_from(DAILY_WINDOW_DAYS).unwrap_or(7);
    let since = now - Duration::days(window);

    match AnalysisRepository::new(pool).activity_since(since).await {
        Ok(activity) => stats::daily_active_users(
            activity.iter().map(|(user, at)| (user.as_str(), *at)),
            &now.with_timezone(&offset),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Daily user stats unavailable");
            Vec::new()
        }
    }
}

/// Every identity-provider user with their per-emotion recording counts.
///
/// # Errors
///
/// Returns `AppError::Identity` if users cannot be listed, or
/// `AppError::Database` if the counts query fails.
pub async fn user_records(
    pool: &PgPool,
    identity: &IdentityClient,
) -> Result<Vec<UserRecord>, AppError> {
    let profiles = identity.list_users().await?;
    let counts = AnalysisRepository::new(pool).counts_by_user().await?;
    Ok(merge_user_records(profiles, counts))
}

fn merge_user_records(
    profiles: Vec<UserProfile>,
    mut counts: HashMap<UserId, Vec<(Emotion, u64)>>,
) -> Vec<UserRecord> {
    let now = Utc::now();
    profiles
        .into_iter()
        .map(|profile| {
            let user_counts = counts.remove(&profile.id).unwrap_or_default();
            UserRecord::from_profile(profile, user_counts, now)
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use ser_core::UserStatus;

    fn profile(id: &str, days_ago: i64) -> UserProfile {
        UserProfile {
            id: UserId::new(id),
            first_name: "Test".to_string(),
            last_name: id.to_string(),
            email: format!("{id}@example.com"),
            image_url: String::new(),
            role: "user".to_string(),
            last_active: Utc::now() - Duration::days(days_ago),
        }
    }

    #[test]
    fn test_merge_attaches_counts() {
        let mut counts = HashMap::new();
        counts.insert(
            UserId::new("u1"),
            vec![(Emotion::Happy, 3), (Emotion::Sad, 1)],
        );
        counts.insert(UserId::new("ghost"), vec![(Emotion::Angry, 9)]);

        let records = merge_user_records(vec![profile("u1", 1), profile("u2", 90)], counts);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].total_recordings, 4);
        assert_eq!(records[0].emotion_counts.get(&Emotion::Happy), Some(&3));
        assert_eq!(records[0].status, UserStatus::Active);
        assert_eq!(records[1].total_recordings, 0);
        assert_eq!(records[1].status, UserStatus::Inactive);
    }
}
