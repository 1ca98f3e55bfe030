//! Seed the database with random demo analyses.
//!
//! Each user gets `per_day` analyses on each of the last `days` days, with
//! a random emotion, a confidence in `0.40..=0.99` and a random time of day.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::seq::IndexedRandom;

use ser_core::{Emotion, UserId};
use ser_dashboard::db::{AnalysisRepository, NewAnalysis};

use super::{CommandError, connect};

const SECONDS_PER_DAY: i64 = 86_400;

/// Insert demo analyses for `users`.
pub async fn run(users: &[String], days: u32, per_day: u32) -> Result<(), CommandError> {
    let plan = plan(users, days, per_day, Utc::now(), &mut rand::rng())?;

    let pool = connect().await?;
    let repo = AnalysisRepository::new(&pool);

    tracing::info!(rows = plan.len(), users = users.len(), "Seeding analyses");
    for (analysis, created_at) in &plan {
        repo.insert_at(analysis, *created_at).await?;
    }

    tracing::info!(rows = plan.len(), "Seeding complete!");
    Ok(())
}

/// Build the rows to insert, validating arguments first.
fn plan<R: Rng + ?Sized>(
    users: &[String],
    days: u32,
    per_day: u32,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<Vec<(NewAnalysis, DateTime<Utc>)>, CommandError> {
    let user_ids = users
        .iter()
        .map(|u| {
            let u = u.trim();
            if u.is_empty() {
                Err(CommandError::InvalidArgument("user id must not be empty".into()))
            } else {
                Ok(UserId::new(u))
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    if days == 0 || per_day == 0 {
        return Err(CommandError::InvalidArgument(
            "--days and --per-day must be at least 1".into(),
        ));
    }

    let mut rows = Vec::new();
    for user_id in &user_ids {
        for day in 0..days {
            for _ in 0..per_day {
                let emotion = *Emotion::ALL.choose(rng).unwrap_or(&Emotion::Neutral);
                let confidence = f64::from(rng.random_range(40_u32..=99)) / 100.0;
                // Today's rows stay in the past.
                let offset = Duration::days(i64::from(day))
                    + Duration::seconds(rng.random_range(0..SECONDS_PER_DAY));
                rows.push((
                    NewAnalysis {
                        user_id: user_id.clone(),
                        emotion,
                        confidence,
                    },
                    now - offset,
                ));
            }
        }
    }
    Ok(rows)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_covers_every_user_and_day() {
        let now = Utc::now();
        let users = vec!["alice".to_string(), "bob".to_string()];
        let rows = plan(&users, 3, 2, now, &mut rand::rng()).unwrap();

        assert_eq!(rows.len(), 12);
        assert_eq!(
            rows.iter()
                .filter(|(a, _)| a.user_id.as_str() == "alice")
                .count(),
            6
        );
        for (analysis, at) in &rows {
            assert!((0.4..=0.99).contains(&analysis.confidence));
            assert!(*at <= now);
            assert!(*at > now - Duration::days(3));
        }
    }

    #[test]
    fn test_plan_rejects_empty_arguments() {
        let now = Utc::now();
        let users = vec!["alice".to_string()];
        assert!(plan(&users, 0, 2, now, &mut rand::rng()).is_err());
        assert!(plan(&users, 2, 0, now, &mut rand::rng()).is_err());
        assert!(plan(&[" ".to_string()], 2, 2, now, &mut rand::rng()).is_err());
    }
}
