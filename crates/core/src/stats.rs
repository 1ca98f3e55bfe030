//! Summary reductions behind the dashboard charts.
//!
//! All functions here are pure. Callers fetch the raw records and decide
//! what an unavailable store means (the dashboard renders empty charts).

use std::collections::HashSet;

use chrono::{DateTime, Days, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use crate::types::{Emotion, UserRecord, UserStatus};

/// Days in the daily-active-users window, today included.
pub const DAILY_WINDOW_DAYS: u64 = 7;

/// Occurrences of one emotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EmotionSummary {
    pub emotion: Emotion,
    pub count: u64,
}

/// Distinct users active on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyStat {
    /// Short weekday label (`"Mon"`).
    pub date: String,
    pub day: NaiveDate,
    pub users: usize,
}

/// Headline numbers for the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub total_users: usize,
    pub active_users: usize,
    pub total_recordings: u64,
    pub dominant_emotion: Emotion,
}

impl DashboardSummary {
    #[must_use]
    pub fn from_users(users: &[UserRecord]) -> Self {
        Self {
            total_users: users.len(),
            active_users: users
                .iter()
                .filter(|u| u.status == UserStatus::Active)
                .count(),
            total_recordings: users.iter().map(|u| u.total_recordings).sum(),
            dominant_emotion: dominant_emotion(&emotion_totals(users)),
        }
    }
}

/// Adds `count` to `emotion`'s entry, appending it when first seen.
fn tally(summaries: &mut Vec<EmotionSummary>, emotion: Emotion, count: u64) {
    match summaries.iter_mut().find(|s| s.emotion == emotion) {
        Some(summary) => summary.count += count,
        None => summaries.push(EmotionSummary { emotion, count }),
    }
}

/// Count occurrences per emotion, most frequent first.
///
/// Emotions with equal counts stay in the order they were first seen.
pub fn emotion_distribution<I>(emotions: I) -> Vec<EmotionSummary>
where
    I: IntoIterator<Item = Emotion>,
{
    let mut summaries = Vec::new();
    for emotion in emotions {
        tally(&mut summaries, emotion, 1);
    }
    summaries.sort_by(|a, b| b.count.cmp(&a.count));
    summaries
}

/// Sum every user's per-emotion counts.
///
/// `neutral` is always present (seeded at zero) so an empty dashboard still
/// has a dominant emotion. Order is first-seen order, neutral first.
#[must_use]
pub fn emotion_totals(users: &[UserRecord]) -> Vec<EmotionSummary> {
    let mut totals = vec![EmotionSummary {
        emotion: Emotion::Neutral,
        count: 0,
    }];
    for user in users {
        for (emotion, count) in &user.emotion_counts {
            tally(&mut totals, *emotion, *count);
        }
    }
    totals
}

/// The emotion with the largest count; the earlier entry wins a tie.
#[must_use]
pub fn dominant_emotion(totals: &[EmotionSummary]) -> Emotion {
    totals
        .iter()
        .fold(None::<&EmotionSummary>, |best, s| match best {
            Some(b) if b.count >= s.count => Some(b),
            _ => Some(s),
        })
        .map_or(Emotion::Neutral, |s| s.emotion)
}

/// Distinct active users per day over the trailing week.
///
/// Buckets are the calendar dates of `now` and the six days before it, in
/// `now`'s time zone, oldest first. Each activity `(user_id, instant)` adds
/// its user to the bucket of its local date; activity outside the window is
/// ignored.
pub fn daily_active_users<'a, I, Tz>(activity: I, now: &DateTime<Tz>) -> Vec<DailyStat>
where
    I: IntoIterator<Item = (&'a str, DateTime<Utc>)>,
    Tz: TimeZone,
{
    let tz = now.timezone();
    let today = now.date_naive();
    let days: Vec<NaiveDate> = (0..DAILY_WINDOW_DAYS)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .collect();

    let mut buckets: Vec<HashSet<&str>> = vec![HashSet::new(); days.len()];
    for (user_id, at) in activity {
        let date = at.with_timezone(&tz).date_naive();
        if let Some(bucket) = days
            .iter()
            .position(|d| *d == date)
            .and_then(|index| buckets.get_mut(index))
        {
            bucket.insert(user_id);
        }
    }

    days.into_iter()
        .zip(buckets)
        .map(|(day, users)| DailyStat {
            date: day.format("%a").to_string(),
            day,
            users: users.len(),
        })
        .collect()
}
