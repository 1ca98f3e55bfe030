//! Record builders shared by the table tests.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};

use crate::types::{AnalysisId, Emotion, EmotionLog, UserId, UserRecord, UserStatus};

pub fn ts(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 10, 0, 0).unwrap()
}

pub fn log(id: &str, emotion: Emotion, confidence: f64, timestamp: DateTime<Utc>) -> EmotionLog {
    EmotionLog {
        id: AnalysisId::new(id),
        user_id: UserId::new("user_1"),
        emotion,
        confidence,
        timestamp,
    }
}

pub fn user(
    id: &str,
    name: &str,
    email: &str,
    role: &str,
    last_active: DateTime<Utc>,
    total_recordings: u64,
) -> UserRecord {
    UserRecord {
        id: UserId::new(id),
        name: name.to_string(),
        email: email.to_string(),
        image_url: String::new(),
        role: role.to_string(),
        status: UserStatus::Active,
        last_active,
        total_recordings,
        emotion_counts: BTreeMap::new(),
    }
}

/// `count` logs, one per day starting 2024-01-01, cycling through emotions.
pub fn logs(count: usize) -> Vec<EmotionLog> {
    (0..count)
        .map(|i| {
            let emotion = Emotion::ALL[i % Emotion::ALL.len()];
            let timestamp = ts(2024, 1, 1) + chrono::Duration::days(i64::try_from(i).unwrap());
            log(&format!("log{i}"), emotion, 0.5, timestamp)
        })
        .collect()
}
