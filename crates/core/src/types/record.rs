//! Displayable records: emotion-log entries and user rows.
//!
//! Records are read-only snapshots. Tables derive views over them and never
//! mutate them.

use std::borrow::Cow;
use std::collections::BTreeMap;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::emotion::Emotion;
use super::id::{AnalysisId, UserId};
use crate::table::{SortValue, TableRecord};

/// A user counts as active when seen within this many days.
pub const ACTIVE_WINDOW_DAYS: i64 = 30;

/// One stored emotion analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionLog {
    pub id: AnalysisId,
    /// Owner of the recording.
    pub user_id: UserId,
    pub emotion: Emotion,
    /// Classifier confidence in `[0, 1]`.
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}

impl EmotionLog {
    /// ISO-8601 timestamp with millisecond precision, as shown and searched.
    #[must_use]
    pub fn timestamp_iso(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Confidence as a whole percentage (`0.873` -> `87`).
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn confidence_percent(&self) -> u8 {
        (self.confidence.clamp(0.0, 1.0) * 100.0).round() as u8
    }
}

impl TableRecord for EmotionLog {
    const SORT_KEYS: &'static [&'static str] = &["emotion", "confidence", "timestamp"];

    fn record_id(&self) -> &str {
        self.id.as_str()
    }

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.emotion.as_str()),
            Cow::Owned(self.timestamp_iso()),
        ]
    }

    fn category(&self) -> Option<&str> {
        Some(self.emotion.as_str())
    }

    fn sort_value(&self, key: &str) -> Option<SortValue<'_>> {
        match key {
            "emotion" => Some(SortValue::Text(Cow::Borrowed(self.emotion.as_str()))),
            "confidence" => Some(SortValue::Number(self.confidence)),
            "timestamp" => Some(SortValue::Time(self.timestamp)),
            _ => None,
        }
    }
}

/// A user profile as supplied by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub image_url: String,
    pub role: String,
    pub last_active: DateTime<Utc>,
}

impl UserProfile {
    /// `"First Last"`, trimmed when either part is missing.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Whether a user has been seen recently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    Inactive,
}

impl UserStatus {
    /// Derive the status from the last activity instant.
    #[must_use]
    pub fn from_last_active(last_active: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if now.signed_duration_since(last_active) <= Duration::days(ACTIVE_WINDOW_DAYS) {
            Self::Active
        } else {
            Self::Inactive
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
        }
    }
}

/// A row of the admin users table: profile plus recording totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub image_url: String,
    pub role: String,
    pub status: UserStatus,
    pub last_active: DateTime<Utc>,
    pub total_recordings: u64,
    pub emotion_counts: BTreeMap<Emotion, u64>,
}

impl UserRecord {
    /// Merge a profile with its per-emotion recording counts.
    ///
    /// Counts for the same emotion are summed; `total_recordings` is the sum
    /// of all counts.
    #[must_use]
    pub fn from_profile(
        profile: UserProfile,
        counts: impl IntoIterator<Item = (Emotion, u64)>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut emotion_counts = BTreeMap::new();
        for (emotion, count) in counts {
            *emotion_counts.entry(emotion).or_insert(0) += count;
        }
        let total_recordings = emotion_counts.values().sum();

        Self {
            name: profile.full_name(),
            status: UserStatus::from_last_active(profile.last_active, now),
            id: profile.id,
            email: profile.email,
            image_url: profile.image_url,
            role: profile.role,
            last_active: profile.last_active,
            total_recordings,
            emotion_counts,
        }
    }

    /// Initials for the avatar fallback (`"Jane Smith"` -> `"JS"`).
    #[must_use]
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .collect()
    }
}

impl TableRecord for UserRecord {
    const SORT_KEYS: &'static [&'static str] =
        &["name", "email", "role", "last_active", "total_recordings"];

    fn record_id(&self) -> &str {
        self.id.as_str()
    }

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.name.as_str()),
            Cow::Borrowed(self.email.as_str()),
            Cow::Borrowed(self.role.as_str()),
        ]
    }

    fn category(&self) -> Option<&str> {
        Some(self.status.as_str())
    }

    #[allow(clippy::cast_precision_loss)]
    fn sort_value(&self, key: &str) -> Option<SortValue<'_>> {
        match key {
            "name" => Some(SortValue::Text(Cow::Borrowed(&self.name))),
            "email" => Some(SortValue::Text(Cow::Borrowed(&self.email))),
            "role" => Some(SortValue::Text(Cow::Borrowed(&self.role))),
            "last_active" => Some(SortValue::Time(self.last_active)),
            "total_recordings" => Some(SortValue::Number(self.total_recordings as f64)),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn profile(first: &str, last: &str, last_active: DateTime<Utc>) -> UserProfile {
        UserProfile {
            id: UserId::new("user_1"),
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: "jane@example.com".to_string(),
            image_url: String::new(),
            role: "user".to_string(),
            last_active,
        }
    }

    #[test]
    fn test_full_name_trims_missing_parts() {
        let now = Utc::now();
        assert_eq!(profile("Jane", "Smith", now).full_name(), "Jane Smith");
        assert_eq!(profile("Jane", "", now).full_name(), "Jane");
        assert_eq!(profile("", "", now).full_name(), "");
    }

    #[test]
    fn test_status_window() {
        let now = Utc.with_ymd_and_hms(2025, 3, 16, 12, 0, 0).unwrap();
        let recent = now - Duration::days(2);
        let stale = now - Duration::days(ACTIVE_WINDOW_DAYS + 1);
        assert_eq!(UserStatus::from_last_active(recent, now), UserStatus::Active);
        assert_eq!(UserStatus::from_last_active(stale, now), UserStatus::Inactive);
    }

    #[test]
    fn test_from_profile_sums_counts() {
        let now = Utc.with_ymd_and_hms(2025, 3, 16, 12, 0, 0).unwrap();
        let record = UserRecord::from_profile(
            profile("Jane", "Smith", now),
            [
                (Emotion::Happy, 3),
                (Emotion::Sad, 1),
                (Emotion::Happy, 2),
            ],
            now,
        );
        assert_eq!(record.total_recordings, 6);
        assert_eq!(record.emotion_counts.get(&Emotion::Happy), Some(&5));
        assert_eq!(record.initials(), "JS");
        assert_eq!(record.status, UserStatus::Active);
    }

    #[test]
    fn test_confidence_percent() {
        let log = EmotionLog {
            id: AnalysisId::new("a"),
            user_id: UserId::new("u"),
            emotion: Emotion::Calm,
            confidence: 0.873,
            timestamp: Utc::now(),
        };
        assert_eq!(log.confidence_percent(), 87);
    }

    #[test]
    fn test_timestamp_iso_format() {
        let log = EmotionLog {
            id: AnalysisId::new("a"),
            user_id: UserId::new("u"),
            emotion: Emotion::Calm,
            confidence: 0.5,
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
        };
        assert_eq!(log.timestamp_iso(), "2024-01-01T10:00:00.000Z");
    }
}
