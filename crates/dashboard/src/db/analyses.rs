//! Emotion analysis repository.
//!
//! Rows are only ever inserted; the dashboard never updates or deletes an
//! analysis.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use ser_core::{AnalysisId, Emotion, EmotionLog, UserId};

use super::RepositoryError;

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct AnalysisRow {
    id: Uuid,
    user_id: String,
    emotion: String,
    confidence: f64,
    created_at: DateTime<Utc>,
}

impl TryFrom<AnalysisRow> for EmotionLog {
    type Error = RepositoryError;

    fn try_from(row: AnalysisRow) -> Result<Self, Self::Error> {
        let emotion = parse_emotion(&row.emotion)?;
        if !(0.0..=1.0).contains(&row.confidence) {
            return Err(RepositoryError::DataCorruption(format!(
                "confidence {} out of range for analysis {}",
                row.confidence, row.id
            )));
        }

        Ok(Self {
            id: AnalysisId::from(row.id),
            user_id: UserId::new(row.user_id),
            emotion,
            confidence: row.confidence,
            timestamp: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserEmotionCountRow {
    user_id: String,
    emotion: String,
    count: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct ActivityRow {
    user_id: String,
    created_at: DateTime<Utc>,
}

fn parse_emotion(raw: &str) -> Result<Emotion, RepositoryError> {
    raw.parse()
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid emotion in database: {e}")))
}

/// Fields of an analysis to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAnalysis {
    pub user_id: UserId,
    pub emotion: Emotion,
    pub confidence: f64,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for emotion analyses.
pub struct AnalysisRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AnalysisRepository<'a> {
    /// Create a new analysis repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store one analysis and return it with its id and timestamp.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    #[instrument(skip(self), fields(user_id = %analysis.user_id, emotion = %analysis.emotion))]
    pub async fn insert(&self, analysis: &NewAnalysis) -> Result<EmotionLog, RepositoryError> {
        let row = sqlx::query_as::<_, AnalysisRow>(
            r"
            INSERT INTO analysis (id, user_id, emotion, confidence)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, emotion, confidence, created_at
            ",
        )
        .bind(Uuid::new_v4())
        .bind(analysis.user_id.as_str())
        .bind(analysis.emotion.as_str())
        .bind(analysis.confidence)
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Store one analysis with an explicit timestamp (demo data seeding).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    #[instrument(skip(self), fields(user_id = %analysis.user_id, emotion = %analysis.emotion))]
    pub async fn insert_at(
        &self,
        analysis: &NewAnalysis,
        created_at: DateTime<Utc>,
    ) -> Result<EmotionLog, RepositoryError> {
        let row = sqlx::query_as::<_, AnalysisRow>(
            r"
            INSERT INTO analysis (id, user_id, emotion, confidence, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, emotion, confidence, created_at
            ",
        )
        .bind(Uuid::new_v4())
        .bind(analysis.user_id.as_str())
        .bind(analysis.emotion.as_str())
        .bind(analysis.confidence)
        .bind(created_at)
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Every analysis owned by `user_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a row is invalid.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<EmotionLog>, RepositoryError> {
        let rows = sqlx::query_as::<_, AnalysisRow>(
            r"
            SELECT id, user_id, emotion, confidence, created_at
            FROM analysis
            WHERE user_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(user_id.as_str())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Every stored emotion label, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a label is unknown.
    #[instrument(skip(self))]
    pub async fn list_emotions(&self) -> Result<Vec<Emotion>, RepositoryError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT emotion FROM analysis ORDER BY created_at ASC, id ASC")
                .fetch_all(self.pool)
                .await?;

        rows.iter().map(|(emotion,)| parse_emotion(emotion)).collect()
    }

    /// `(user_id, instant)` for every analysis at or after `since`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn activity_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<(UserId, DateTime<Utc>)>, RepositoryError> {
        let rows = sqlx::query_as::<_, ActivityRow>(
            r"
            SELECT user_id, created_at
            FROM analysis
            WHERE created_at >= $1
            ORDER BY created_at ASC
            ",
        )
        .bind(since)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| (UserId::new(row.user_id), row.created_at))
            .collect())
    }

    /// Per-user, per-emotion analysis counts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a row is invalid.
    #[instrument(skip(self))]
    pub async fn counts_by_user(
        &self,
    ) -> Result<HashMap<UserId, Vec<(Emotion, u64)>>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserEmotionCountRow>(
            r"
            SELECT user_id, emotion, COUNT(*) AS count
            FROM analysis
            GROUP BY user_id, emotion
            ",
        )
        .fetch_all(self.pool)
        .await?;

        let mut counts: HashMap<UserId, Vec<(Emotion, u64)>> = HashMap::new();
        for row in rows {
            let emotion = parse_emotion(&row.emotion)?;
            let count = u64::try_from(row.count).map_err(|_| {
                RepositoryError::DataCorruption(format!("negative count {}", row.count))
            })?;
            counts
                .entry(UserId::new(row.user_id))
                .or_default()
                .push((emotion, count));
        }
        Ok(counts)
    }

    /// Total number of stored analyses.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM analysis")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
