//! Last-known table snapshots.
//!
//! Every table page fetches fresh records. When a fetch fails the page keeps
//! rendering the last snapshot that loaded for the same key, so a database
//! hiccup shows stale rows instead of an empty table.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use ser_core::table::{TableController, TableRecord};
use ser_core::{EmotionLog, UserId, UserRecord};

/// Snapshot cache key.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum SnapshotKey {
    /// One user's emotion log.
    UserLogs(UserId),
    /// The admin users table.
    Users,
}

/// Cached snapshot types.
#[derive(Debug, Clone)]
pub enum SnapshotValue {
    Logs(Arc<[EmotionLog]>),
    Users(Arc<[UserRecord]>),
}

/// Records that can be stored in the snapshot cache.
pub trait Snapshot: TableRecord + Sized {
    fn into_value(records: Arc<[Self]>) -> SnapshotValue;
    fn from_value(value: SnapshotValue) -> Option<Arc<[Self]>>;
}

impl Snapshot for EmotionLog {
    fn into_value(records: Arc<[Self]>) -> SnapshotValue {
        SnapshotValue::Logs(records)
    }

    fn from_value(value: SnapshotValue) -> Option<Arc<[Self]>> {
        match value {
            SnapshotValue::Logs(records) => Some(records),
            SnapshotValue::Users(_) => None,
        }
    }
}

impl Snapshot for UserRecord {
    fn into_value(records: Arc<[Self]>) -> SnapshotValue {
        SnapshotValue::Users(records)
    }

    fn from_value(value: SnapshotValue) -> Option<Arc<[Self]>> {
        match value {
            SnapshotValue::Users(records) => Some(records),
            SnapshotValue::Logs(_) => None,
        }
    }
}

/// In-memory store of the last snapshot each table loaded.
#[derive(Clone)]
pub struct SnapshotCache {
    cache: Cache<SnapshotKey, SnapshotValue>,
}

impl SnapshotCache {
    /// Create a cache whose entries expire `ttl` after they were stored.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(1000).time_to_live(ttl).build();
        Self { cache }
    }

    /// Last snapshot stored under `key`, if it has not expired.
    pub async fn get<R: Snapshot>(&self, key: &SnapshotKey) -> Option<Arc<[R]>> {
        self.cache.get(key).await.and_then(R::from_value)
    }

    /// Load `controller` with fresh records from `fetch`.
    ///
    /// The controller is seeded with the last-known snapshot first. On
    /// success the new records replace it and are stored; on failure the
    /// seeded snapshot stays in place and the error is returned.
    ///
    /// # Errors
    ///
    /// Returns the fetch error unchanged.
    pub async fn refresh<R, E, F>(
        &self,
        key: SnapshotKey,
        controller: &mut TableController<R>,
        fetch: F,
    ) -> Result<(), E>
    where
        R: Snapshot,
        F: Future<Output = Result<Vec<R>, E>>,
    {
        if let Some(last) = self.get::<R>(&key).await {
            controller.replace_snapshot(last);
        }

        controller.apply_fetch(fetch.await)?;
        self.cache
            .insert(key, R::into_value(Arc::clone(controller.snapshot())))
            .await;
        Ok(())
    }
}

impl std::fmt::Debug for SnapshotCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotCache")
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use ser_core::table::{SortDirection, SortState, TableState};
    use ser_core::{AnalysisId, Emotion};

    fn log(id: &str) -> EmotionLog {
        EmotionLog {
            id: AnalysisId::new(id),
            user_id: UserId::new("user_1"),
            emotion: Emotion::Calm,
            confidence: 0.7,
            timestamp: Utc.with_ymd_and_hms(2025, 3, 16, 10, 0, 0).unwrap(),
        }
    }

    fn controller() -> TableController<EmotionLog> {
        TableController::new(
            TableState::new(SortState::new("timestamp", SortDirection::Desc)),
            5,
        )
    }

    fn key() -> SnapshotKey {
        SnapshotKey::UserLogs(UserId::new("user_1"))
    }

    #[tokio::test]
    async fn test_successful_fetch_is_stored() {
        let cache = SnapshotCache::new(Duration::from_secs(60));
        let mut table = controller();

        cache
            .refresh(key(), &mut table, async { Ok::<_, ()>(vec![log("a"), log("b")]) })
            .await
            .unwrap();

        assert_eq!(table.snapshot().len(), 2);
        let stored: Arc<[EmotionLog]> = cache.get(&key()).await.unwrap();
        assert_eq!(stored.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_last_known() {
        let cache = SnapshotCache::new(Duration::from_secs(60));
        cache
            .refresh(key(), &mut controller(), async { Ok::<_, ()>(vec![log("a")]) })
            .await
            .unwrap();

        let mut table = controller();
        let result = cache
            .refresh(key(), &mut table, async { Err::<Vec<EmotionLog>, _>("db down") })
            .await;

        assert_eq!(result, Err("db down"));
        assert_eq!(table.snapshot().len(), 1);
        assert_eq!(table.snapshot()[0].id.as_str(), "a");
    }

    #[tokio::test]
    async fn test_failed_first_fetch_is_empty() {
        let cache = SnapshotCache::new(Duration::from_secs(60));
        let mut table = controller();
        let result = cache
            .refresh(key(), &mut table, async { Err::<Vec<EmotionLog>, _>(()) })
            .await;

        assert!(result.is_err());
        assert!(table.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_keys_do_not_mix_record_types() {
        let cache = SnapshotCache::new(Duration::from_secs(60));
        cache
            .refresh(key(), &mut controller(), async { Ok::<_, ()>(vec![log("a")]) })
            .await
            .unwrap();

        assert!(cache.get::<UserRecord>(&key()).await.is_none());
        assert!(cache.get::<EmotionLog>(&SnapshotKey::Users).await.is_none());
    }
}
