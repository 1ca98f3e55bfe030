//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;
use thiserror::Error;

use crate::config::DashboardConfig;
use crate::identity::{IdentityClient, IdentityError};
use crate::inference::{InferenceClient, InferenceError};
use crate::services::SnapshotCache;

/// Errors building the application state.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("inference client: {0}")]
    Inference(#[from] InferenceError),
    #[error("identity client: {0}")]
    Identity(#[from] IdentityError),
}

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: DashboardConfig,
    pool: PgPool,
    inference: InferenceClient,
    identity: IdentityClient,
    snapshots: SnapshotCache,
}

impl AppState {
    /// Create application state, building the service clients from `config`.
    ///
    /// # Errors
    ///
    /// Returns `StateError` if a service client cannot be built.
    pub fn new(config: DashboardConfig, pool: PgPool) -> Result<Self, StateError> {
        let inference = InferenceClient::new(&config.inference)?;
        let identity = IdentityClient::new(&config.identity)?;
        let snapshots = SnapshotCache::new(config.snapshot_ttl);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                inference,
                identity,
                snapshots,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn inference(&self) -> &InferenceClient {
        &self.inner.inference
    }

    #[must_use]
    pub fn identity(&self) -> &IdentityClient {
        &self.inner.identity
    }

    #[must_use]
    pub fn snapshots(&self) -> &SnapshotCache {
        &self.inner.snapshots
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.inner.config)
            .field("inference", &self.inner.inference)
            .field("identity", &self.inner.identity)
            .finish_non_exhaustive()
    }
}
