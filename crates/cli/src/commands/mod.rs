//! Command implementations.
//!
//! # Environment Variables
//!
//! - `DASHBOARD_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

pub mod analyze;
pub mod migrate;
pub mod seed;
pub mod stats;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use ser_core::audio::AudioError;
use ser_dashboard::db::RepositoryError;
use ser_dashboard::inference::InferenceError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Invalid argument value.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Repository operation failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Audio file was rejected.
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    /// Inference service call failed.
    #[error("Inference error: {0}")]
    Inference(#[from] InferenceError),

    /// File could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Connect to the dashboard database.
pub async fn connect() -> Result<PgPool, CommandError> {
    let database_url = std::env::var("DASHBOARD_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("DASHBOARD_DATABASE_URL"))?;

    tracing::info!("Connecting to dashboard database...");
    Ok(ser_dashboard::db::create_pool(&database_url).await?)
}
