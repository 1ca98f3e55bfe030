//! Database migration command.
//!
//! Migrations live in `crates/dashboard/migrations/` and are embedded at
//! compile time.

use super::{CommandError, connect};

/// Run dashboard database migrations.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running dashboard migrations...");
    sqlx::migrate!("../dashboard/migrations").run(&pool).await?;

    tracing::info!("Dashboard migrations complete!");
    Ok(())
}
