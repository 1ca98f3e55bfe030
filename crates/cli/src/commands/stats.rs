//! Print dashboard aggregates.

use chrono::FixedOffset;

use ser_dashboard::db::AnalysisRepository;
use ser_dashboard::services::stats;

use super::{CommandError, connect};

/// Print the emotion distribution and the trailing week of daily active users.
pub async fn run(utc_offset_minutes: i32) -> Result<(), CommandError> {
    let offset = utc_offset_minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| {
            CommandError::InvalidArgument(format!("UTC offset {utc_offset_minutes} minutes"))
        })?;

    let pool = connect().await?;
    let total = AnalysisRepository::new(&pool).count().await?;
    let distribution = stats::emotion_distribution(&pool).await;
    let daily = stats::daily_active_users(&pool, offset).await;

    #[allow(clippy::print_stdout)]
    {
        println!("Analyses: {total}");
        println!();
        println!("Emotion distribution");
        for summary in &distribution {
            println!("  {:<10} {:>6}", summary.emotion.label(), summary.count);
        }
        println!();
        println!("Daily active users");
        for day in &daily {
            println!("  {:<10} {:>6}", day.date, day.users);
        }
    }
    Ok(())
}
