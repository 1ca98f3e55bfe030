//! SER CLI - database migrations, demo data and inference checks.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! ser-cli migrate
//!
//! # Insert two weeks of random analyses for two users
//! ser-cli seed --user user_a --user user_b --days 14 --per-day 3
//!
//! # Classify a WAV file with the inference service
//! ser-cli analyze recording.wav
//!
//! # Print the emotion distribution and daily active users
//! ser-cli stats
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "ser-cli")]
#[command(author, version, about = "SER dashboard CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Insert random demo analyses
    Seed {
        /// User id to seed (repeatable)
        #[arg(short, long = "user", required = true)]
        users: Vec<String>,

        /// Number of days back from today to cover
        #[arg(short, long, default_value_t = 14)]
        days: u32,

        /// Analyses per user per day
        #[arg(short, long, default_value_t = 3)]
        per_day: u32,
    },
    /// Validate a WAV file and classify it with the inference service
    Analyze {
        /// Path to a WAV file
        file: PathBuf,

        /// Inference service base URL
        #[arg(long, env = "INFERENCE_URL", default_value = "http://127.0.0.1:8000")]
        inference_url: String,

        /// Request timeout in seconds
        #[arg(long, env = "INFERENCE_TIMEOUT_SECS", default_value_t = 60)]
        timeout_secs: u64,
    },
    /// Print the emotion distribution and daily active users
    Stats {
        /// Offset from UTC used to bucket days, in minutes
        #[arg(long, env = "DASHBOARD_UTC_OFFSET_MINUTES", default_value_t = 0)]
        utc_offset_minutes: i32,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ser_cli=info,ser_dashboard=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await,
        Commands::Seed {
            users,
            days,
            per_day,
        } => commands::seed::run(&users, days, per_day).await,
        Commands::Analyze {
            file,
            inference_url,
            timeout_secs,
        } => commands::analyze::run(&file, &inference_url, timeout_secs).await,
        Commands::Stats { utc_offset_minutes } => commands::stats::run(utc_offset_minutes).await,
    }
}
