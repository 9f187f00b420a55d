//! feedkit command line client
//!
//! Submits, votes on and syncs feedback using the same local store the
//! library uses. Configuration comes from the environment (see
//! `client::config::Config`), optionally from a `.env` file.

use clap::{Parser, Subcommand};
use feedkit::client::{Config, FeedbackProvider, LocalDatabase, NetworkMonitor, VoteOutcome};
use feedkit::shared::{FeedbackExtra, FeedbackMetadata, FeedbackType, NotificationLevel};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "feedkit-cli")]
#[command(about = "Submit, vote on and sync feedback")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// SQLite file holding pending feedback
    #[arg(long, env = "FEEDKIT_DB")]
    db: Option<PathBuf>,

    /// Queue instead of sending
    #[arg(long)]
    offline: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit new feedback
    Submit {
        /// bug, feature, improvement or other
        feedback_type: FeedbackType,

        message: String,

        #[arg(long)]
        category: Option<String>,

        /// Contact address passed along with the feedback
        #[arg(long)]
        email: Option<String>,
    },

    /// Send everything that is queued
    Sync,

    /// Show queued feedback
    List,

    /// Vote for a feedback entry
    Vote { id: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    let db = match &cli.db {
        Some(path) => LocalDatabase::open(path).await?,
        None => LocalDatabase::new().await?,
    };

    let provider = FeedbackProvider::builder(config)
        .store(Arc::new(db))
        .monitor(NetworkMonitor::new(!cli.offline))
        .auto_sync(false)
        .build_restored()
        .await?;

    let mut notifications = provider.notifications();
    let result = run(&provider, cli.command).await;

    while let Ok(notification) = notifications.try_recv() {
        let tag = match notification.level {
            NotificationLevel::Info => "info",
            NotificationLevel::Success => "ok",
            NotificationLevel::Error => "error",
        };
        println!("[{}] {}", tag, notification.message);
    }

    result
}

async fn run(provider: &FeedbackProvider, command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Submit {
            feedback_type,
            message,
            category,
            email,
        } => {
            let extra = FeedbackExtra {
                category,
                metadata: email.map(|email| FeedbackMetadata {
                    email: Some(email),
                    ..FeedbackMetadata::default()
                }),
                ..FeedbackExtra::default()
            };
            let record = provider.submit_feedback(&message, feedback_type, extra).await?;
            println!("{} {}", record.id, record.submission_status);
        }
        Commands::Sync => {
            let report = provider.sync_pending().await;
            println!(
                "attempted {} synced {} failed {} skipped {} votes {}",
                report.attempted, report.synced, report.failed, report.skipped, report.votes_replayed
            );
        }
        Commands::List => {
            let records = provider.feedbacks().await;
            if records.is_empty() {
                println!("No queued feedback");
            }
            for record in records {
                println!(
                    "{}  {:<8} attempts={} votes={}  {}",
                    record.id,
                    record.submission_status,
                    record.sync_attempts,
                    record.votes,
                    record.title()
                );
                if let Some(error) = &record.last_error {
                    println!("    last error: {}", error);
                }
            }
        }
        Commands::Vote { id } => match provider.vote_feedback(&id).await? {
            VoteOutcome::Applied => println!("voted"),
            VoteOutcome::AlreadyVoted => println!("already voted"),
            VoteOutcome::NotFound => println!("not found"),
        },
    }
    Ok(())
}
