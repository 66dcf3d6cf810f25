//! Taskwatch CLI
//!
//! Submits jobs to a remote scheduling service and blocks until they finish,
//! exiting with a code that reflects the job's outcome:
//! 0 passed, 1 failed, 2 finished with warnings, 130 interrupted.

mod commands;
mod config;
mod display;
mod job_source;
mod outcome;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "taskwatch")]
#[command(about = "Submit jobs to a remote scheduler and wait for them", long_about = None)]
struct Cli {
    /// Scheduling service URL
    #[arg(
        long,
        env = "TASKWATCH_SCHEDULER_URL",
        default_value = "http://localhost:8080"
    )]
    scheduler_url: String,

    /// Delay before the first status check, in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Period between status checks, in milliseconds
    #[arg(long)]
    period_ms: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskwatch=info,taskwatch_watchdog=info,taskwatch_client=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config::new(cli.scheduler_url, cli.delay_ms, cli.period_ms)?;

    handle_command(cli.command, &config).await
}
