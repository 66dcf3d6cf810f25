//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod submit;
mod watch;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use taskwatch_client::SchedulerClient;
use taskwatch_core::domain::task::TaskStatus;
use taskwatch_watchdog::{
    DEFAULT_FETCH_TIMEOUT, HttpTask, Interrupt, WaitError, wait_for_completion,
};
use tokio::runtime::Handle;
use tracing::warn;

use crate::config::Config;
use crate::display::{print_completion, print_outcome};
use crate::outcome::Outcome;

/// Exit code used when the wait is interrupted
const EXIT_ABANDONED: u8 = 130;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Submit a job and wait for it to finish
    Submit(submit::SubmitArgs),
    /// Wait for an already submitted task to finish
    Watch(watch::WatchArgs),
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
///
/// # Returns
/// The process exit code derived from the task outcome
pub async fn handle_command(command: Commands, config: &Config) -> Result<ExitCode> {
    let client = SchedulerClient::with_timeout(&config.scheduler_url, DEFAULT_FETCH_TIMEOUT)
        .context("Failed to create scheduler client")?;

    match command {
        Commands::Submit(args) => submit::handle_submit(args, client, config).await,
        Commands::Watch(args) => watch::handle_watch(args, client, config).await,
    }
}

/// Blocks until the task finishes, then prints and resolves its outcome
///
/// The wait runs on a blocking thread; Ctrl-C abandons it once any
/// in-flight status fetch has returned or timed out.
async fn wait_and_report(
    client: SchedulerClient,
    task_id: &str,
    initial: TaskStatus,
    config: &Config,
) -> Result<ExitCode> {
    let task = HttpTask::new(client, task_id, Handle::current());
    let interrupt = Interrupt::new();
    let wait_config = config.wait.clone();

    let ctrl_c = {
        let interrupt = interrupt.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, abandoning wait");
                interrupt.trigger();
            }
        })
    };

    println!(
        "{} Waiting for task {} (first check in {:?}, then every {:?})",
        "▸".cyan(),
        task_id.bold(),
        wait_config.delay,
        wait_config.period
    );

    let result = tokio::task::spawn_blocking(move || {
        wait_for_completion(task, initial, &wait_config, &interrupt)
    })
    .await
    .context("Wait thread panicked")?;

    ctrl_c.abort();

    match result {
        Ok(completion) => {
            print_completion(&completion);
            let outcome = Outcome::resolve(&completion.info);
            print_outcome(outcome);
            Ok(outcome.exit_code())
        }
        Err(WaitError::Abandoned { task, last_status }) => {
            println!(
                "{}",
                format!("Stopped waiting for task {} (last status {})", task, last_status).yellow()
            );
            Ok(ExitCode::from(EXIT_ABANDONED))
        }
        Err(e) => Err(e).context("Failed to wait for task completion"),
    }
}
