//! Watch command
//!
//! Waits for a task that was submitted earlier.

use std::process::ExitCode;

use anyhow::{Result, bail};
use clap::Args;
use taskwatch_client::SchedulerClient;
use taskwatch_core::domain::task::TaskStatus;
use tracing::warn;

use crate::config::Config;

/// Arguments of the watch command
#[derive(Args)]
pub struct WatchArgs {
    /// Task identifier returned on submission (e.g. T:1001)
    task_id: String,

    /// Last known state of the task (e.g. queued, running)
    #[arg(long, default_value = "new", value_parser = parse_status)]
    initial_state: TaskStatus,
}

fn parse_status(s: &str) -> Result<TaskStatus> {
    let status = serde_json::from_value(serde_json::Value::String(s.to_lowercase()))
        .map_err(|_| anyhow::anyhow!("unknown task state `{}`", s))?;
    Ok(status)
}

/// Handle the watch command
///
/// An unknown task id fails fast instead of being polled forever. Any other
/// lookup failure is left to the retrying waiter.
pub async fn handle_watch(
    args: WatchArgs,
    client: SchedulerClient,
    config: &Config,
) -> Result<ExitCode> {
    match client.get_task_info(&args.task_id).await {
        Err(e) if e.is_not_found() => bail!("Task {} not found", args.task_id),
        Err(e) => warn!("Could not look up task {}: {}", args.task_id, e),
        Ok(_) => {}
    }

    super::wait_and_report(client, &args.task_id, args.initial_state, config).await
}
