//! Submit command
//!
//! Reads a job description, submits it to the scheduling service and waits
//! for the resulting task to finish.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use taskwatch_client::SchedulerClient;
use taskwatch_core::domain::task::TaskStatus;
use tracing::info;

use crate::config::Config;
use crate::job_source::JobSource;

/// Arguments of the submit command
#[derive(Args)]
pub struct SubmitArgs {
    /// Job XML given inline
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    job: Option<String>,

    /// Job file, relative to the workspace
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Workspace directory job files are read from
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Extra variables for ${NAME} expansion as key=value pairs
    #[arg(short = 'D', long = "var", value_parser = parse_key_val)]
    vars: Vec<(String, String)>,

    /// Print the submitted job and return without waiting
    #[arg(long)]
    no_wait: bool,
}

impl SubmitArgs {
    fn source(&self) -> JobSource {
        match (&self.job, &self.file) {
            (Some(xml), _) => JobSource::Inline(xml.clone()),
            (None, Some(path)) => JobSource::File(path.clone()),
            // clap requires one of the two
            (None, None) => JobSource::Inline(String::new()),
        }
    }
}

/// Parse a single key=value pair
fn parse_key_val(s: &str) -> Result<(String, String)> {
    let pos = s
        .find('=')
        .ok_or_else(|| anyhow::anyhow!("invalid KEY=value: no `=` found in `{}`", s))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

/// Handle the submit command
pub async fn handle_submit(
    args: SubmitArgs,
    client: SchedulerClient,
    config: &Config,
) -> Result<ExitCode> {
    let source = args.source();

    // Process environment first, explicit --var pairs win.
    let mut vars: HashMap<String, String> = std::env::vars().collect();
    vars.extend(args.vars.iter().cloned());

    let job_xml = source
        .load(&args.workspace, &vars)
        .with_context(|| format!("Failed to load {}", source.describe()))?;

    info!("Submitting {} ({} bytes)", source.describe(), job_xml.len());
    let job = client
        .submit_job(job_xml)
        .await
        .context("Failed to submit job")?;

    println!(
        "{} Submitted job {} (task {})",
        "✓".green(),
        job.job_id.cyan(),
        job.task_id.dimmed()
    );

    if args.no_wait {
        return Ok(ExitCode::SUCCESS);
    }

    super::wait_and_report(client, &job.task_id, TaskStatus::New, config).await
}
