//! Terminal output helpers

use colored::*;
use taskwatch_core::domain::task::{TaskResult, TaskStatus};
use taskwatch_watchdog::Completion;

use crate::outcome::Outcome;

/// Print the terminal snapshot of a finished task
pub fn print_completion(completion: &Completion) {
    let info = &completion.info;

    println!("{}", "Task Finished:".bold());
    println!("  ID:        {}", info.id.cyan());
    println!(
        "  Status:    {} (was {})",
        colorize_status(info.state),
        completion.previous_status.to_string().dimmed()
    );
    match info.result {
        Some(result) => println!("  Result:    {}", colorize_result(result)),
        None => println!("  Result:    {}", "none".dimmed()),
    }
    if let Some(worker) = &info.worker {
        println!("  Worker:    {}", worker.name);
    }
    println!(
        "  Observed:  {}",
        info.observed_at.format("%Y-%m-%d %H:%M:%S").to_string().dimmed()
    );
    println!(
        "  Polls:     {} ok, {} failed",
        completion.stats.succeeded, completion.stats.failed
    );
    if completion.schedule_restarts > 0 {
        println!(
            "  {}",
            format!("Polling restarted {} time(s)", completion.schedule_restarts).yellow()
        );
    }
}

/// Print the resolved verdict
pub fn print_outcome(outcome: Outcome) {
    match outcome {
        Outcome::Success => println!("{}", "✓ Job passed".green()),
        Outcome::Unstable => println!("{}", "⚠ Job finished with warnings".yellow()),
        Outcome::Failure => println!("{}", "✗ Job failed".red()),
    }
}

/// Colorize task status for display
fn colorize_status(status: TaskStatus) -> ColoredString {
    let status_str = status.to_string();
    match status {
        TaskStatus::Completed => status_str.green(),
        TaskStatus::Aborted => status_str.red(),
        TaskStatus::Cancelled => status_str.dimmed(),
        TaskStatus::Running => status_str.cyan(),
        _ => status_str.yellow(),
    }
}

/// Colorize task result for display
fn colorize_result(result: TaskResult) -> ColoredString {
    let result_str = result.to_string();
    match result {
        TaskResult::Pass => result_str.green(),
        TaskResult::Warn => result_str.yellow(),
        TaskResult::Fail | TaskResult::Panic => result_str.red(),
        TaskResult::None | TaskResult::Skip => result_str.dimmed(),
    }
}
