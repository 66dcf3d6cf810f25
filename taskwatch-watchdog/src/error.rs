//! Error types for the completion waiter

use taskwatch_core::domain::task::TaskStatus;
use thiserror::Error;

/// Errors surfaced to the caller of [`crate::wait_for_completion`]
///
/// Poll failures never show up here; they are logged and retried by the
/// next scheduled poll.
#[derive(Debug, Error)]
pub enum WaitError {
    /// The caller interrupted the wait before the task finished
    #[error("wait for task {task} was abandoned (last status {last_status})")]
    Abandoned {
        task: String,
        last_status: TaskStatus,
    },

    /// The wait configuration cannot drive a schedule
    #[error("invalid wait configuration: {0}")]
    InvalidConfig(String),

    /// The polling thread could not be started
    #[error("failed to start status polling: {0}")]
    Schedule(#[from] std::io::Error),
}

impl WaitError {
    pub fn is_abandoned(&self) -> bool {
        matches!(self, Self::Abandoned { .. })
    }
}
