//! Outcome resolution
//!
//! Maps the terminal snapshot of a task to the verdict reported to the
//! surrounding build: a PASS is a success, a WARN makes the build unstable,
//! everything else (including aborted or cancelled tasks) is a failure.

use std::process::ExitCode;

use taskwatch_core::domain::task::{TaskInfo, TaskResult, TaskStatus};

/// Verdict for a finished task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Unstable,
    Failure,
}

impl Outcome {
    /// Resolves a terminal snapshot without fetching anything again
    pub fn resolve(info: &TaskInfo) -> Self {
        if info.state != TaskStatus::Completed {
            return Self::Failure;
        }

        match info.result {
            Some(TaskResult::Pass) => Self::Success,
            Some(TaskResult::Warn) => Self::Unstable,
            _ => Self::Failure,
        }
    }

    pub fn exit_code(self) -> ExitCode {
        match self {
            Self::Success => ExitCode::SUCCESS,
            Self::Failure => ExitCode::from(1),
            Self::Unstable => ExitCode::from(2),
        }
    }
}
