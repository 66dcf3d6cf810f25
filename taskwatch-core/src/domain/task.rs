//! Task domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a remote task
///
/// The vocabulary is the remote service's. Only [`TaskStatus::is_terminal`]
/// matters for control flow; the variants carry no other ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    New,
    Scheduled,
    Queued,
    Processed,
    Waiting,
    Installing,
    Reserved,
    Running,
    Cancelled,
    Aborted,
    Completed,
}

impl TaskStatus {
    /// Whether no further transitions can follow this state
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::Aborted | Self::Completed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Scheduled => "SCHEDULED",
            Self::Queued => "QUEUED",
            Self::Processed => "PROCESSED",
            Self::Waiting => "WAITING",
            Self::Installing => "INSTALLING",
            Self::Reserved => "RESERVED",
            Self::Running => "RUNNING",
            Self::Cancelled => "CANCELLED",
            Self::Aborted => "ABORTED",
            Self::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome code reported once a task has finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskResult {
    Pass,
    Warn,
    Fail,
    Panic,
    None,
    Skip,
}

impl TaskResult {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Warn => "WARN",
            Self::Fail => "FAIL",
            Self::Panic => "PANIC",
            Self::None => "NONE",
            Self::Skip => "SKIP",
        }
    }
}

impl fmt::Display for TaskResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Execution agent a task ran on (diagnostic only)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    pub name: String,
}

/// Point-in-time status snapshot of a remote task
///
/// Produced fresh by every status fetch and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskInfo {
    pub id: String,
    pub state: TaskStatus,
    pub finished: bool,
    /// Present only once `finished` is true
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<TaskResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker: Option<Worker>,
    #[serde(default = "Utc::now")]
    pub observed_at: DateTime<Utc>,
}

impl TaskInfo {
    /// Snapshot of a task that has not finished yet
    pub fn in_progress(id: impl Into<String>, state: TaskStatus) -> Self {
        Self {
            id: id.into(),
            state,
            finished: false,
            result: None,
            worker: None,
            observed_at: Utc::now(),
        }
    }

    /// Snapshot of a finished task
    pub fn finished(id: impl Into<String>, state: TaskStatus, result: Option<TaskResult>) -> Self {
        Self {
            id: id.into(),
            state,
            finished: true,
            result,
            worker: None,
            observed_at: Utc::now(),
        }
    }

    pub fn with_worker(mut self, name: impl Into<String>) -> Self {
        self.worker = Some(Worker { name: name.into() });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Aborted.is_terminal());
        assert!(TaskStatus::Cancelled.is_terminal());
        assert!(!TaskStatus::New.is_terminal());
        assert!(!TaskStatus::Running.is_terminal());
        assert!(!TaskStatus::Waiting.is_terminal());
    }

    #[test]
    fn test_decode_service_payload() {
        let payload = r#"{
            "id": "T:42",
            "state": "completed",
            "finished": true,
            "result": "pass",
            "worker": { "name": "lab-01.example.com" }
        }"#;

        let info: TaskInfo = serde_json::from_str(payload).unwrap();
        assert_eq!(info.id, "T:42");
        assert_eq!(info.state, TaskStatus::Completed);
        assert!(info.finished);
        assert_eq!(info.result, Some(TaskResult::Pass));
        assert_eq!(info.worker.unwrap().name, "lab-01.example.com");
    }

    #[test]
    fn test_decode_running_payload_without_result() {
        let payload = r#"{ "id": "T:7", "state": "running", "finished": false }"#;

        let info: TaskInfo = serde_json::from_str(payload).unwrap();
        assert_eq!(info.state, TaskStatus::Running);
        assert!(!info.finished);
        assert!(info.result.is_none());
        assert!(info.worker.is_none());
    }

    #[test]
    fn test_unknown_state_is_rejected() {
        let payload = r#"{ "id": "T:7", "state": "exploded", "finished": false }"#;
        assert!(serde_json::from_str::<TaskInfo>(payload).is_err());
    }

    #[test]
    fn test_display_labels() {
        assert_eq!(TaskStatus::Completed.to_string(), "COMPLETED");
        assert_eq!(TaskResult::Panic.to_string(), "PANIC");
    }

    #[test]
    fn test_constructors() {
        let running = TaskInfo::in_progress("T:1", TaskStatus::Running).with_worker("host");
        assert!(!running.finished);
        assert_eq!(running.worker, Some(Worker { name: "host".to_string() }));

        let done = TaskInfo::finished("T:1", TaskStatus::Aborted, None);
        assert!(done.finished);
        assert!(done.result.is_none());
    }
}
