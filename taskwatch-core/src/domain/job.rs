//! Submitted job types

use serde::{Deserialize, Serialize};

/// A job accepted by the remote scheduling service
///
/// Returned by the service on submission. The `task_id` addresses the
/// task whose status is polled until the job finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedJob {
    /// Service-side job identifier (e.g. "J:42")
    pub job_id: String,
    /// Numeric part of the job identifier
    pub job_number: u64,
    /// Identifier of the task to monitor (e.g. "T:1001")
    pub task_id: String,
}
