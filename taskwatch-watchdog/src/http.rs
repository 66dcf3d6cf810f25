//! HTTP-backed remote task
//!
//! Bridges the async [`SchedulerClient`] to the synchronous [`RemoteTask`]
//! seam. Fetches are driven to completion on a tokio runtime through its
//! [`Handle`], so `fetch_status` must be called from a thread that is not
//! itself running inside that runtime (the schedule's polling thread is
//! such a thread).
//!
//! Every fetch is bounded by a timeout. Cancelling the schedule joins the
//! polling thread, so an unanswered request would otherwise hold up an
//! interrupted wait indefinitely.

use std::time::Duration;

use anyhow::Context;
use taskwatch_client::SchedulerClient;
use taskwatch_core::domain::task::TaskInfo;
use tokio::runtime::Handle;

use crate::remote::RemoteTask;

/// Default upper bound on a single status fetch
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// A task on the remote scheduling service, addressed over HTTP
#[derive(Debug, Clone)]
pub struct HttpTask {
    client: SchedulerClient,
    task_id: String,
    runtime: Handle,
    timeout: Duration,
}

impl HttpTask {
    pub fn new(client: SchedulerClient, task_id: impl Into<String>, runtime: Handle) -> Self {
        Self {
            client,
            task_id: task_id.into(),
            runtime,
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Sets the upper bound on a single status fetch
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl RemoteTask for HttpTask {
    fn id(&self) -> &str {
        &self.task_id
    }

    fn fetch_status(&self) -> anyhow::Result<TaskInfo> {
        // The timer has to be created inside the runtime context
        let fetched = self
            .runtime
            .block_on(async {
                tokio::time::timeout(self.timeout, self.client.get_task_info(&self.task_id)).await
            })
            .with_context(|| {
                format!(
                    "Timed out after {:?} fetching status of task {}",
                    self.timeout, self.task_id
                )
            })?;

        let info =
            fetched.with_context(|| format!("Failed to fetch status of task {}", self.task_id))?;
        Ok(info)
    }
}
