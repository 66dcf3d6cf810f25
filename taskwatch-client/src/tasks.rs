//! Task status endpoints

use crate::SchedulerClient;
use crate::error::Result;
use taskwatch_core::domain::task::TaskInfo;
use tracing::debug;

impl SchedulerClient {
    /// Fetch a point-in-time status snapshot of a task
    ///
    /// Read-only on the service side, so it is safe to retry.
    ///
    /// # Arguments
    /// * `task_id` - The task identifier returned on submission
    pub async fn get_task_info(&self, task_id: &str) -> Result<TaskInfo> {
        let url = format!("{}/api/tasks/{}", self.base_url, task_id);
        debug!("Fetching task info from {}", url);

        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }
}
