//! Job submission endpoints

use crate::SchedulerClient;
use crate::error::{ClientError, Result};
use taskwatch_core::domain::job::SubmittedJob;
use taskwatch_core::dto::job::SubmitJob;
use tracing::debug;

impl SchedulerClient {
    /// Schedule a new job from its XML description
    ///
    /// # Arguments
    /// * `job_xml` - The fully expanded job description
    ///
    /// # Returns
    /// The accepted job, including the id of the task to monitor
    pub async fn submit_job(&self, job_xml: impl Into<String>) -> Result<SubmittedJob> {
        let job_xml = job_xml.into();
        if job_xml.trim().is_empty() {
            return Err(ClientError::InvalidRequest(
                "job description is empty".to_string(),
            ));
        }

        let url = format!("{}/api/jobs", self.base_url);
        debug!("Submitting job ({} bytes) to {}", job_xml.len(), url);

        let response = self
            .client
            .post(&url)
            .json(&SubmitJob { job_xml })
            .send()
            .await?;

        self.handle_response(response).await
    }
}
