//! Taskwatch HTTP Client
//!
//! A small, type-safe HTTP client for the remote scheduling service that
//! runs submitted jobs.
//!
//! # Example
//!
//! ```no_run
//! use taskwatch_client::SchedulerClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SchedulerClient::new("http://localhost:8080");
//!
//!     let job = client.submit_job("<job/>").await?;
//!     let info = client.get_task_info(&job.task_id).await?;
//!
//!     println!("{} is {}", job.job_id, info.state);
//!     Ok(())
//! }
//! ```

pub mod error;
mod jobs;
mod tasks;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use taskwatch_core::domain::job::SubmittedJob;
pub use taskwatch_core::domain::task::TaskInfo;

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the scheduling service API
///
/// Endpoints are grouped by concern:
/// - Job submission
/// - Task status queries
#[derive(Debug, Clone)]
pub struct SchedulerClient {
    /// Base URL of the service (e.g., "http://localhost:8080")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl SchedulerClient {
    /// Create a new scheduler client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the service (e.g., "http://localhost:8080")
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new scheduler client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use taskwatch_client::SchedulerClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(30))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = SchedulerClient::with_client("http://localhost:8080", http_client);
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Create a scheduler client whose requests give up after `timeout`
    ///
    /// # Errors
    /// Returns [`ClientError::RequestFailed`] if the HTTP client cannot be built.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, client))
    }

    /// Get the base URL of the service
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Check the status code and deserialize the JSON body
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}
