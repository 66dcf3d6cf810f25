//! Configuration module
//!
//! Combines command-line flags with the environment-driven polling settings.

use std::time::Duration;

use anyhow::Result;
use taskwatch_watchdog::WaitConfig;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the remote scheduling service
    pub scheduler_url: String,

    /// Polling schedule used while waiting for a task
    pub wait: WaitConfig,
}

impl Config {
    /// Builds the configuration, letting explicit flags win over the environment
    pub fn new(scheduler_url: String, delay_ms: Option<u64>, period_ms: Option<u64>) -> Result<Self> {
        let mut wait = WaitConfig::from_env();
        if let Some(ms) = delay_ms {
            wait = wait.with_delay(Duration::from_millis(ms));
        }
        if let Some(ms) = period_ms {
            wait = wait.with_period(Duration::from_millis(ms));
        }

        let config = Self {
            scheduler_url,
            wait,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.scheduler_url.starts_with("http://") && !self.scheduler_url.starts_with("https://")
        {
            anyhow::bail!("scheduler_url must start with http:// or https://");
        }

        self.wait.validate()
    }
}
