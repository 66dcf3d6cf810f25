//! Wait configuration
//!
//! Controls how often the remote status is polled while a caller waits.
//! Both the initial delay and the period default to five minutes and can be
//! shrunk from the environment, e.g. to near zero in tests.

use std::time::Duration;
use tracing::warn;

/// Default delay before the first poll, in milliseconds (5 minutes)
pub const DEFAULT_DELAY_MS: u64 = 300_000;

/// Default period between polls, in milliseconds (5 minutes)
pub const DEFAULT_PERIOD_MS: u64 = 300_000;

/// Default interval at which a blocked waiter re-checks on its own
pub const DEFAULT_RECHECK_MS: u64 = 1_000;

pub const DELAY_ENV: &str = "TASKWATCH_DELAY_MS";
pub const PERIOD_ENV: &str = "TASKWATCH_PERIOD_MS";
pub const RECHECK_ENV: &str = "TASKWATCH_RECHECK_MS";

/// Polling schedule for one completion wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitConfig {
    /// Delay between starting the wait and the first poll
    pub delay: Duration,

    /// Period between subsequent polls
    pub period: Duration,

    /// Upper bound on how long a waiter sleeps without re-checking the
    /// finished flag, the interrupt token and the health of the schedule
    pub recheck_interval: Duration,
}

impl WaitConfig {
    pub fn new(delay: Duration, period: Duration) -> Self {
        Self {
            delay,
            period,
            recheck_interval: Duration::from_millis(DEFAULT_RECHECK_MS),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Recognised variables, all optional and in milliseconds:
    /// - TASKWATCH_DELAY_MS (default: 300000)
    /// - TASKWATCH_PERIOD_MS (default: 300000)
    /// - TASKWATCH_RECHECK_MS (default: 1000)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let millis = |key: &str, default: u64| -> Duration {
            let value = match lookup(key) {
                Some(raw) => match raw.trim().parse::<u64>() {
                    Ok(ms) => ms,
                    Err(_) => {
                        warn!("Ignoring invalid {}={:?}, using {} ms", key, raw, default);
                        default
                    }
                },
                None => default,
            };
            Duration::from_millis(value)
        };

        Self {
            delay: millis(DELAY_ENV, DEFAULT_DELAY_MS),
            period: millis(PERIOD_ENV, DEFAULT_PERIOD_MS),
            recheck_interval: millis(RECHECK_ENV, DEFAULT_RECHECK_MS),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    pub fn with_recheck_interval(mut self, interval: Duration) -> Self {
        self.recheck_interval = interval;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.period.is_zero() {
            anyhow::bail!("poll period must be greater than 0");
        }

        if self.recheck_interval.is_zero() {
            anyhow::bail!("recheck interval must be greater than 0");
        }

        Ok(())
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(DEFAULT_DELAY_MS),
            Duration::from_millis(DEFAULT_PERIOD_MS),
        )
    }
}
