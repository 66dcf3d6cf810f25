//! Taskwatch Watchdog
//!
//! Blocks a synchronous caller until a job running on a remote scheduling
//! service reaches a terminal state.
//!
//! Architecture:
//! - Remote: the [`RemoteTask`] seam through which status snapshots are fetched
//! - Watchdog: samples the remote status and wakes waiters on transitions
//! - Schedule: a dedicated thread that runs the watchdog on a delay/period timer
//! - Waiter: owns the schedule for one blocking wait and recovers it if it dies
//! - Config: delay, period and re-check interval, overridable from the environment

pub mod config;
pub mod error;
pub mod http;
pub mod remote;
pub mod schedule;
pub mod waiter;
pub mod watchdog;

pub use config::WaitConfig;
pub use error::WaitError;
pub use http::{DEFAULT_FETCH_TIMEOUT, HttpTask};
pub use remote::RemoteTask;
pub use schedule::RecurringSchedule;
pub use waiter::{Completion, Interrupt, wait_for_completion};
pub use watchdog::{PollStats, Watchdog};
