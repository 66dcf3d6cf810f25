//! Remote task handle
//!
//! The only way the watchdog learns anything about a job is through this
//! trait, which keeps the polling logic independent of the transport.

use std::sync::Arc;
use taskwatch_core::domain::task::TaskInfo;

/// Handle to a job already accepted by the remote scheduling service
///
/// `fetch_status` must be idempotent: it is retried on every schedule tick
/// and must not change anything on the remote side.
pub trait RemoteTask: Send + Sync {
    /// Identifier used in logs and errors
    fn id(&self) -> &str;

    /// Fetches a fresh status snapshot
    fn fetch_status(&self) -> anyhow::Result<TaskInfo>;
}

impl<T: RemoteTask + ?Sized> RemoteTask for Arc<T> {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn fetch_status(&self) -> anyhow::Result<TaskInfo> {
        (**self).fetch_status()
    }
}

impl<T: RemoteTask + ?Sized> RemoteTask for Box<T> {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn fetch_status(&self) -> anyhow::Result<TaskInfo> {
        (**self).fetch_status()
    }
}
