//! Recurring schedule
//!
//! Runs a job on a dedicated named thread: once after an initial delay, then
//! at a fixed rate. Runs never overlap. A job that panics ends the thread and
//! with it every future run, which [`RecurringSchedule::is_running`] exposes
//! so that owners can restart it.

use std::io;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

/// Stand-in for deadlines too far away to be represented (about 30 years)
const FAR_FUTURE: Duration = Duration::from_secs(30 * 365 * 24 * 60 * 60);

/// Handle to a running recurring job
///
/// Dropping the handle cancels the schedule and waits for an in-flight run
/// to return.
pub struct RecurringSchedule {
    name: String,
    cancel: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl RecurringSchedule {
    /// Starts running `job` after `delay`, then every `period`
    ///
    /// # Errors
    /// Returns `InvalidInput` for a zero period, or the spawn error if the
    /// thread could not be created.
    pub fn start<F>(
        name: impl Into<String>,
        delay: Duration,
        period: Duration,
        mut job: F,
    ) -> io::Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        if period.is_zero() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "schedule period must be greater than 0",
            ));
        }

        let name = name.into();
        let (cancel, cancelled) = mpsc::channel::<()>();

        let handle = thread::Builder::new().name(name.clone()).spawn(move || {
            let mut next = deadline_after(Instant::now(), delay);

            loop {
                let wait = next.saturating_duration_since(Instant::now());
                match cancelled.recv_timeout(wait) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }

                job();

                // Fixed rate, but a run that overshoots does not cause a burst
                next = deadline_after(next, period);
                let now = Instant::now();
                if next < now {
                    next = now;
                }
            }
        })?;

        debug!(
            "Started schedule {} (delay: {:?}, period: {:?})",
            name, delay, period
        );

        Ok(Self {
            name,
            cancel: Some(cancel),
            handle: Some(handle),
        })
    }

    /// Whether the schedule thread is still alive
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stops future runs and waits for the thread to exit
    ///
    /// Safe to call any number of times, including after the thread has
    /// already stopped on its own.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            // The receiver is gone if the thread already died.
            let _ = cancel.send(());
        }

        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Schedule {} had stopped after a job panicked", self.name);
            } else {
                debug!("Schedule {} cancelled", self.name);
            }
        }
    }
}

/// `from + after`, saturating at a far-future instant instead of overflowing
fn deadline_after(from: Instant, after: Duration) -> Instant {
    from.checked_add(after)
        .or_else(|| from.checked_add(FAR_FUTURE))
        .unwrap_or(from)
}

impl Drop for RecurringSchedule {
    fn drop(&mut self) {
        self.cancel();
    }
}
