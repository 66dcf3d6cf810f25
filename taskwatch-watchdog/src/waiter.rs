//! Completion waiter
//!
//! Blocks the calling thread until a remote task finishes. The waiter owns a
//! [`Watchdog`] and the [`RecurringSchedule`] that polls it; both live exactly
//! as long as the call, and the schedule is cancelled on every exit path.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use taskwatch_core::domain::task::{TaskInfo, TaskResult, TaskStatus};
use tracing::{error, info, warn};

use crate::config::WaitConfig;
use crate::error::WaitError;
use crate::remote::RemoteTask;
use crate::schedule::RecurringSchedule;
use crate::watchdog::{PollStats, Watchdog};

/// Outcome of a wait that ended with the task finished
#[derive(Debug, Clone)]
pub struct Completion {
    /// Snapshot that reported the task finished
    pub info: TaskInfo,
    /// State the task was in before its final transition
    pub previous_status: TaskStatus,
    pub stats: PollStats,
    /// How many times a dead polling thread had to be restarted
    pub schedule_restarts: u32,
}

impl Completion {
    pub fn status(&self) -> TaskStatus {
        self.info.state
    }

    pub fn result(&self) -> Option<TaskResult> {
        self.info.result
    }
}

/// Cooperative interruption of a blocked wait
///
/// Clones share one flag, so a signal handler or another thread can hold a
/// clone and abandon the wait. The waiter notices within one re-check
/// interval.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    flag: Arc<AtomicBool>,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Blocks until `task` finishes and returns its terminal snapshot
///
/// `initial` is the state the task is known to be in right after
/// submission. The first poll happens after `config.delay`, the following
/// ones every `config.period`. Aborted or cancelled tasks are returned like
/// any other finished task; deciding whether that is a failure is up to the
/// caller.
///
/// # Errors
/// - [`WaitError::InvalidConfig`] if `config` has a zero period or re-check interval
/// - [`WaitError::Abandoned`] if `interrupt` is triggered before the task finishes
/// - [`WaitError::Schedule`] if the polling thread cannot be started
pub fn wait_for_completion<T>(
    task: T,
    initial: TaskStatus,
    config: &WaitConfig,
    interrupt: &Interrupt,
) -> Result<Completion, WaitError>
where
    T: RemoteTask + 'static,
{
    let watchdog = Arc::new(Watchdog::new(task, initial));
    supervise(watchdog, config, interrupt, |w: &Watchdog<T>| w.poll())
}

/// Runs `poll` on a schedule against `watchdog` until the task finishes
///
/// Restarts the schedule with no delay whenever its thread is found dead.
fn supervise<T, P>(
    watchdog: Arc<Watchdog<T>>,
    config: &WaitConfig,
    interrupt: &Interrupt,
    poll: P,
) -> Result<Completion, WaitError>
where
    T: RemoteTask + 'static,
    P: Fn(&Watchdog<T>) + Send + Sync + 'static,
{
    config
        .validate()
        .map_err(|e| WaitError::InvalidConfig(e.to_string()))?;

    let task_id = watchdog.task().id().to_string();
    let poll = Arc::new(poll);

    info!(
        "Waiting for task {} to finish (delay: {:?}, period: {:?})",
        task_id, config.delay, config.period
    );

    let mut schedule = start_polling(&watchdog, &poll, &task_id, config.delay, config.period)?;
    let mut restarts = 0;

    let mut state = watchdog.lock_state();
    loop {
        if let Some(info) = state.terminal.clone() {
            let previous_status = state.previous;
            drop(state);
            schedule.cancel();

            info!(
                "Task {} finished: {} ({})",
                task_id,
                info.state,
                info.result.map(|r| r.as_str()).unwrap_or("no result")
            );

            return Ok(Completion {
                info,
                previous_status,
                stats: watchdog.stats(),
                schedule_restarts: restarts,
            });
        }

        if interrupt.is_triggered() {
            let last_status = state.status;
            drop(state);
            schedule.cancel();

            warn!("Wait for task {} abandoned in state {}", task_id, last_status);
            return Err(WaitError::Abandoned {
                task: task_id,
                last_status,
            });
        }

        if !schedule.is_running() {
            drop(state);
            restarts += 1;
            error!(
                "Status polling for task {} stopped unexpectedly, restarting (restart #{})",
                task_id, restarts
            );
            schedule = start_polling(&watchdog, &poll, &task_id, Duration::ZERO, config.period)?;
            state = watchdog.lock_state();
            continue;
        }

        state = watchdog.wait_timeout(state, config.recheck_interval);
    }
}

fn start_polling<T, P>(
    watchdog: &Arc<Watchdog<T>>,
    poll: &Arc<P>,
    task_id: &str,
    delay: Duration,
    period: Duration,
) -> std::io::Result<RecurringSchedule>
where
    T: RemoteTask + 'static,
    P: Fn(&Watchdog<T>) + Send + Sync + 'static,
{
    let watchdog = Arc::clone(watchdog);
    let poll = Arc::clone(poll);
    RecurringSchedule::start(
        format!("taskwatch-{}", task_id),
        delay,
        period,
        move || poll(&*watchdog),
    )
}
