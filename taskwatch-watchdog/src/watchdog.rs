//! Task watchdog
//!
//! Samples the status of one remote task each time it is polled and keeps
//! the current state, the state before the last transition, and whether the
//! task has finished. Threads blocked in [`Watchdog::wait_for_signal`] (or in
//! the completion waiter) are woken when the state label changes or when the
//! task first reports finished, and at no other time.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use taskwatch_core::domain::task::{TaskInfo, TaskStatus};
use tracing::{debug, error, info, warn};

use crate::remote::RemoteTask;

/// Counters of poll attempts, for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollStats {
    pub succeeded: u64,
    pub failed: u64,
}

/// State shared between the polling thread and waiting threads
///
/// Every field is read and written under the watchdog's single lock.
#[derive(Debug)]
pub(crate) struct WatchState {
    pub(crate) status: TaskStatus,
    pub(crate) previous: TaskStatus,
    /// Snapshot that first reported finished; `Some` means finished
    pub(crate) terminal: Option<TaskInfo>,
    /// Bumped on every notification
    generation: u64,
    stats: PollStats,
}

/// Recurring status poller for a single remote task
pub struct Watchdog<T> {
    task: T,
    state: Mutex<WatchState>,
    signal: Condvar,
}

impl<T: RemoteTask> Watchdog<T> {
    /// Creates a watchdog for `task`, whose last known state is `initial`
    pub fn new(task: T, initial: TaskStatus) -> Self {
        Self {
            task,
            state: Mutex::new(WatchState {
                status: initial,
                previous: initial,
                terminal: None,
                generation: 0,
                stats: PollStats::default(),
            }),
            signal: Condvar::new(),
        }
    }

    pub fn task(&self) -> &T {
        &self.task
    }

    /// Fetches the task status once and records the result
    ///
    /// Never panics and never returns an error: a failed or panicking fetch
    /// is logged and leaves the recorded state untouched, so whatever drives
    /// the poll keeps running and the next tick acts as the retry.
    pub fn poll(&self) {
        if self.is_finished() {
            debug!(task = self.task.id(), "Task already finished, skipping poll");
            return;
        }

        let fetched = panic::catch_unwind(AssertUnwindSafe(|| self.task.fetch_status()));
        let snapshot = match fetched {
            Ok(Ok(snapshot)) => snapshot,
            Ok(Err(e)) => {
                warn!(task = self.task.id(), "Unable to get task info: {:#}", e);
                self.lock_state().stats.failed += 1;
                return;
            }
            Err(payload) => {
                error!(
                    task = self.task.id(),
                    "Task info fetch panicked: {}",
                    panic_message(payload.as_ref())
                );
                self.lock_state().stats.failed += 1;
                return;
            }
        };

        self.record(snapshot);
    }

    fn record(&self, snapshot: TaskInfo) {
        let mut state = self.lock_state();
        state.stats.succeeded += 1;

        let mut wake = false;

        if snapshot.state != state.status {
            info!(
                task = self.task.id(),
                "Task status changed: {} -> {}", state.status, snapshot.state
            );
            state.previous = state.status;
            state.status = snapshot.state;
            wake = true;
        } else {
            debug!(task = self.task.id(), "Task status unchanged: {}", snapshot.state);
        }

        if snapshot.finished && state.terminal.is_none() {
            info!(
                task = self.task.id(),
                "Task finished in state {} with result {}",
                snapshot.state,
                snapshot
                    .result
                    .map(|r| r.as_str())
                    .unwrap_or("<none>")
            );
            if !snapshot.state.is_terminal() {
                warn!(
                    task = self.task.id(),
                    "Task reported finished in non-terminal state {}", snapshot.state
                );
            }
            state.terminal = Some(snapshot);
            wake = true;
        }

        if wake {
            state.generation += 1;
            self.signal.notify_all();
        }
    }

    /// Current state of the task
    pub fn status(&self) -> TaskStatus {
        self.lock_state().status
    }

    /// State before the most recent transition
    pub fn previous_status(&self) -> TaskStatus {
        self.lock_state().previous
    }

    /// Current and previous state, read together
    pub fn transition(&self) -> (TaskStatus, TaskStatus) {
        let state = self.lock_state();
        (state.previous, state.status)
    }

    /// Whether a successful poll has reported the task finished
    pub fn is_finished(&self) -> bool {
        self.lock_state().terminal.is_some()
    }

    /// Snapshot that first reported the task finished
    pub fn terminal_snapshot(&self) -> Option<TaskInfo> {
        self.lock_state().terminal.clone()
    }

    pub fn stats(&self) -> PollStats {
        self.lock_state().stats
    }

    /// Blocks until the next notification or until `timeout` elapses
    ///
    /// Returns `true` if a notification arrived. Spurious condition variable
    /// wakeups are absorbed and do not count.
    pub fn wait_for_signal(&self, timeout: Duration) -> bool {
        let state = self.lock_state();
        let seen = state.generation;
        let (state, _) = self
            .signal
            .wait_timeout_while(state, timeout, |s| s.generation == seen)
            .unwrap_or_else(PoisonError::into_inner);
        state.generation != seen
    }

    /// Waits on the notification channel with an already held guard
    pub(crate) fn wait_timeout<'a>(
        &'a self,
        guard: MutexGuard<'a, WatchState>,
        timeout: Duration,
    ) -> MutexGuard<'a, WatchState> {
        let (guard, _) = self
            .signal
            .wait_timeout(guard, timeout)
            .unwrap_or_else(PoisonError::into_inner);
        guard
    }

    /// Updates are applied whole inside the critical section, so a poisoned
    /// lock still holds a consistent state.
    pub(crate) fn lock_state(&self) -> MutexGuard<'_, WatchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic payload>"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::thread;
    use taskwatch_core::domain::task::TaskResult;

    enum Step {
        Return(TaskInfo),
        Fail(&'static str),
        Panic,
    }

    /// Replays a fixed list of fetch outcomes, repeating the last one
    struct ScriptedTask {
        steps: Mutex<VecDeque<Step>>,
        last: Mutex<Option<TaskInfo>>,
        fetches: Mutex<u32>,
    }

    impl ScriptedTask {
        fn new(steps: Vec<Step>) -> Self {
            Self {
                steps: Mutex::new(steps.into()),
                last: Mutex::new(None),
                fetches: Mutex::new(0),
            }
        }

        fn fetches(&self) -> u32 {
            *self.fetches.lock().unwrap()
        }
    }

    impl RemoteTask for ScriptedTask {
        fn id(&self) -> &str {
            "T:test"
        }

        fn fetch_status(&self) -> anyhow::Result<TaskInfo> {
            *self.fetches.lock().unwrap() += 1;
            let step = self.steps.lock().unwrap().pop_front();
            match step {
                Some(Step::Return(info)) => {
                    *self.last.lock().unwrap() = Some(info.clone());
                    Ok(info)
                }
                Some(Step::Fail(msg)) => Err(anyhow::anyhow!(msg)),
                Some(Step::Panic) => panic!("catastrophic fetch failure"),
                None => self
                    .last
                    .lock()
                    .unwrap()
                    .clone()
                    .ok_or_else(|| anyhow::anyhow!("script exhausted")),
            }
        }
    }

    fn running(state: TaskStatus) -> Step {
        Step::Return(TaskInfo::in_progress("T:test", state))
    }

    fn done(state: TaskStatus, result: Option<TaskResult>) -> Step {
        Step::Return(TaskInfo::finished("T:test", state, result))
    }

    #[test]
    fn test_initial_state() {
        let watchdog = Watchdog::new(ScriptedTask::new(vec![]), TaskStatus::Aborted);

        assert!(!watchdog.is_finished());
        assert_eq!(watchdog.status(), TaskStatus::Aborted);
        assert_eq!(watchdog.previous_status(), TaskStatus::Aborted);
        assert!(watchdog.terminal_snapshot().is_none());
        assert_eq!(watchdog.stats(), PollStats::default());
    }

    #[test]
    fn test_transition_shifts_pair() {
        let watchdog = Watchdog::new(
            ScriptedTask::new(vec![
                running(TaskStatus::Queued),
                running(TaskStatus::Running),
            ]),
            TaskStatus::New,
        );

        watchdog.poll();
        assert_eq!(watchdog.transition(), (TaskStatus::New, TaskStatus::Queued));

        watchdog.poll();
        assert_eq!(
            watchdog.transition(),
            (TaskStatus::Queued, TaskStatus::Running)
        );
        assert!(!watchdog.is_finished());
    }

    #[test]
    fn test_failed_poll_leaves_state_untouched() {
        let watchdog = Watchdog::new(
            ScriptedTask::new(vec![
                running(TaskStatus::Running),
                Step::Fail("connection refused"),
                Step::Panic,
            ]),
            TaskStatus::New,
        );

        watchdog.poll();
        watchdog.poll();
        watchdog.poll();

        assert_eq!(watchdog.status(), TaskStatus::Running);
        assert_eq!(watchdog.previous_status(), TaskStatus::New);
        assert!(!watchdog.is_finished());
        assert_eq!(
            watchdog.stats(),
            PollStats {
                succeeded: 1,
                failed: 2
            }
        );
    }

    #[test]
    fn test_finished_without_label_change_is_recorded() {
        let watchdog = Watchdog::new(
            ScriptedTask::new(vec![done(TaskStatus::Running, None)]),
            TaskStatus::Running,
        );

        watchdog.poll();

        assert!(watchdog.is_finished());
        assert_eq!(watchdog.status(), TaskStatus::Running);
        assert_eq!(watchdog.previous_status(), TaskStatus::Running);
    }

    #[test]
    fn test_finished_flag_is_monotonic() {
        let task = ScriptedTask::new(vec![
            done(TaskStatus::Completed, Some(TaskResult::Pass)),
            running(TaskStatus::Running),
        ]);
        let watchdog = Watchdog::new(task, TaskStatus::New);

        watchdog.poll();
        assert!(watchdog.is_finished());

        watchdog.poll();
        watchdog.poll();

        assert!(watchdog.is_finished());
        assert_eq!(watchdog.status(), TaskStatus::Completed);
        assert_eq!(watchdog.task().fetches(), 1);
    }

    #[test]
    fn test_no_signal_while_state_is_unchanged() {
        let watchdog = Arc::new(Watchdog::new(
            ScriptedTask::new(vec![running(TaskStatus::Running)]),
            TaskStatus::New,
        ));

        // First poll is a transition; everything after repeats RUNNING.
        watchdog.poll();

        let waiter = {
            let watchdog = Arc::clone(&watchdog);
            thread::spawn(move || watchdog.wait_for_signal(Duration::from_millis(300)))
        };

        for _ in 0..10 {
            thread::sleep(Duration::from_millis(5));
            watchdog.poll();
        }

        assert!(!waiter.join().unwrap());
        assert_eq!(watchdog.stats().succeeded, 11);
    }

    #[test]
    fn test_signal_on_transition_sees_consistent_pair() {
        let watchdog = Arc::new(Watchdog::new(
            ScriptedTask::new(vec![running(TaskStatus::Running)]),
            TaskStatus::New,
        ));

        let waiter = {
            let watchdog = Arc::clone(&watchdog);
            thread::spawn(move || {
                let signalled = watchdog.wait_for_signal(Duration::from_secs(5));
                (signalled, watchdog.transition())
            })
        };

        thread::sleep(Duration::from_millis(20));
        watchdog.poll();

        let (signalled, pair) = waiter.join().unwrap();
        assert!(signalled);
        assert_eq!(pair, (TaskStatus::New, TaskStatus::Running));
    }

    #[test]
    fn test_panic_result_is_kept_unaltered() {
        let watchdog = Watchdog::new(
            ScriptedTask::new(vec![done(TaskStatus::Completed, Some(TaskResult::Panic))]),
            TaskStatus::Running,
        );

        watchdog.poll();

        let terminal = watchdog.terminal_snapshot().unwrap();
        assert_eq!(terminal.state, TaskStatus::Completed);
        assert_eq!(terminal.result, Some(TaskResult::Panic));
    }

    #[test]
    fn test_panic_message_extraction() {
        let payload: Box<dyn Any + Send> = Box::new("static message");
        assert_eq!(panic_message(payload.as_ref()), "static message");

        let payload: Box<dyn Any + Send> = Box::new(String::from("owned message"));
        assert_eq!(panic_message(payload.as_ref()), "owned message");

        let payload: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(payload.as_ref()), "<non-string panic payload>");
    }
}
