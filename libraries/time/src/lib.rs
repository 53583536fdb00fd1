//! Repeating tasks with guaranteed cancellation.
//!
//! A [`Scheduler`] runs a task every `period` until the [`TaskHandle`] returned on scheduling
//! is cancelled. Once [`Scheduler::cancel`] returns, the task is never invoked again.

#![cfg_attr(test, allow(clippy::unwrap_used, reason = "tests"))]

#[cfg(target_family = "wasm")]
mod interval;
mod virtual_clock;

use std::{
    fmt::{self, Display},
    time::Duration,
};

#[cfg(target_family = "wasm")]
pub use interval::IntervalScheduler;
pub use virtual_clock::VirtualClock;

/// Work to be executed on every tick.
pub type Task = Box<dyn FnMut()>;

/// Identifies a scheduled task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskHandle(pub u64);

impl Display for TaskHandle {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "task#{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduleError(pub String);

impl Display for ScheduleError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "failed to schedule task: {}", self.0)
    }
}

impl std::error::Error for ScheduleError {}

pub trait Scheduler {
    /// Invokes `task` every `period` until cancelled.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying timer refused the task.
    fn schedule_repeating(&self, period: Duration, task: Task)
        -> Result<TaskHandle, ScheduleError>;

    /// Stops a task. Unknown or already cancelled handles are ignored.
    fn cancel(&self, handle: TaskHandle);

    /// Number of tasks that are still scheduled.
    fn active_tasks(&self) -> usize;
}

/// Timers below one millisecond are not supported by browsers and would make a virtual clock
/// spin forever.
pub(crate) fn clamp_period(period: Duration) -> Duration {
    period.max(Duration::from_millis(1))
}
