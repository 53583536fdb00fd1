use std::{cell::RefCell, collections::BTreeMap, rc::Rc, time::Duration};

use tracing::trace;

use crate::{clamp_period, ScheduleError, Scheduler, Task, TaskHandle};

struct Entry {
    period: Duration,
    next_due: Duration,
    /// `None` while the task is being executed.
    task: Option<Task>,
}

#[derive(Default)]
struct ClockState {
    now: Duration,
    next_handle: u64,
    entries: BTreeMap<TaskHandle, Entry>,
}

/// A scheduler whose time only moves when [`VirtualClock::advance`] is called.
///
/// Clones share the same clock, so one clone can be handed to the code under test while another
/// one drives time.
#[derive(Clone, Default)]
pub struct VirtualClock {
    state: Rc<RefCell<ClockState>>,
}

impl VirtualClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed since the clock was created.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.state.borrow().now
    }

    /// Moves time forward, running every task that becomes due in chronological order.
    ///
    /// Tasks may schedule or cancel tasks (including themselves) while running.
    /// Returns the number of task invocations.
    pub fn advance(&self, duration: Duration) -> usize {
        let target = self.now() + duration;
        let mut invocations = 0;

        while let Some((handle, due, mut task)) = self.take_next_due(target) {
            trace!("running {handle} at {due:?}");
            task();
            invocations += 1;

            let mut state = self.state.borrow_mut();
            if let Some(entry) = state.entries.get_mut(&handle) {
                entry.next_due += entry.period;
                entry.task = Some(task);
            }
        }

        self.state.borrow_mut().now = target;
        invocations
    }

    fn take_next_due(&self, target: Duration) -> Option<(TaskHandle, Duration, Task)> {
        let mut state = self.state.borrow_mut();
        let (&handle, _) = state
            .entries
            .iter()
            .filter(|(_, entry)| entry.task.is_some() && entry.next_due <= target)
            .min_by_key(|&(&handle, entry)| (entry.next_due, handle))?;

        let entry = state.entries.get_mut(&handle)?;
        let due = entry.next_due;
        let task = entry.task.take()?;
        state.now = due;
        Some((handle, due, task))
    }
}

impl Scheduler for VirtualClock {
    fn schedule_repeating(
        &self,
        period: Duration,
        task: Task,
    ) -> Result<TaskHandle, ScheduleError> {
        let mut state = self.state.borrow_mut();
        let period = clamp_period(period);
        let handle = TaskHandle(state.next_handle);
        state.next_handle += 1;
        let next_due = state.now + period;
        state.entries.insert(
            handle,
            Entry {
                period,
                next_due,
                task: Some(task),
            },
        );
        Ok(handle)
    }

    fn cancel(&self, handle: TaskHandle) {
        self.state.borrow_mut().entries.remove(&handle);
    }

    fn active_tasks(&self) -> usize {
        self.state.borrow().entries.len()
    }
}
