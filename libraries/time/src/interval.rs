use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    time::Duration,
};

use tracing::debug;
use wasm_bindgen::{closure::Closure, JsCast};

use crate::{clamp_period, ScheduleError, Scheduler, Task, TaskHandle};

struct Interval {
    id: i32,
    /// Must outlive the browser interval, which only holds a reference into it.
    _closure: Closure<dyn FnMut()>,
}

/// Runs tasks through `window.setInterval`.
///
/// Cancelling clears the interval before the callback is released, so the browser will not
/// invoke the task again. Tasks must not cancel themselves.
pub struct IntervalScheduler {
    window: web_sys::Window,
    next_handle: Cell<u64>,
    intervals: RefCell<HashMap<TaskHandle, Interval>>,
}

impl IntervalScheduler {
    /// # Errors
    ///
    /// Returns an error when not running inside a browser window.
    pub fn new() -> Result<Self, ScheduleError> {
        let window = web_sys::window().ok_or_else(|| ScheduleError("no window".to_owned()))?;
        Ok(Self {
            window,
            next_handle: Cell::new(0),
            intervals: RefCell::default(),
        })
    }
}

impl Scheduler for IntervalScheduler {
    fn schedule_repeating(
        &self,
        period: Duration,
        task: Task,
    ) -> Result<TaskHandle, ScheduleError> {
        let millis = i32::try_from(clamp_period(period).as_millis()).unwrap_or(i32::MAX);
        let closure = Closure::wrap(task);
        let id = self
            .window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                millis,
            )
            .map_err(|error| ScheduleError(format!("{error:?}")))?;

        let handle = TaskHandle(self.next_handle.get());
        self.next_handle.set(handle.0 + 1);
        debug!("scheduled {handle} every {millis}ms as interval {id}");

        self.intervals.borrow_mut().insert(
            handle,
            Interval {
                id,
                _closure: closure,
            },
        );
        Ok(handle)
    }

    fn cancel(&self, handle: TaskHandle) {
        if let Some(interval) = self.intervals.borrow_mut().remove(&handle) {
            self.window.clear_interval_with_handle(interval.id);
            debug!("cancelled {handle}");
        }
    }

    fn active_tasks(&self) -> usize {
        self.intervals.borrow().len()
    }
}
