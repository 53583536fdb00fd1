use std::time::Duration;

use lib_time::{ScheduleError, Scheduler, Task, TaskHandle};
use tracing::{debug, info};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AnimationState {
    #[default]
    Stopped,
    Running(TaskHandle),
}

/// Owns the single repeating tick that drives the orbit camera.
#[derive(Debug, Default)]
pub struct AnimationDriver {
    state: AnimationState,
}

impl AnimationDriver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> AnimationState {
        self.state
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self.state, AnimationState::Running(_))
    }

    /// Schedules `tick` every `period`.
    ///
    /// Returns `false` without touching the scheduler if a tick is already running.
    ///
    /// # Errors
    ///
    /// Returns an error if the scheduler refused the task. The driver stays stopped.
    pub fn start<S: Scheduler + ?Sized>(
        &mut self,
        scheduler: &S,
        period: Duration,
        tick: Task,
    ) -> Result<bool, ScheduleError> {
        if let AnimationState::Running(handle) = self.state {
            debug!("animation already running as {handle}");
            return Ok(false);
        }
        let handle = scheduler.schedule_repeating(period, tick)?;
        info!("animation started as {handle}, ticking every {period:?}");
        self.state = AnimationState::Running(handle);
        Ok(true)
    }

    /// Cancels the tick. No tick runs after this returns.
    ///
    /// Returns `false` if the animation was not running.
    pub fn stop<S: Scheduler + ?Sized>(&mut self, scheduler: &S) -> bool {
        let AnimationState::Running(handle) = self.state else {
            return false;
        };
        scheduler.cancel(handle);
        self.state = AnimationState::Stopped;
        info!("animation {handle} stopped");
        true
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use lib_time::VirtualClock;

    use super::*;

    const PERIOD: Duration = Duration::from_millis(30);

    fn counting_tick(counter: &Rc<Cell<u32>>) -> Task {
        let counter = Rc::clone(counter);
        Box::new(move || counter.set(counter.get() + 1))
    }

    #[test]
    fn start_is_idempotent() {
        let clock = VirtualClock::new();
        let ticks = Rc::new(Cell::new(0));
        let mut driver = AnimationDriver::new();

        assert_eq!(
            driver.start(&clock, PERIOD, counting_tick(&ticks)),
            Ok(true)
        );
        assert_eq!(
            driver.start(&clock, PERIOD, counting_tick(&ticks)),
            Ok(false)
        );
        assert_eq!(clock.active_tasks(), 1);

        clock.advance(Duration::from_millis(300));
        assert_eq!(ticks.get(), 10);
    }

    #[test]
    fn stop_is_idempotent_and_final() {
        let clock = VirtualClock::new();
        let ticks = Rc::new(Cell::new(0));
        let mut driver = AnimationDriver::new();

        assert!(!driver.stop(&clock));
        driver.start(&clock, PERIOD, counting_tick(&ticks)).unwrap();
        clock.advance(Duration::from_millis(90));
        assert_eq!(ticks.get(), 3);

        assert!(driver.stop(&clock));
        assert!(!driver.stop(&clock));
        assert_eq!(driver.state(), AnimationState::Stopped);
        assert_eq!(clock.active_tasks(), 0);

        clock.advance(Duration::from_secs(1));
        assert_eq!(ticks.get(), 3);
    }

    #[test]
    fn restart_after_stop() {
        let clock = VirtualClock::new();
        let ticks = Rc::new(Cell::new(0));
        let mut driver = AnimationDriver::new();

        driver.start(&clock, PERIOD, counting_tick(&ticks)).unwrap();
        driver.stop(&clock);
        assert_eq!(
            driver.start(&clock, PERIOD, counting_tick(&ticks)),
            Ok(true)
        );
        assert!(driver.is_running());
        assert_eq!(clock.active_tasks(), 1);
    }
}
