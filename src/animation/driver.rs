use std::cell::Cell;
use std::rc::Rc;

use log::{error, trace};

use crate::core::{Clock, FrameScheduler, TimeSource};

/// Convert a driver timestamp to the seconds the update policy works in
pub fn millis_to_seconds(millis: f64) -> f32 {
    (millis * 0.001) as f32
}

/// Shared flag that ends an animation loop
///
/// Once stopped, a driver never runs or schedules another tick.
#[derive(Debug, Clone)]
pub struct StopHandle {
    stopped: Rc<Cell<bool>>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.stopped.set(true);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Completed,
    /// The callback returned an error; the next tick is still scheduled
    Failed,
    /// The driver was stopped; nothing ran
    Stopped,
}

/// Requests the next tick when dropped, so an early return or a panic in the
/// callback cannot break the chain of frames
struct Reschedule<'a> {
    scheduler: &'a dyn FrameScheduler,
    stopped: &'a Cell<bool>,
}

impl Drop for Reschedule<'_> {
    fn drop(&mut self) {
        if !self.stopped.get() {
            self.scheduler.schedule_next();
        }
    }
}

/// Cooperative per-frame callback driver
///
/// Each tick passes a millisecond timestamp to the callback and then asks the
/// scheduler for exactly one more tick. Timestamps never go backwards.
#[derive(Debug)]
pub struct AnimationDriver<T: TimeSource = Clock> {
    time: T,
    stopped: Rc<Cell<bool>>,
    last_timestamp: f64,
    ticks: u64,
    failures: u64,
}

impl AnimationDriver<Clock> {
    pub fn new() -> Self {
        Self::with_time_source(Clock::new())
    }
}

impl Default for AnimationDriver<Clock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TimeSource> AnimationDriver<T> {
    pub fn with_time_source(time: T) -> Self {
        Self {
            time,
            stopped: Rc::new(Cell::new(false)),
            last_timestamp: 0.0,
            ticks: 0,
            failures: 0,
        }
    }

    /// Request the first tick
    pub fn start(&mut self, scheduler: &dyn FrameScheduler) -> StopHandle {
        if !self.stopped.get() {
            scheduler.schedule_next();
        }
        self.stop_handle()
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            stopped: Rc::clone(&self.stopped),
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.get()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// Run one tick. Errors are logged and counted, never propagated.
    pub fn tick<F>(&mut self, scheduler: &dyn FrameScheduler, callback: F) -> TickOutcome
    where
        F: FnOnce(f64) -> anyhow::Result<()>,
    {
        if self.stopped.get() {
            return TickOutcome::Stopped;
        }

        let timestamp = self.time.now_millis().max(self.last_timestamp);
        self.last_timestamp = timestamp;
        self.ticks += 1;
        trace!("Tick {} at {:.1} ms", self.ticks, timestamp);

        let _reschedule = Reschedule {
            scheduler,
            stopped: &self.stopped,
        };

        match callback(timestamp) {
            Ok(()) => TickOutcome::Completed,
            Err(err) => {
                self.failures += 1;
                error!("Tick {} failed: {:#}", self.ticks, err);
                TickOutcome::Failed
            }
        }
    }

    /// Drive ticks back-to-back on the current thread until stopped
    ///
    /// Returns the number of ticks run. Without a stop this never returns.
    pub fn run<F>(&mut self, mut callback: F) -> u64
    where
        F: FnMut(f64) -> anyhow::Result<()>,
    {
        let scheduler = LoopScheduler::default();
        let before = self.ticks;
        self.start(&scheduler);
        while scheduler.take_request() {
            self.tick(&scheduler, |timestamp| callback(timestamp));
        }
        self.ticks - before
    }
}

/// Scheduler for the headless loop: remembers a single pending request
#[derive(Debug, Default)]
struct LoopScheduler {
    requested: Cell<bool>,
}

impl LoopScheduler {
    fn take_request(&self) -> bool {
        self.requested.replace(false)
    }
}

impl FrameScheduler for LoopScheduler {
    fn schedule_next(&self) {
        self.requested.set(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct CountingScheduler {
        requests: RefCell<usize>,
    }

    impl CountingScheduler {
        fn new() -> Self {
            Self {
                requests: RefCell::new(0),
            }
        }

        fn count(&self) -> usize {
            *self.requests.borrow()
        }
    }

    impl FrameScheduler for CountingScheduler {
        fn schedule_next(&self) {
            *self.requests.borrow_mut() += 1;
        }
    }

    struct ManualTime(Rc<Cell<f64>>);

    impl TimeSource for ManualTime {
        fn now_millis(&self) -> f64 {
            self.0.get()
        }
    }

    #[test]
    fn test_millis_to_seconds() {
        assert_eq!(millis_to_seconds(1500.0), 1.5);
        assert_eq!(millis_to_seconds(0.0), 0.0);
    }

    #[test]
    fn test_start_requests_first_tick() {
        let scheduler = CountingScheduler::new();
        let mut driver = AnimationDriver::new();
        let handle = driver.start(&scheduler);
        assert_eq!(scheduler.count(), 1);
        assert!(!handle.is_stopped());
    }

    #[test]
    fn test_each_tick_schedules_exactly_one_more() {
        let scheduler = CountingScheduler::new();
        let mut driver = AnimationDriver::new();
        for _ in 0..3 {
            assert_eq!(driver.tick(&scheduler, |_| Ok(())), TickOutcome::Completed);
        }
        assert_eq!(scheduler.count(), 3);
        assert_eq!(driver.ticks(), 3);
    }

    #[test]
    fn test_callback_receives_clock_timestamp() {
        let now = Rc::new(Cell::new(1234.0));
        let mut driver = AnimationDriver::with_time_source(ManualTime(Rc::clone(&now)));
        let scheduler = CountingScheduler::new();
        let mut seen = 0.0;
        driver.tick(&scheduler, |ts| {
            seen = ts;
            Ok(())
        });
        assert_eq!(seen, 1234.0);
    }

    #[test]
    fn test_timestamps_never_regress() {
        let now = Rc::new(Cell::new(500.0));
        let mut driver = AnimationDriver::with_time_source(ManualTime(Rc::clone(&now)));
        let scheduler = CountingScheduler::new();
        driver.tick(&scheduler, |_| Ok(()));

        now.set(200.0);
        let mut seen = 0.0;
        driver.tick(&scheduler, |ts| {
            seen = ts;
            Ok(())
        });
        assert_eq!(seen, 500.0);
    }

    #[test]
    fn test_stopped_driver_is_inert() {
        let scheduler = CountingScheduler::new();
        let mut driver = AnimationDriver::new();
        driver.stop_handle().stop();

        let mut ran = false;
        let outcome = driver.tick(&scheduler, |_| {
            ran = true;
            Ok(())
        });
        assert_eq!(outcome, TickOutcome::Stopped);
        assert!(!ran);
        assert_eq!(scheduler.count(), 0);

        driver.start(&scheduler);
        assert_eq!(scheduler.count(), 0);
    }

    #[test]
    fn test_stop_from_inside_callback_skips_reschedule() {
        let scheduler = CountingScheduler::new();
        let mut driver = AnimationDriver::new();
        let handle = driver.stop_handle();
        driver.tick(&scheduler, |_| {
            handle.stop();
            Ok(())
        });
        assert_eq!(scheduler.count(), 0);
    }

    #[test]
    fn test_run_stops_on_request() {
        let mut driver = AnimationDriver::new();
        let handle = driver.stop_handle();
        let mut calls = 0;
        let ran = driver.run(|_| {
            calls += 1;
            if calls == 5 {
                handle.stop();
            }
            Ok(())
        });
        assert_eq!(ran, 5);
        assert_eq!(calls, 5);
    }
}
