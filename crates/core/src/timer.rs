//! Stopwatch timer used by composites to expose "time since start".

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Monotonic time source.
pub trait Clock {
    /// Time since an arbitrary fixed origin.
    fn now(&self) -> Duration;
}

/// Clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Create a clock whose origin is now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock that only moves when told to.
///
/// Clones share the same reading, so a test can hold one copy and advance
/// the time observed by every timer built from the others.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    /// A clock reading zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// A stopwatch: accumulates elapsed time while running.
///
/// A new timer is stopped and reads zero.
pub struct Timer {
    clock: Rc<dyn Clock>,
    accumulated: Duration,
    started_at: Option<Duration>,
}

impl Timer {
    /// A stopped, zeroed timer on the system clock.
    pub fn new() -> Self {
        Self::with_clock(Rc::new(SystemClock::new()))
    }

    /// A stopped, zeroed timer on the given clock.
    pub fn with_clock(clock: Rc<dyn Clock>) -> Self {
        Self {
            clock,
            accumulated: Duration::ZERO,
            started_at: None,
        }
    }

    /// Zero the accumulated time. A running timer keeps running from zero.
    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
        if self.started_at.is_some() {
            self.started_at = Some(self.clock.now());
        }
    }

    /// Start accumulating. No effect if already running.
    pub fn start(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(self.clock.now());
        }
    }

    /// Stop accumulating, keeping the elapsed time.
    pub fn stop(&mut self) {
        if let Some(started) = self.started_at.take() {
            self.accumulated += self.clock.now().saturating_sub(started);
        }
    }

    /// Total time accumulated so far.
    pub fn elapsed(&self) -> Duration {
        match self.started_at {
            Some(started) => self.accumulated + self.clock.now().saturating_sub(started),
            None => self.accumulated,
        }
    }

    /// Whether at least `period` has accumulated.
    pub fn has_elapsed(&self, period: Duration) -> bool {
        self.elapsed() >= period
    }

    /// Whether the timer is accumulating.
    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Timer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timer")
            .field("elapsed", &self.elapsed())
            .field("running", &self.is_running())
            .finish()
    }
}

/// Shared handle to one [`Timer`].
///
/// The composite that owns the timer resets it; the tasks inside read it.
/// Everything runs on the scheduler's single thread, so a `RefCell` is
/// enough.
#[derive(Debug, Clone, Default)]
pub struct TimerHandle {
    inner: Rc<RefCell<Timer>>,
}

impl TimerHandle {
    /// Wrap a timer.
    pub fn new(timer: Timer) -> Self {
        Self {
            inner: Rc::new(RefCell::new(timer)),
        }
    }

    /// A stopped, zeroed timer on the given clock.
    pub fn with_clock(clock: Rc<dyn Clock>) -> Self {
        Self::new(Timer::with_clock(clock))
    }

    /// See [`Timer::reset`].
    pub fn reset(&self) {
        self.inner.borrow_mut().reset();
    }

    /// See [`Timer::start`].
    pub fn start(&self) {
        self.inner.borrow_mut().start();
    }

    /// See [`Timer::stop`].
    pub fn stop(&self) {
        self.inner.borrow_mut().stop();
    }

    /// Stop, zero and start again.
    pub fn restart(&self) {
        let mut timer = self.inner.borrow_mut();
        timer.stop();
        timer.reset();
        timer.start();
    }

    /// See [`Timer::elapsed`].
    pub fn elapsed(&self) -> Duration {
        self.inner.borrow().elapsed()
    }

    /// See [`Timer::has_elapsed`].
    pub fn has_elapsed(&self, period: Duration) -> bool {
        self.inner.borrow().has_elapsed(period)
    }

    /// See [`Timer::is_running`].
    pub fn is_running(&self) -> bool {
        self.inner.borrow().is_running()
    }
}
