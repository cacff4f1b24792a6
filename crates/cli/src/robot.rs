//! Simulated mechanisms the demo routines drive.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use taskweave_core::RunTask;

/// Shooter speed at which the indexer may feed.
pub const SHOOTER_READY_RPM: f64 = 3000.0;
const SHOOTER_MAX_RPM: f64 = 4000.0;
const SHOOTER_RAMP_RPM: f64 = 500.0;
/// Indexer ticks needed to push one ball into the shooter.
const TICKS_PER_BALL: u32 = 5;

/// Shared state of a simulated robot.
///
/// Clones observe the same mechanisms, so tasks and the caller can both
/// hold one.
#[derive(Debug, Clone, Default)]
pub struct Robot {
    distance: Rc<Cell<f64>>,
    shooter_rpm: Rc<Cell<f64>>,
    indexer_ticks: Rc<Cell<u32>>,
    balls_fed: Rc<Cell<u32>>,
}

impl Robot {
    /// A robot at rest at the origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Metres driven so far.
    pub fn distance(&self) -> f64 {
        self.distance.get()
    }

    /// Current shooter speed.
    pub fn shooter_rpm(&self) -> f64 {
        self.shooter_rpm.get()
    }

    /// Balls fed into the shooter.
    pub fn balls_fed(&self) -> u32 {
        self.balls_fed.get()
    }

    /// Drive forward `step` metres per tick. Requires the drivetrain.
    pub fn drive(&self, step: f64) -> RunTask {
        let distance = Rc::clone(&self.distance);
        RunTask::new(move || distance.set(distance.get() + step))
            .named("Drive")
            .requires("drivetrain")
    }

    /// Ramp the shooter up and hold it; spins down when the task ends.
    pub fn spin_up(&self) -> RunTask {
        let rpm = Rc::clone(&self.shooter_rpm);
        let stop = Rc::clone(&self.shooter_rpm);
        RunTask::new(move || rpm.set((rpm.get() + SHOOTER_RAMP_RPM).min(SHOOTER_MAX_RPM)))
            .on_end(move |_| stop.set(0.0))
            .named("SpinUp")
            .requires("shooter")
    }

    /// Run the indexer; balls only advance while the shooter is ready.
    pub fn feed(&self) -> RunTask {
        let rpm = Rc::clone(&self.shooter_rpm);
        let ticks = Rc::clone(&self.indexer_ticks);
        let balls = Rc::clone(&self.balls_fed);
        RunTask::new(move || {
            if rpm.get() < SHOOTER_READY_RPM {
                return;
            }
            ticks.set(ticks.get() + 1);
            if ticks.get() % TICKS_PER_BALL == 0 {
                balls.set(balls.get() + 1);
            }
        })
        .named("Feed")
        .requires("indexer")
    }
}

impl fmt::Display for Robot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "distance {:.2} m, shooter {:.0} rpm, {} balls fed",
            self.distance(),
            self.shooter_rpm(),
            self.balls_fed()
        )
    }
}
