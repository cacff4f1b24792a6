//! Demo routines composed from the simulated robot's mechanisms.

use crate::robot::Robot;
use clap::ValueEnum;
use std::rc::Rc;
use std::time::Duration;
use taskweave_compose::{Composer, GroupBuilder};
use taskweave_core::{
    BoxedTask, BuildError, Clock, ConditionalTask, PrintTask, Task, WaitTask, WaitUntilTask,
};

const SHOOTING_SPOT_M: f64 = 2.0;
const TAXI_LINE_M: f64 = 1.0;
const SHOT_TIMEOUT: Duration = Duration::from_secs(3);

/// Routines the binary knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Routine {
    /// Drive to the shooting spot, then feed two balls or give up after 3 s
    TwoBall,
    /// Drive forward for a fixed 1.5 s
    TimedDrive,
    /// Cross the line unless already past it
    Taxi,
    /// Drive forward and backward at once (refused by the scheduler)
    Conflict,
}

impl Routine {
    /// Compose the routine's task tree.
    pub fn build(self, robot: &Robot, clock: Rc<dyn Clock>) -> Result<BoxedTask, BuildError> {
        let composer = Composer::new().with_clock(Rc::clone(&clock));
        match self {
            Self::TwoBall => two_ball(&composer, robot, clock),
            Self::TimedDrive => timed_drive(&composer, robot),
            Self::Taxi => taxi(&composer, robot),
            Self::Conflict => conflict(&composer, robot),
        }
    }
}

fn two_ball(composer: &Composer, robot: &Robot, clock: Rc<dyn Clock>) -> Result<BoxedTask, BuildError> {
    let position = robot.clone();
    let counter = robot.clone();

    composer.sequential(|s| {
        s.named("TwoBall");
        s.add_child(s.deadline(|d| {
            d.named("DriveToSpot");
            d.designate_primary(
                WaitUntilTask::new(move || position.distance() >= SHOOTING_SPOT_M).named("AtSpot"),
            );
            d.add_child(robot.drive(0.25));
        }));
        s.add_child(s.race(|r| {
            r.named("Shoot");
            r.add_child(r.deadline(|d| {
                d.named("FeedTwo");
                d.designate_primary(WaitUntilTask::new(move || counter.balls_fed() >= 2).named("TwoFed"));
                d.add_child(robot.spin_up());
                d.add_child(robot.feed());
            }));
            r.add_child(WaitTask::with_clock(SHOT_TIMEOUT, clock).named("ShotTimeout"));
        }));
    })
}

fn timed_drive(composer: &Composer, robot: &Robot) -> Result<BoxedTask, BuildError> {
    composer.timed(|t| {
        t.named("TimedDrive");
        t.add_child(robot.drive(0.25));
        t.run_for(Duration::from_millis(1500));
    })
}

fn taxi(composer: &Composer, robot: &Robot) -> Result<BoxedTask, BuildError> {
    let cross = composer.sequential(|s| {
        s.named("CrossLine");
        let timer = s.timer();
        s.add_child(s.deadline(|d| {
            d.designate_primary(WaitUntilTask::timer_reaches(timer, Duration::from_secs(1)));
            d.add_child(robot.drive(0.25));
        }));
    });

    let position = robot.clone();
    let task = ConditionalTask::from_parts(
        cross,
        PrintTask::new("Already past the line"),
        move || position.distance() < TAXI_LINE_M,
    )?;
    Ok(task.named("Taxi").boxed())
}

fn conflict(composer: &Composer, robot: &Robot) -> Result<BoxedTask, BuildError> {
    composer.parallel(|p| {
        p.named("Conflict");
        p.add_child(robot.drive(0.25));
        p.add_child(robot.drive(-0.25).named("Reverse"));
    })
}
