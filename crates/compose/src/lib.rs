//! taskweave composition: declare trees of tasks with a small set of
//! strategies and get back a single composite task.
//!
//! Five strategies are available, one entry point each:
//!
//! | Entry point | Finishes when |
//! |---|---|
//! | [`sequential`] | the last child has finished, children run in order |
//! | [`parallel`] | every child has finished |
//! | [`race`] | any child has finished; the rest are interrupted |
//! | [`deadline`] | the designated deadline child has finished; the rest are interrupted |
//! | [`timed`] | the single root has finished; a timer restarts when the group starts |

#![warn(missing_docs)]

pub mod builder;
pub mod dsl;
pub mod factory;
pub mod groups;
pub mod strategy;

pub use builder::{
    DeadlineBuilder, GroupBuilder, ParallelBuilder, RaceBuilder, SequentialBuilder, TimedBuilder,
};
pub use dsl::{deadline, parallel, race, sequential, timed, ComposeConfig, Composer, Scope, SlotPolicy};
pub use factory::{CompositeFactory, StandardFactory};
pub use groups::{DeadlineGroup, ParallelGroup, RaceGroup, SequentialGroup, TimedGroup, TimerScope};
pub use strategy::{assemble, Parts, EMPTY_ROOT_MESSAGE};

pub use taskweave_core::{BoxedTask, BuildError, CompositionStrategy, IntoTask, Task};
