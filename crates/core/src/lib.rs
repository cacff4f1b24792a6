//! taskweave core: the task capability and the pieces every task tree
//! is made of.
//!
//! This crate defines what a task is, the resources it can hold, the
//! timer composites expose to their children, a handful of general
//! leaf tasks, and the errors raised while building a tree.

#![warn(missing_docs)]

mod id;
mod resource;
mod strategy;
mod task;
mod timer;
mod outline;
mod error;

pub mod leaf;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-exports
pub use id::TaskId;
pub use resource::{Conflict, Requirements, Resource};
pub use strategy::{CompositionStrategy, UnknownStrategy};
pub use task::{BoxedTask, IntoTask, Task};
pub use timer::{Clock, ManualClock, SystemClock, Timer, TimerHandle};
pub use outline::{Outline, TaskKind};
pub use error::{BuildError, Result};

pub use leaf::{ConditionalTask, InstantTask, PrintTask, RunTask, WaitTask, WaitUntilTask};
