//! The seam between composed trees and whatever drives them.

use crate::error::Result;
use taskweave_core::{BoxedTask, TaskId};

/// Accepts finished task trees for execution.
///
/// Composition never talks to a scheduler directly; callers build a tree
/// and hand the root to a registrar.
pub trait SchedulerRegistrar {
    /// Take ownership of `task` and schedule it.
    fn register(&mut self, task: BoxedTask) -> Result<TaskId>;
}
