//! Composite factories: turn a list of children into one composite task.

use crate::groups::{DeadlineGroup, ParallelGroup, RaceGroup, SequentialGroup};
use taskweave_core::{BoxedTask, Task};

/// Produces the composite task for each strategy.
///
/// Every method is a pure function of its arguments: it returns a new
/// task and touches nothing else. Implement this to run builders against
/// a different scheduler framework's composites.
pub trait CompositeFactory {
    /// Run `children` one after another in the given order.
    fn sequential(&self, name: &str, children: Vec<BoxedTask>) -> BoxedTask;

    /// Run `children` together until all have finished.
    fn parallel_all(&self, name: &str, children: Vec<BoxedTask>) -> BoxedTask;

    /// Run `children` together until any has finished.
    fn parallel_race(&self, name: &str, children: Vec<BoxedTask>) -> BoxedTask;

    /// Run `deadline` and `others` together until `deadline` has finished.
    fn parallel_deadline(&self, name: &str, deadline: BoxedTask, others: Vec<BoxedTask>) -> BoxedTask;
}

/// Factory producing this crate's standard composites.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardFactory;

impl CompositeFactory for StandardFactory {
    fn sequential(&self, name: &str, children: Vec<BoxedTask>) -> BoxedTask {
        SequentialGroup::new(name, children).boxed()
    }

    fn parallel_all(&self, name: &str, children: Vec<BoxedTask>) -> BoxedTask {
        ParallelGroup::new(name, children).boxed()
    }

    fn parallel_race(&self, name: &str, children: Vec<BoxedTask>) -> BoxedTask {
        RaceGroup::new(name, children).boxed()
    }

    fn parallel_deadline(&self, name: &str, deadline: BoxedTask, others: Vec<BoxedTask>) -> BoxedTask {
        DeadlineGroup::new(name, deadline, others).boxed()
    }
}
