//! Run children together until all have finished.

use super::{sibling_conflicts, union_requirements, Member};
use taskweave_core::{BoxedTask, CompositionStrategy, Conflict, Outline, Requirements, Task};

/// Starts every child together and finishes once all of them have.
///
/// A child that finishes early is ended and no longer polled; the others
/// keep running.
pub struct ParallelGroup {
    name: String,
    members: Vec<Member>,
    started: bool,
}

impl ParallelGroup {
    /// Create a group over `children`.
    pub fn new(name: impl Into<String>, children: Vec<BoxedTask>) -> Self {
        Self {
            name: name.into(),
            members: children.into_iter().map(Member::new).collect(),
            started: false,
        }
    }

    /// Number of children still running.
    pub fn running(&self) -> usize {
        self.members.iter().filter(|m| m.running).count()
    }
}

impl Task for ParallelGroup {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(&mut self) {
        self.started = true;
        for member in &mut self.members {
            member.start();
        }
    }

    fn execute(&mut self) {
        for member in &mut self.members {
            member.poll();
        }
    }

    fn is_finished(&self) -> bool {
        self.started && self.members.iter().all(|m| !m.running)
    }

    fn end(&mut self, interrupted: bool) {
        if interrupted {
            for member in &mut self.members {
                member.stop(true);
            }
        }
        self.started = false;
    }

    fn requirements(&self) -> Requirements {
        union_requirements(self.members.iter().map(|m| &m.task))
    }

    fn conflicts(&self) -> Vec<Conflict> {
        let tasks: Vec<&BoxedTask> = self.members.iter().map(|m| &m.task).collect();
        sibling_conflicts(&self.name, &tasks)
    }

    fn outline(&self) -> Outline {
        Outline::composite(
            &self.name,
            CompositionStrategy::ParallelAll,
            self.requirements(),
            self.members.iter().map(|m| m.task.outline()).collect(),
        )
    }
}
