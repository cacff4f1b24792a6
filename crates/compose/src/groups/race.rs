//! Run children together until the first one finishes.

use super::{sibling_conflicts, union_requirements, Member};
use taskweave_core::{BoxedTask, CompositionStrategy, Conflict, Outline, Requirements, Task};
use tracing::debug;

/// Starts every child together and finishes as soon as any one does.
///
/// The winner is ended normally; every other child is force-terminated
/// on the same tick, exactly once. An empty race finishes immediately.
pub struct RaceGroup {
    name: String,
    members: Vec<Member>,
    started: bool,
    winner: Option<usize>,
}

impl RaceGroup {
    /// Create a group over `children`.
    pub fn new(name: impl Into<String>, children: Vec<BoxedTask>) -> Self {
        Self {
            name: name.into(),
            members: children.into_iter().map(Member::new).collect(),
            started: false,
            winner: None,
        }
    }

    /// Name of the child that finished first, once there is one.
    pub fn winner(&self) -> Option<&str> {
        self.winner.map(|i| self.members[i].task.name())
    }

    fn stop_others(&mut self) {
        for member in &mut self.members {
            member.stop(true);
        }
    }
}

impl Task for RaceGroup {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(&mut self) {
        self.started = true;
        self.winner = None;
        for member in &mut self.members {
            member.start();
        }
    }

    fn execute(&mut self) {
        if self.winner.is_some() {
            return;
        }
        let winner = self.members.iter_mut().position(|m| m.poll());
        if let Some(index) = winner {
            debug!("{}: '{}' finished first", self.name, self.members[index].task.name());
            self.winner = Some(index);
            self.stop_others();
        }
    }

    fn is_finished(&self) -> bool {
        self.started && (self.winner.is_some() || self.members.is_empty())
    }

    fn end(&mut self, interrupted: bool) {
        if interrupted {
            self.stop_others();
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
            CompositionStrategy::ParallelRace,
            self.requirements(),
            self.members.iter().map(|m| m.task.outline()).collect(),
        )
    }
}
