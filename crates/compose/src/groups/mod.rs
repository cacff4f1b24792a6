//! Standard composite tasks.

mod sequential;
mod parallel;
mod race;
mod deadline;
mod timed;

pub use sequential::SequentialGroup;
pub use parallel::ParallelGroup;
pub use race::RaceGroup;
pub use deadline::DeadlineGroup;
pub use timed::{TimedGroup, TimerScope};

use taskweave_core::{BoxedTask, Conflict, Requirements, Task};

/// A child of a concurrent group and whether it is still being polled.
struct Member {
    task: BoxedTask,
    running: bool,
}

impl Member {
    fn new(task: BoxedTask) -> Self {
        Self {
            task,
            running: false,
        }
    }

    fn start(&mut self) {
        self.running = true;
        self.task.initialize();
    }

    /// Poll once; ends the child and stops polling it if it finished.
    /// Returns whether it finished on this poll.
    fn poll(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.task.execute();
        if self.task.is_finished() {
            self.stop(false);
            return true;
        }
        false
    }

    fn stop(&mut self, interrupted: bool) {
        if self.running {
            self.running = false;
            self.task.end(interrupted);
        }
    }
}

fn union_requirements<'a>(tasks: impl IntoIterator<Item = &'a BoxedTask>) -> Requirements {
    let mut all = Requirements::new();
    for task in tasks {
        all.extend(&task.requirements());
    }
    all
}

/// Conflicts reported by the children themselves.
fn nested_conflicts<'a>(tasks: impl IntoIterator<Item = &'a BoxedTask>) -> Vec<Conflict> {
    tasks.into_iter().flat_map(|t| t.conflicts()).collect()
}

/// Pairs of concurrent siblings sharing a resource, followed by the
/// children's own conflicts.
fn sibling_conflicts(group: &str, tasks: &[&BoxedTask]) -> Vec<Conflict> {
    let mut conflicts = Vec::new();
    for (i, first) in tasks.iter().enumerate() {
        let first_reqs = first.requirements();
        for second in &tasks[i + 1..] {
            let shared = first_reqs.overlap(&second.requirements());
            if !shared.is_empty() {
                conflicts.push(Conflict {
                    group: group.to_string(),
                    first: first.name().to_string(),
                    second: second.name().to_string(),
                    shared,
                });
            }
        }
    }
    conflicts.extend(nested_conflicts(tasks.iter().copied()));
    conflicts
}
