//! Run children together until a designated one finishes.

use super::{sibling_conflicts, union_requirements, Member};
use taskweave_core::{BoxedTask, CompositionStrategy, Conflict, Outline, Requirements, Task};

/// Starts the deadline and the other children together; finishes when the
/// deadline finishes, whatever state the others are in.
///
/// Others that finish first are ended and dropped from polling without
/// finishing the group. When the deadline finishes, every other child
/// still running is force-terminated on that tick.
pub struct DeadlineGroup {
    name: String,
    // Index 0 is the deadline.
    members: Vec<Member>,
    started: bool,
    finished: bool,
}

impl DeadlineGroup {
    /// Create a group whose completion follows `deadline`.
    pub fn new(name: impl Into<String>, deadline: BoxedTask, others: Vec<BoxedTask>) -> Self {
        let members = std::iter::once(deadline)
            .chain(others)
            .map(Member::new)
            .collect();
        Self {
            name: name.into(),
            members,
            started: false,
            finished: false,
        }
    }

    /// Name of the deadline child.
    pub fn deadline_name(&self) -> &str {
        self.members[0].task.name()
    }

    fn stop_all(&mut self) {
        for member in &mut self.members {
            member.stop(true);
        }
    }
}

impl Task for DeadlineGroup {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(&mut self) {
        self.started = true;
        self.finished = false;
        for member in &mut self.members {
            member.start();
        }
    }

    fn execute(&mut self) {
        if self.finished {
            return;
        }
        if self.members[0].poll() {
            self.finished = true;
            self.stop_all();
            return;
        }
        for member in &mut self.members[1..] {
            member.poll();
        }
    }

    fn is_finished(&self) -> bool {
        self.started && self.finished
    }

    fn end(&mut self, interrupted: bool) {
        if interrupted {
            self.stop_all();
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
        let children = self
            .members
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let outline = m.task.outline();
                if i == 0 {
                    outline.as_primary()
                } else {
                    outline
                }
            })
            .collect();
        Outline::composite(
            &self.name,
            CompositionStrategy::ParallelDeadline,
            self.requirements(),
            children,
        )
    }
}
