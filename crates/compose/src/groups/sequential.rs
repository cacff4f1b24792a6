//! Run children one after another.

use super::{nested_conflicts, union_requirements};
use taskweave_core::{BoxedTask, CompositionStrategy, Conflict, Outline, Requirements, Task};

/// Runs each child to completion in declaration order.
///
/// Finishes when the last child finishes; an empty group finishes as soon
/// as it is polled. Interrupting the group interrupts only the child that
/// is currently running.
pub struct SequentialGroup {
    name: String,
    children: Vec<BoxedTask>,
    current: Option<usize>,
}

impl SequentialGroup {
    /// Create a group over `children`.
    pub fn new(name: impl Into<String>, children: Vec<BoxedTask>) -> Self {
        Self {
            name: name.into(),
            children,
            current: None,
        }
    }

    /// Index of the running child, if the group is active and not done.
    pub fn current_index(&self) -> Option<usize> {
        self.current.filter(|&i| i < self.children.len())
    }
}

impl Task for SequentialGroup {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(&mut self) {
        self.current = Some(0);
        if let Some(first) = self.children.first_mut() {
            first.initialize();
        }
    }

    fn execute(&mut self) {
        let Some(index) = self.current_index() else {
            return;
        };

        let child = &mut self.children[index];
        child.execute();
        if !child.is_finished() {
            return;
        }
        child.end(false);

        let next = index + 1;
        self.current = Some(next);
        if let Some(child) = self.children.get_mut(next) {
            child.initialize();
        }
    }

    fn is_finished(&self) -> bool {
        matches!(self.current, Some(i) if i >= self.children.len())
    }

    fn end(&mut self, interrupted: bool) {
        if interrupted {
            if let Some(index) = self.current_index() {
                self.children[index].end(true);
            }
        }
        self.current = None;
    }

    fn requirements(&self) -> Requirements {
        union_requirements(&self.children)
    }

    fn conflicts(&self) -> Vec<Conflict> {
        nested_conflicts(&self.children)
    }

    fn outline(&self) -> Outline {
        Outline::composite(
            &self.name,
            CompositionStrategy::Sequential,
            self.requirements(),
            self.children.iter().map(|c| c.outline()).collect(),
        )
    }
}
