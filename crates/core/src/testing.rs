//! Scripted probe tasks for exercising composites and schedulers.
//!
//! Available with the `testing` feature.

use crate::resource::{Requirements, Resource};
use crate::task::Task;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// A lifecycle call observed by a [`Journal`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// `initialize` was called
    Initialize(String),
    /// `execute` was called
    Execute(String),
    /// `end` was called
    End {
        /// Task name
        name: String,
        /// Interrupted flag passed to `end`
        interrupted: bool,
    },
}

/// Shared, ordered log of lifecycle calls.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    calls: Rc<RefCell<Vec<Call>>>,
}

impl Journal {
    /// An empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    /// Every call so far.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    /// Interrupted flags passed to `end` for `name`, in order.
    pub fn ends(&self, name: &str) -> Vec<bool> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::End { name: n, interrupted } if n == name => Some(*interrupted),
                _ => None,
            })
            .collect()
    }

    /// Number of `execute` calls for `name`.
    pub fn executions(&self, name: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, Call::Execute(n) if n == name))
            .count()
    }

    /// Names in the order they were initialized.
    pub fn initialized(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::Initialize(n) => Some(n.clone()),
                _ => None,
            })
            .collect()
    }

    /// Whether `name` has been initialized.
    pub fn was_initialized(&self, name: &str) -> bool {
        self.initialized().iter().any(|n| n == name)
    }
}

/// Lets a test decide when a [`ScriptedTask`] finishes.
#[derive(Debug, Clone, Default)]
pub struct FinishSwitch(Rc<Cell<bool>>);

impl FinishSwitch {
    /// Make the task report finished from now on.
    pub fn finish(&self) {
        self.0.set(true);
    }

    /// Whether the switch is thrown.
    pub fn is_set(&self) -> bool {
        self.0.get()
    }
}

/// A task that records its lifecycle and finishes on cue.
///
/// It finishes after a fixed number of `execute` calls, when its
/// [`FinishSwitch`] is thrown, or never.
#[derive(Debug)]
pub struct ScriptedTask {
    name: String,
    journal: Journal,
    switch: FinishSwitch,
    finish_after: Option<usize>,
    executed: usize,
    requirements: Requirements,
}

impl ScriptedTask {
    /// A task that never finishes on its own.
    pub fn new(name: impl Into<String>, journal: &Journal) -> Self {
        Self {
            name: name.into(),
            journal: journal.clone(),
            switch: FinishSwitch::default(),
            finish_after: None,
            executed: 0,
            requirements: Requirements::new(),
        }
    }

    /// Finish after `ticks` executions (zero finishes without executing).
    pub fn finish_after(mut self, ticks: usize) -> Self {
        self.finish_after = Some(ticks);
        self
    }

    /// Declare a required resource.
    pub fn requires(mut self, resource: impl Into<Resource>) -> Self {
        self.requirements.insert(resource);
        self
    }

    /// Switch that finishes this task.
    pub fn switch(&self) -> FinishSwitch {
        self.switch.clone()
    }
}

impl Task for ScriptedTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(&mut self) {
        self.executed = 0;
        self.journal.record(Call::Initialize(self.name.clone()));
    }

    fn execute(&mut self) {
        self.executed += 1;
        self.journal.record(Call::Execute(self.name.clone()));
    }

    fn is_finished(&self) -> bool {
        self.switch.is_set() || self.finish_after.is_some_and(|n| self.executed >= n)
    }

    fn end(&mut self, interrupted: bool) {
        self.journal.record(Call::End {
            name: self.name.clone(),
            interrupted,
        });
    }

    fn requirements(&self) -> Requirements {
        self.requirements.clone()
    }
}
