//! Composites that own a timer measuring time since they started.

use taskweave_core::{BoxedTask, CompositionStrategy, Conflict, Outline, Requirements, Task, TimerHandle};

/// A sequential group of `[reset timer, root]` presented as one timed node.
///
/// The reset step is the group's first child, so the timer restarts the
/// moment the group initializes and the root can read the time since
/// then.
pub struct TimedGroup {
    name: String,
    inner: BoxedTask,
    timer: TimerHandle,
}

impl TimedGroup {
    /// Wrap a sequential group whose first child resets `timer`.
    pub fn new(name: impl Into<String>, inner: BoxedTask, timer: TimerHandle) -> Self {
        Self {
            name: name.into(),
            inner,
            timer,
        }
    }

    /// The timer reset when this group starts.
    pub fn timer(&self) -> TimerHandle {
        self.timer.clone()
    }
}

impl Task for TimedGroup {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(&mut self) {
        self.inner.initialize();
    }

    fn execute(&mut self) {
        self.inner.execute();
    }

    fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    fn end(&mut self, interrupted: bool) {
        self.inner.end(interrupted);
        self.timer.stop();
    }

    fn requirements(&self) -> Requirements {
        self.inner.requirements()
    }

    fn conflicts(&self) -> Vec<Conflict> {
        self.inner.conflicts()
    }

    fn outline(&self) -> Outline {
        let mut children = self.inner.outline().children;
        if let Some(root) = children.pop() {
            children.push(root.as_primary());
        }
        Outline::composite(&self.name, CompositionStrategy::Timed, self.requirements(), children)
    }
}

/// Restarts a builder's timer when the wrapped composite initializes.
///
/// Used for groups other than timed ones whose builder handed its timer
/// out; transparent in outlines.
pub struct TimerScope {
    inner: BoxedTask,
    timer: TimerHandle,
}

impl TimerScope {
    /// Wrap `inner` so `timer` restarts with it.
    pub fn new(inner: BoxedTask, timer: TimerHandle) -> Self {
        Self { inner, timer }
    }
}

impl Task for TimerScope {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn initialize(&mut self) {
        self.timer.restart();
        self.inner.initialize();
    }

    fn execute(&mut self) {
        self.inner.execute();
    }

    fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    fn end(&mut self, interrupted: bool) {
        self.inner.end(interrupted);
        self.timer.stop();
    }

    fn requirements(&self) -> Requirements {
        self.inner.requirements()
    }

    fn conflicts(&self) -> Vec<Conflict> {
        self.inner.conflicts()
    }

    fn outline(&self) -> Outline {
        self.inner.outline()
    }
}
