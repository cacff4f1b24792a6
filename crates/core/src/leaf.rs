//! General-purpose leaf tasks.

use crate::outline::{Outline, TaskKind};
use crate::resource::{Requirements, Resource};
use crate::task::{BoxedTask, IntoTask, Task};
use crate::timer::{Clock, Timer, TimerHandle};
use std::rc::Rc;
use std::time::Duration;
use tracing::{info, warn};

/// Runs an action once when initialized, then finishes.
pub struct InstantTask {
    name: String,
    action: Box<dyn FnMut()>,
    requirements: Requirements,
}

impl InstantTask {
    /// Create an instant task.
    pub fn new(action: impl FnMut() + 'static) -> Self {
        Self {
            name: "InstantTask".to_string(),
            action: Box::new(action),
            requirements: Requirements::new(),
        }
    }

    /// Set the name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Declare a required resource.
    pub fn requires(mut self, resource: impl Into<Resource>) -> Self {
        self.requirements.insert(resource);
        self
    }
}

impl Task for InstantTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(&mut self) {
        (self.action)();
    }

    fn is_finished(&self) -> bool {
        true
    }

    fn requirements(&self) -> Requirements {
        self.requirements.clone()
    }
}

/// Reports a message through the log and finishes.
#[derive(Debug, Clone)]
pub struct PrintTask {
    message: String,
    placeholder: bool,
}

impl PrintTask {
    /// Create a print task.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            placeholder: false,
        }
    }

    /// A print task standing in for a group that was given nothing to run.
    /// The message is logged as a warning.
    pub fn placeholder(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            placeholder: true,
        }
    }

    /// The message this task reports.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Task for PrintTask {
    fn name(&self) -> &str {
        "PrintTask"
    }

    fn initialize(&mut self) {
        if self.placeholder {
            warn!("{}", self.message);
        } else {
            info!("{}", self.message);
        }
    }

    fn is_finished(&self) -> bool {
        true
    }

    fn outline(&self) -> Outline {
        let outline = Outline::leaf(self.name(), Requirements::new());
        if self.placeholder {
            outline.with_kind(TaskKind::Placeholder)
        } else {
            outline
        }
    }
}

/// Finishes once a fixed duration has passed since it was initialized.
#[derive(Debug)]
pub struct WaitTask {
    name: String,
    duration: Duration,
    timer: Timer,
}

impl WaitTask {
    /// Wait on the system clock.
    pub fn new(duration: Duration) -> Self {
        Self::with_timer(duration, Timer::new())
    }

    /// Wait on the given clock.
    pub fn with_clock(duration: Duration, clock: Rc<dyn Clock>) -> Self {
        Self::with_timer(duration, Timer::with_clock(clock))
    }

    fn with_timer(duration: Duration, timer: Timer) -> Self {
        Self {
            name: format!("Wait({:?})", duration),
            duration,
            timer,
        }
    }

    /// Set the name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Task for WaitTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(&mut self) {
        self.timer.stop();
        self.timer.reset();
        self.timer.start();
    }

    fn is_finished(&self) -> bool {
        self.timer.has_elapsed(self.duration)
    }

    fn end(&mut self, _interrupted: bool) {
        self.timer.stop();
    }
}

/// Finishes as soon as a condition holds.
pub struct WaitUntilTask {
    name: String,
    condition: Box<dyn Fn() -> bool>,
}

impl WaitUntilTask {
    /// Wait until `condition` returns true.
    pub fn new(condition: impl Fn() -> bool + 'static) -> Self {
        Self {
            name: "WaitUntilTask".to_string(),
            condition: Box::new(condition),
        }
    }

    /// Wait until a shared timer reads at least `at`.
    ///
    /// Useful inside a timed group to line work up against the time since
    /// the group started.
    pub fn timer_reaches(timer: TimerHandle, at: Duration) -> Self {
        Self::new(move || timer.has_elapsed(at)).named(format!("WaitUntil({:?})", at))
    }

    /// Set the name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Task for WaitUntilTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_finished(&self) -> bool {
        (self.condition)()
    }
}

/// Runs an action every tick until interrupted.
pub struct RunTask {
    name: String,
    action: Box<dyn FnMut()>,
    on_end: Option<Box<dyn FnMut(bool)>>,
    requirements: Requirements,
}

impl RunTask {
    /// Create a task that repeats `action` every tick.
    pub fn new(action: impl FnMut() + 'static) -> Self {
        Self {
            name: "RunTask".to_string(),
            action: Box::new(action),
            on_end: None,
            requirements: Requirements::new(),
        }
    }

    /// Action to run when the task ends; receives the interrupted flag.
    pub fn on_end(mut self, on_end: impl FnMut(bool) + 'static) -> Self {
        self.on_end = Some(Box::new(on_end));
        self
    }

    /// Set the name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Declare a required resource.
    pub fn requires(mut self, resource: impl Into<Resource>) -> Self {
        self.requirements.insert(resource);
        self
    }
}

impl Task for RunTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&mut self) {
        (self.action)();
    }

    fn end(&mut self, interrupted: bool) {
        if let Some(on_end) = self.on_end.as_mut() {
            on_end(interrupted);
        }
    }

    fn requirements(&self) -> Requirements {
        self.requirements.clone()
    }
}

/// Picks one of two tasks when initialized and runs it.
///
/// Requires the union of both branches' resources, since either may run.
pub struct ConditionalTask {
    name: String,
    on_true: BoxedTask,
    on_false: BoxedTask,
    condition: Box<dyn Fn() -> bool>,
    selected: Option<bool>,
}

impl ConditionalTask {
    /// Run `on_true` if `condition` holds at initialize, else `on_false`.
    pub fn new(
        on_true: impl Task + 'static,
        on_false: impl Task + 'static,
        condition: impl Fn() -> bool + 'static,
    ) -> Self {
        Self {
            name: "ConditionalTask".to_string(),
            on_true: on_true.boxed(),
            on_false: on_false.boxed(),
            condition: Box::new(condition),
            selected: None,
        }
    }

    /// Build from already-erased branches, e.g. the result of a group
    /// entry point.
    pub fn from_parts(
        on_true: impl IntoTask,
        on_false: impl IntoTask,
        condition: impl Fn() -> bool + 'static,
    ) -> crate::Result<Self> {
        Ok(Self {
            name: "ConditionalTask".to_string(),
            on_true: on_true.into_task()?,
            on_false: on_false.into_task()?,
            condition: Box::new(condition),
            selected: None,
        })
    }

    /// Set the name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    fn active(&mut self) -> Option<&mut BoxedTask> {
        match self.selected? {
            true => Some(&mut self.on_true),
            false => Some(&mut self.on_false),
        }
    }
}

impl Task for ConditionalTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(&mut self) {
        self.selected = Some((self.condition)());
        if let Some(task) = self.active() {
            task.initialize();
        }
    }

    fn execute(&mut self) {
        if let Some(task) = self.active() {
            task.execute();
        }
    }

    fn is_finished(&self) -> bool {
        match self.selected {
            Some(true) => self.on_true.is_finished(),
            Some(false) => self.on_false.is_finished(),
            None => false,
        }
    }

    fn end(&mut self, interrupted: bool) {
        if let Some(task) = self.active() {
            task.end(interrupted);
        }
        self.selected = None;
    }

    fn requirements(&self) -> Requirements {
        self.on_true.requirements().union(&self.on_false.requirements())
    }

    fn conflicts(&self) -> Vec<crate::Conflict> {
        let mut conflicts = self.on_true.conflicts();
        conflicts.extend(self.on_false.conflicts());
        conflicts
    }

    fn outline(&self) -> Outline {
        let mut outline =
            Outline::leaf(self.name(), self.requirements()).with_kind(TaskKind::Conditional);
        outline.children = vec![self.on_true.outline(), self.on_false.outline()];
        outline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::ManualClock;
    use std::cell::{Cell, RefCell};

    #[test]
    fn test_instant_task_runs_once_and_finishes() {
        let count = Rc::new(Cell::new(0));
        let counter = count.clone();
        let mut task = InstantTask::new(move || counter.set(counter.get() + 1)).requires("indexer");

        task.initialize();
        assert!(task.is_finished());
        assert_eq!(count.get(), 1);
        assert!(task.requirements().contains(&Resource::new("indexer")));
    }

    #[test]
    fn test_wait_task_uses_its_clock() {
        let clock = ManualClock::new();
        let mut task = WaitTask::with_clock(Duration::from_millis(100), Rc::new(clock.clone()));

        task.initialize();
        assert!(!task.is_finished());
        clock.advance(Duration::from_millis(99));
        assert!(!task.is_finished());
        clock.advance(Duration::from_millis(1));
        assert!(task.is_finished());
    }

    #[test]
    fn test_wait_task_restarts_on_initialize() {
        let clock = ManualClock::new();
        let mut task = WaitTask::with_clock(Duration::from_millis(100), Rc::new(clock.clone()));

        task.initialize();
        clock.advance(Duration::from_millis(150));
        assert!(task.is_finished());
        task.end(false);

        task.initialize();
        assert!(!task.is_finished());
    }

    #[test]
    fn test_wait_until_timer_reaches() {
        let clock = ManualClock::new();
        let timer = TimerHandle::with_clock(Rc::new(clock.clone()));
        let task = WaitUntilTask::timer_reaches(timer.clone(), Duration::from_secs(2));

        timer.restart();
        clock.advance(Duration::from_secs(1));
        assert!(!task.is_finished());
        clock.advance(Duration::from_secs(1));
        assert!(task.is_finished());
    }

    #[test]
    fn test_run_task_reports_interrupt() {
        let ticks = Rc::new(Cell::new(0));
        let ended = Rc::new(RefCell::new(None));
        let (t, e) = (ticks.clone(), ended.clone());
        let mut task = RunTask::new(move || t.set(t.get() + 1)).on_end(move |i| *e.borrow_mut() = Some(i));

        task.initialize();
        task.execute();
        task.execute();
        assert!(!task.is_finished());
        task.end(true);

        assert_eq!(ticks.get(), 2);
        assert_eq!(*ended.borrow(), Some(true));
    }

    #[test]
    fn test_conditional_picks_branch_at_initialize() {
        let flag = Rc::new(Cell::new(false));
        let f = flag.clone();
        let mut task = ConditionalTask::new(
            RunTask::new(|| {}).requires("shooter"),
            InstantTask::new(|| {}).requires("indexer"),
            move || f.get(),
        );

        task.initialize();
        assert!(task.is_finished());
        task.end(false);

        flag.set(true);
        task.initialize();
        assert!(!task.is_finished());
        assert_eq!(task.requirements().len(), 2);
        let outline = task.outline();
        assert_eq!(outline.kind, TaskKind::Conditional);
        assert_eq!(outline.children.len(), 2);
    }

    #[test]
    fn test_placeholder_outline_kind() {
        let task = PrintTask::placeholder("nothing to run");
        assert_eq!(task.outline().kind, TaskKind::Placeholder);
        assert_eq!(task.message(), "nothing to run");
        assert_eq!(PrintTask::new("hi").outline().kind, TaskKind::Leaf);
    }
}
