//! Builders that collect the children of one composite.
//!
//! A builder is created fresh for each nesting level, filled by the
//! caller's population closure, and consumed by [`GroupBuilder::build`].
//! Because `build` takes the builder by value, a finalized builder cannot
//! be used again:
//!
//! ```compile_fail
//! use taskweave_compose::{Composer, GroupBuilder, SequentialBuilder};
//!
//! let composer = Composer::new();
//! let builder = SequentialBuilder::new(composer.scope());
//! let first = builder.build();
//! let second = builder.build(); // error: use of moved value
//! ```

use crate::dsl::{Scope, SlotPolicy};
use crate::strategy::{assemble, Parts};
use std::cell::Cell;
use std::time::Duration;
use taskweave_core::{BoxedTask, BuildError, CompositionStrategy, IntoTask, Result, TimerHandle};
use tracing::{debug, warn};

/// State shared by every builder: children, the single slot, the timer,
/// and the first error reported by a nested group.
struct Accumulator<'f> {
    strategy: CompositionStrategy,
    scope: Scope<'f>,
    name: Option<String>,
    children: Vec<BoxedTask>,
    primary: Option<BoxedTask>,
    reassigned: bool,
    error: Option<BuildError>,
    timer: TimerHandle,
    timer_used: Cell<bool>,
    run_for: Option<Duration>,
}

impl<'f> Accumulator<'f> {
    fn new(strategy: CompositionStrategy, scope: Scope<'f>) -> Self {
        Self {
            strategy,
            scope,
            name: None,
            children: Vec::new(),
            primary: None,
            reassigned: false,
            error: None,
            timer: scope.new_timer(),
            timer_used: Cell::new(false),
            run_for: None,
        }
    }

    fn accept(&mut self, task: impl IntoTask) -> Option<BoxedTask> {
        match task.into_task() {
            Ok(task) => Some(task),
            Err(err) => {
                debug!("{} group received a failed nested group: {}", self.strategy, err);
                // The first failure is the one reported.
                self.error.get_or_insert(err);
                None
            }
        }
    }

    fn push(&mut self, task: impl IntoTask) {
        if let Some(task) = self.accept(task) {
            self.children.push(task);
        }
    }

    fn set_primary(&mut self, task: impl IntoTask) {
        let Some(task) = self.accept(task) else {
            return;
        };
        let incoming = task.name().to_string();
        if let Some(previous) = self.primary.replace(task) {
            self.reassigned = true;
            warn!(
                "{} group: {} task '{}' replaced by '{}'",
                self.strategy,
                self.slot(),
                previous.name(),
                incoming
            );
        }
    }

    fn slot(&self) -> &'static str {
        self.strategy.primary_slot().unwrap_or("primary")
    }

    fn timer(&self) -> TimerHandle {
        self.timer_used.set(true);
        self.timer.clone()
    }

    fn finish(self) -> Result<BoxedTask> {
        if let Some(source) = self.error {
            return Err(BuildError::Nested {
                strategy: self.strategy,
                source: Box::new(source),
            });
        }
        if self.reassigned && self.scope.slot_policy() == SlotPolicy::Strict {
            return Err(BuildError::DuplicatePrimary {
                strategy: self.strategy,
                slot: self.slot(),
            });
        }

        let strategy = self.strategy;
        let parts = Parts {
            name: self.name,
            children: self.children,
            primary: self.primary,
            timer: self.timer,
            timer_used: self.timer_used.get(),
            run_for: self.run_for,
        };
        assemble(strategy, self.scope.factory(), parts)
    }
}

/// Common surface of every builder.
///
/// Besides finalization, it offers the nested entry points so a group can
/// be declared inside another with the same factory and configuration:
///
/// ```
/// use taskweave_compose::{sequential, GroupBuilder};
/// use taskweave_core::{PrintTask, Task};
///
/// let task = sequential(|s| {
///     s.add_child(PrintTask::new("first"));
///     s.add_child(s.parallel(|p| {
///         p.add_child(PrintTask::new("left"));
///         p.add_child(PrintTask::new("right"));
///     }));
/// })
/// .unwrap();
/// assert_eq!(task.outline().leaf_names(), vec!["PrintTask"; 3]);
/// ```
pub trait GroupBuilder<'f>: Sized {
    /// Strategy this builder finalizes into.
    const STRATEGY: CompositionStrategy;

    /// A fresh, empty builder.
    fn new(scope: Scope<'f>) -> Self;

    /// Factory and configuration this builder was created with.
    fn scope(&self) -> Scope<'f>;

    /// Finalize into a single task, consuming the builder.
    fn build(self) -> Result<BoxedTask>;

    /// Declare a nested sequential group.
    fn sequential(&self, populate: impl FnOnce(&mut SequentialBuilder<'f>)) -> Result<BoxedTask> {
        self.scope().sequential(populate)
    }

    /// Declare a nested parallel group.
    fn parallel(&self, populate: impl FnOnce(&mut ParallelBuilder<'f>)) -> Result<BoxedTask> {
        self.scope().parallel(populate)
    }

    /// Declare a nested race group.
    fn race(&self, populate: impl FnOnce(&mut RaceBuilder<'f>)) -> Result<BoxedTask> {
        self.scope().race(populate)
    }

    /// Declare a nested deadline group.
    fn deadline(&self, populate: impl FnOnce(&mut DeadlineBuilder<'f>)) -> Result<BoxedTask> {
        self.scope().deadline(populate)
    }

    /// Declare a nested timed group.
    fn timed(&self, populate: impl FnOnce(&mut TimedBuilder<'f>)) -> Result<BoxedTask> {
        self.scope().timed(populate)
    }
}

/// Collects children for a sequential group.
pub struct SequentialBuilder<'f> {
    acc: Accumulator<'f>,
}

impl SequentialBuilder<'_> {
    /// Append a child; children run in the order they are added.
    pub fn add_child(&mut self, task: impl IntoTask) -> &mut Self {
        self.acc.push(task);
        self
    }

    /// Name the group.
    pub fn named(&mut self, name: impl Into<String>) -> &mut Self {
        self.acc.name = Some(name.into());
        self
    }

    /// Timer restarted when this group initializes.
    pub fn timer(&self) -> TimerHandle {
        self.acc.timer()
    }

    /// Number of children added so far.
    pub fn len(&self) -> usize {
        self.acc.children.len()
    }

    /// Whether no child has been added.
    pub fn is_empty(&self) -> bool {
        self.acc.children.is_empty()
    }
}

impl<'f> GroupBuilder<'f> for SequentialBuilder<'f> {
    const STRATEGY: CompositionStrategy = CompositionStrategy::Sequential;

    fn new(scope: Scope<'f>) -> Self {
        Self {
            acc: Accumulator::new(Self::STRATEGY, scope),
        }
    }

    fn scope(&self) -> Scope<'f> {
        self.acc.scope
    }

    fn build(self) -> Result<BoxedTask> {
        self.acc.finish()
    }
}

/// Collects children for a group that finishes when all have finished.
pub struct ParallelBuilder<'f> {
    acc: Accumulator<'f>,
}

impl ParallelBuilder<'_> {
    /// Add a child to run alongside the others.
    pub fn add_child(&mut self, task: impl IntoTask) -> &mut Self {
        self.acc.push(task);
        self
    }

    /// Name the group.
    pub fn named(&mut self, name: impl Into<String>) -> &mut Self {
        self.acc.name = Some(name.into());
        self
    }

    /// Timer restarted when this group initializes.
    pub fn timer(&self) -> TimerHandle {
        self.acc.timer()
    }

    /// Number of children added so far.
    pub fn len(&self) -> usize {
        self.acc.children.len()
    }

    /// Whether no child has been added.
    pub fn is_empty(&self) -> bool {
        self.acc.children.is_empty()
    }
}

impl<'f> GroupBuilder<'f> for ParallelBuilder<'f> {
    const STRATEGY: CompositionStrategy = CompositionStrategy::ParallelAll;

    fn new(scope: Scope<'f>) -> Self {
        Self {
            acc: Accumulator::new(Self::STRATEGY, scope),
        }
    }

    fn scope(&self) -> Scope<'f> {
        self.acc.scope
    }

    fn build(self) -> Result<BoxedTask> {
        self.acc.finish()
    }
}

/// Collects children for a group that finishes when the first one does.
pub struct RaceBuilder<'f> {
    acc: Accumulator<'f>,
}

impl RaceBuilder<'_> {
    /// Add a competitor.
    pub fn add_child(&mut self, task: impl IntoTask) -> &mut Self {
        self.acc.push(task);
        self
    }

    /// Name the group.
    pub fn named(&mut self, name: impl Into<String>) -> &mut Self {
        self.acc.name = Some(name.into());
        self
    }

    /// Timer restarted when this group initializes.
    pub fn timer(&self) -> TimerHandle {
        self.acc.timer()
    }

    /// Number of children added so far.
    pub fn len(&self) -> usize {
        self.acc.children.len()
    }

    /// Whether no child has been added.
    pub fn is_empty(&self) -> bool {
        self.acc.children.is_empty()
    }
}

impl<'f> GroupBuilder<'f> for RaceBuilder<'f> {
    const STRATEGY: CompositionStrategy = CompositionStrategy::ParallelRace;

    fn new(scope: Scope<'f>) -> Self {
        Self {
            acc: Accumulator::new(Self::STRATEGY, scope),
        }
    }

    fn scope(&self) -> Scope<'f> {
        self.acc.scope
    }

    fn build(self) -> Result<BoxedTask> {
        self.acc.finish()
    }
}

/// Collects a deadline task and the children that run until it finishes.
///
/// Finalizing without a deadline fails with [`BuildError::MissingPrimary`].
pub struct DeadlineBuilder<'f> {
    acc: Accumulator<'f>,
}

impl DeadlineBuilder<'_> {
    /// Add a child that is cut short when the deadline finishes.
    pub fn add_child(&mut self, task: impl IntoTask) -> &mut Self {
        self.acc.push(task);
        self
    }

    /// Set the task whose completion finishes the group.
    ///
    /// A second call replaces the first (logged as a warning), or fails
    /// the build under [`SlotPolicy::Strict`].
    pub fn designate_primary(&mut self, task: impl IntoTask) -> &mut Self {
        self.acc.set_primary(task);
        self
    }

    /// Name the group.
    pub fn named(&mut self, name: impl Into<String>) -> &mut Self {
        self.acc.name = Some(name.into());
        self
    }

    /// Timer restarted when this group initializes.
    pub fn timer(&self) -> TimerHandle {
        self.acc.timer()
    }

    /// Whether a deadline has been designated.
    pub fn has_deadline(&self) -> bool {
        self.acc.primary.is_some()
    }
}

impl<'f> GroupBuilder<'f> for DeadlineBuilder<'f> {
    const STRATEGY: CompositionStrategy = CompositionStrategy::ParallelDeadline;

    fn new(scope: Scope<'f>) -> Self {
        Self {
            acc: Accumulator::new(Self::STRATEGY, scope),
        }
    }

    fn scope(&self) -> Scope<'f> {
        self.acc.scope
    }

    fn build(self) -> Result<BoxedTask> {
        self.acc.finish()
    }
}

/// Collects the single root of a timed group.
///
/// The finalized group restarts its timer, then runs the root. Without a
/// root it degrades to a placeholder that only logs a diagnostic.
pub struct TimedBuilder<'f> {
    acc: Accumulator<'f>,
}

impl TimedBuilder<'_> {
    /// Set the root task. The slot holds one task; a later call replaces
    /// an earlier one.
    pub fn add_child(&mut self, task: impl IntoTask) -> &mut Self {
        self.acc.set_primary(task);
        self
    }

    /// Same as [`TimedBuilder::add_child`].
    pub fn designate_primary(&mut self, task: impl IntoTask) -> &mut Self {
        self.acc.set_primary(task);
        self
    }

    /// Stop the root once the group has run for `limit`.
    pub fn run_for(&mut self, limit: Duration) -> &mut Self {
        self.acc.run_for = Some(limit);
        self
    }

    /// Name the group.
    pub fn named(&mut self, name: impl Into<String>) -> &mut Self {
        self.acc.name = Some(name.into());
        self
    }

    /// Timer restarted when this group initializes; tasks inside the
    /// group read it to learn how long the group has been running.
    pub fn timer(&self) -> TimerHandle {
        self.acc.timer()
    }

    /// Whether a root has been set.
    pub fn has_root(&self) -> bool {
        self.acc.primary.is_some()
    }
}

impl<'f> GroupBuilder<'f> for TimedBuilder<'f> {
    const STRATEGY: CompositionStrategy = CompositionStrategy::Timed;

    fn new(scope: Scope<'f>) -> Self {
        Self {
            acc: Accumulator::new(Self::STRATEGY, scope),
        }
    }

    fn scope(&self) -> Scope<'f> {
        self.acc.scope
    }

    fn build(self) -> Result<BoxedTask> {
        self.acc.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::{ComposeConfig, Composer};
    use taskweave_core::testing::{Journal, ScriptedTask};
    use taskweave_core::{Task, TaskKind};

    #[test]
    fn test_sequential_preserves_add_order() {
        let journal = Journal::new();
        let composer = Composer::new();
        let names = ["e", "b", "d", "a", "c"];

        let mut builder = SequentialBuilder::new(composer.scope());
        for name in names {
            builder.add_child(ScriptedTask::new(name, &journal));
        }
        assert_eq!(builder.len(), 5);

        let task = builder.build().unwrap();
        assert_eq!(task.outline().child_names(), names.to_vec());
    }

    #[test]
    fn test_deadline_reassignment_is_last_write_wins() {
        let journal = Journal::new();
        let composer = Composer::new();

        let mut builder = DeadlineBuilder::new(composer.scope());
        assert!(!builder.has_deadline());
        builder
            .designate_primary(ScriptedTask::new("first", &journal))
            .designate_primary(ScriptedTask::new("second", &journal))
            .add_child(ScriptedTask::new("other", &journal));
        assert!(builder.has_deadline());

        let outline = builder.build().unwrap().outline();
        assert_eq!(outline.child_names(), vec!["second", "other"]);
    }

    #[test]
    fn test_strict_policy_rejects_reassignment() {
        let journal = Journal::new();
        let composer = Composer::new().with_config(ComposeConfig::strict());

        let mut builder = TimedBuilder::new(composer.scope());
        assert!(!builder.has_root());
        builder.add_child(ScriptedTask::new("first", &journal));
        builder.add_child(ScriptedTask::new("second", &journal));
        assert!(builder.has_root());

        assert_eq!(
            builder.build().err(),
            Some(BuildError::DuplicatePrimary {
                strategy: CompositionStrategy::Timed,
                slot: "root",
            })
        );
    }

    #[test]
    fn test_nested_error_surfaces_at_enclosing_build() {
        let journal = Journal::new();
        let composer = Composer::new();

        let mut builder = ParallelBuilder::new(composer.scope());
        builder.add_child(ScriptedTask::new("fine", &journal));
        builder.add_child(builder.deadline(|d| {
            d.add_child(ScriptedTask::new("orphan", &journal));
        }));
        // A failed child is not counted.
        assert_eq!(builder.len(), 1);

        let err = builder.build().err().unwrap();
        assert!(matches!(
            err,
            BuildError::Nested {
                strategy: CompositionStrategy::ParallelAll,
                ..
            }
        ));
        assert!(matches!(err.root_cause(), BuildError::MissingPrimary { .. }));
    }

    #[test]
    fn test_named_group() {
        let composer = Composer::new();
        let mut builder = RaceBuilder::new(composer.scope());
        builder.named("intake-or-timeout");
        let task = builder.build().unwrap();
        assert_eq!(task.name(), "intake-or-timeout");
        assert_eq!(task.outline().kind, TaskKind::Composite(CompositionStrategy::ParallelRace));
    }
}
