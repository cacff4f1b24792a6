//! Entry points for declaring task trees.
//!
//! Each entry point creates a fresh builder, hands it to the caller's
//! population closure, and finalizes it. Entry points nest freely: a child
//! in any builder may be the result of another entry point.
//!
//! ```
//! use std::time::Duration;
//! use taskweave_compose::{deadline, parallel, sequential, timed};
//! use taskweave_core::{InstantTask, PrintTask, RunTask, Task, WaitTask};
//!
//! let auto = timed(|t| {
//!     t.add_child(sequential(|s| {
//!         s.add_child(InstantTask::new(|| {}).named("lower-intake"));
//!         s.add_child(deadline(|d| {
//!             d.designate_primary(WaitTask::new(Duration::from_secs(2)));
//!             d.add_child(RunTask::new(|| {}).named("spin-up"));
//!         }));
//!         s.add_child(parallel(|p| {
//!             p.add_child(PrintTask::new("fire"));
//!             p.add_child(PrintTask::new("log"));
//!         }));
//!     }));
//! })
//! .unwrap();
//!
//! assert_eq!(auto.outline().depth(), 4);
//! ```

use crate::builder::{
    DeadlineBuilder, GroupBuilder, ParallelBuilder, RaceBuilder, SequentialBuilder, TimedBuilder,
};
use crate::factory::{CompositeFactory, StandardFactory};
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use taskweave_core::{BoxedTask, Clock, Result, SystemClock, TimerHandle};
use tracing::debug;

/// What happens when a single slot (deadline or root) is assigned twice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotPolicy {
    /// The later assignment replaces the earlier one; a warning is logged.
    #[default]
    Overwrite,
    /// The build fails with `DuplicatePrimary`.
    Strict,
}

/// Builder configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposeConfig {
    /// Handling of repeated single-slot assignments
    #[serde(default)]
    pub slot_policy: SlotPolicy,
}

impl ComposeConfig {
    /// Configuration that rejects repeated slot assignments.
    pub fn strict() -> Self {
        Self {
            slot_policy: SlotPolicy::Strict,
        }
    }

    /// Set the slot policy.
    pub fn with_slot_policy(mut self, policy: SlotPolicy) -> Self {
        self.slot_policy = policy;
        self
    }

    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// The factory, configuration and clock a builder works with.
///
/// Cheap to copy; every builder keeps one so nested groups are built the
/// same way as their parent.
#[derive(Clone, Copy)]
pub struct Scope<'f> {
    factory: &'f dyn CompositeFactory,
    config: &'f ComposeConfig,
    clock: &'f Rc<dyn Clock>,
}

impl<'f> Scope<'f> {
    /// Factory used to assemble composites.
    pub fn factory(&self) -> &'f dyn CompositeFactory {
        self.factory
    }

    /// Slot policy in effect.
    pub fn slot_policy(&self) -> SlotPolicy {
        self.config.slot_policy
    }

    /// A stopped, zeroed timer on this scope's clock.
    pub fn new_timer(&self) -> TimerHandle {
        TimerHandle::with_clock(Rc::clone(self.clock))
    }

    fn compose<B: GroupBuilder<'f>>(self, populate: impl FnOnce(&mut B)) -> Result<BoxedTask> {
        debug!("Declaring {} group", B::STRATEGY);
        let mut builder = B::new(self);
        populate(&mut builder);
        builder.build()
    }

    /// Declare a sequential group.
    pub fn sequential(self, populate: impl FnOnce(&mut SequentialBuilder<'f>)) -> Result<BoxedTask> {
        self.compose(populate)
    }

    /// Declare a group that finishes when all children have finished.
    pub fn parallel(self, populate: impl FnOnce(&mut ParallelBuilder<'f>)) -> Result<BoxedTask> {
        self.compose(populate)
    }

    /// Declare a group that finishes when any child has finished.
    pub fn race(self, populate: impl FnOnce(&mut RaceBuilder<'f>)) -> Result<BoxedTask> {
        self.compose(populate)
    }

    /// Declare a group that finishes when its deadline child has finished.
    pub fn deadline(self, populate: impl FnOnce(&mut DeadlineBuilder<'f>)) -> Result<BoxedTask> {
        self.compose(populate)
    }

    /// Declare a timed group around a single root.
    pub fn timed(self, populate: impl FnOnce(&mut TimedBuilder<'f>)) -> Result<BoxedTask> {
        self.compose(populate)
    }
}

/// Owns the factory, configuration and clock used by builders.
///
/// The free functions ([`sequential`], [`parallel`], …) use
/// `Composer::default()`; construct one explicitly to change any of the
/// three.
pub struct Composer<F = StandardFactory> {
    factory: F,
    config: ComposeConfig,
    clock: Rc<dyn Clock>,
}

impl Composer<StandardFactory> {
    /// Standard composites, default configuration, system clock.
    pub fn new() -> Self {
        Self::with_factory(StandardFactory)
    }
}

impl Default for Composer<StandardFactory> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: CompositeFactory> Composer<F> {
    /// Build composites with a custom factory.
    pub fn with_factory(factory: F) -> Self {
        Self {
            factory,
            config: ComposeConfig::default(),
            clock: Rc::new(SystemClock::new()),
        }
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: ComposeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the clock behind every builder timer.
    pub fn with_clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Current configuration.
    pub fn config(&self) -> &ComposeConfig {
        &self.config
    }

    /// Scope for builders created by this composer.
    pub fn scope(&self) -> Scope<'_> {
        Scope {
            factory: &self.factory,
            config: &self.config,
            clock: &self.clock,
        }
    }

    /// Declare a sequential group.
    pub fn sequential<'a>(&'a self, populate: impl FnOnce(&mut SequentialBuilder<'a>)) -> Result<BoxedTask> {
        self.scope().sequential(populate)
    }

    /// Declare a group that finishes when all children have finished.
    pub fn parallel<'a>(&'a self, populate: impl FnOnce(&mut ParallelBuilder<'a>)) -> Result<BoxedTask> {
        self.scope().parallel(populate)
    }

    /// Declare a group that finishes when any child has finished.
    pub fn race<'a>(&'a self, populate: impl FnOnce(&mut RaceBuilder<'a>)) -> Result<BoxedTask> {
        self.scope().race(populate)
    }

    /// Declare a group that finishes when its deadline child has finished.
    pub fn deadline<'a>(&'a self, populate: impl FnOnce(&mut DeadlineBuilder<'a>)) -> Result<BoxedTask> {
        self.scope().deadline(populate)
    }

    /// Declare a timed group around a single root.
    pub fn timed<'a>(&'a self, populate: impl FnOnce(&mut TimedBuilder<'a>)) -> Result<BoxedTask> {
        self.scope().timed(populate)
    }
}

/// Declare a group that runs its children one after another.
pub fn sequential(populate: impl FnOnce(&mut SequentialBuilder<'_>)) -> Result<BoxedTask> {
    Composer::new().sequential(populate)
}

/// Declare a group that runs its children together until all finish.
pub fn parallel(populate: impl FnOnce(&mut ParallelBuilder<'_>)) -> Result<BoxedTask> {
    Composer::new().parallel(populate)
}

/// Declare a group that runs its children together until one finishes.
pub fn race(populate: impl FnOnce(&mut RaceBuilder<'_>)) -> Result<BoxedTask> {
    Composer::new().race(populate)
}

/// Declare a group that runs its children together until the designated
/// deadline finishes. Fails if no deadline is designated.
pub fn deadline(populate: impl FnOnce(&mut DeadlineBuilder<'_>)) -> Result<BoxedTask> {
    Composer::new().deadline(populate)
}

/// Declare a timed group: the group restarts its timer when it starts and
/// then runs the single root task.
pub fn timed(populate: impl FnOnce(&mut TimedBuilder<'_>)) -> Result<BoxedTask> {
    Composer::new().timed(populate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use taskweave_core::testing::{Journal, ScriptedTask};
    use taskweave_core::{BuildError, CompositionStrategy, ManualClock, Task, TaskKind, WaitUntilTask};

    /// Drive a task the way a scheduler would until it finishes.
    fn run_to_completion(task: &mut BoxedTask, max_ticks: usize) -> usize {
        task.initialize();
        for tick in 1..=max_ticks {
            task.execute();
            if task.is_finished() {
                task.end(false);
                return tick;
            }
        }
        panic!("task did not finish within {} ticks", max_ticks);
    }

    #[test]
    fn test_sequential_round_trips_declared_order() {
        let journal = Journal::new();
        let names: Vec<String> = (0..6).map(|i| format!("step-{}", i)).collect();

        let mut task = sequential(|s| {
            for name in &names {
                s.add_child(ScriptedTask::new(name.clone(), &journal).finish_after(1));
            }
        })
        .unwrap();

        assert_eq!(task.outline().child_names(), names.iter().map(String::as_str).collect::<Vec<_>>());
        run_to_completion(&mut task, 10);
        assert_eq!(journal.initialized(), names);
    }

    #[test]
    fn test_deadline_without_designation_is_missing_primary() {
        let journal = Journal::new();
        let err = deadline(|d| {
            d.add_child(ScriptedTask::new("a", &journal));
            d.add_child(ScriptedTask::new("b", &journal));
        })
        .err();

        assert_eq!(
            err,
            Some(BuildError::MissingPrimary {
                strategy: CompositionStrategy::ParallelDeadline,
                slot: "deadline",
            })
        );
    }

    #[test]
    fn test_deadline_finishing_first_finishes_group() {
        let journal = Journal::new();
        let d = ScriptedTask::new("D", &journal);
        let finish_d = d.switch();

        let mut task = deadline(|g| {
            g.designate_primary(d);
            g.add_child(ScriptedTask::new("A", &journal));
            g.add_child(ScriptedTask::new("B", &journal));
        })
        .unwrap();

        task.initialize();
        task.execute();
        assert!(!task.is_finished());

        finish_d.finish();
        task.execute();
        assert!(task.is_finished());
        task.end(false);

        assert_eq!(journal.ends("D"), vec![false]);
        assert_eq!(journal.ends("A"), vec![true]);
        assert_eq!(journal.ends("B"), vec![true]);
    }

    #[test]
    fn test_other_finishing_first_leaves_deadline_running() {
        let journal = Journal::new();
        let a = ScriptedTask::new("A", &journal);
        let finish_a = a.switch();

        let mut task = deadline(|g| {
            g.designate_primary(ScriptedTask::new("D", &journal));
            g.add_child(a);
            g.add_child(ScriptedTask::new("B", &journal));
        })
        .unwrap();

        task.initialize();
        finish_a.finish();
        task.execute();
        task.execute();

        assert!(!task.is_finished());
        assert!(journal.ends("D").is_empty());
        assert!(journal.ends("B").is_empty());
    }

    #[test]
    fn test_race_interrupts_exactly_the_losers() {
        let journal = Journal::new();
        let tasks: Vec<ScriptedTask> = ["A", "B", "C"]
            .into_iter()
            .map(|n| ScriptedTask::new(n, &journal))
            .collect();
        let finish_b = tasks[1].switch();

        let mut task = race(|r| {
            for t in tasks {
                r.add_child(t);
            }
        })
        .unwrap();

        task.initialize();
        task.execute();
        finish_b.finish();
        task.execute();
        assert!(task.is_finished());
        task.end(false);

        assert_eq!(journal.ends("A"), vec![true]);
        assert_eq!(journal.ends("B"), vec![false]);
        assert_eq!(journal.ends("C"), vec![true]);
    }

    #[test]
    fn test_timed_without_root_is_harmless() {
        let mut task = timed(|_| {}).unwrap();
        let outline = task.outline();
        assert_eq!(outline.kind, TaskKind::Composite(CompositionStrategy::Timed));
        assert!(outline.requirements.is_empty());
        let root = outline.primary_child();
        assert_eq!(root.map(|c| c.kind), Some(TaskKind::Placeholder));
        assert_eq!(root.map(|c| c.requirements.is_empty()), Some(true));

        let ticks = run_to_completion(&mut task, 5);
        assert_eq!(ticks, 2);
    }

    #[test]
    fn test_timed_root_reads_time_since_group_start() {
        let clock = ManualClock::new();
        let composer = Composer::new().with_clock(Rc::new(clock.clone()));
        let journal = Journal::new();

        let mut task = composer
            .timed(|t| {
                let timer = t.timer();
                t.add_child(t.sequential(|s| {
                    s.add_child(WaitUntilTask::timer_reaches(timer, Duration::from_secs(1)));
                    s.add_child(ScriptedTask::new("after", &journal).finish_after(1));
                }));
            })
            .unwrap();

        clock.advance(Duration::from_secs(30));
        task.initialize();
        task.execute();
        task.execute();
        assert!(!journal.was_initialized("after"));

        clock.advance(Duration::from_secs(1));
        task.execute();
        assert!(journal.was_initialized("after"));
        task.execute();
        task.execute();
        assert!(task.is_finished());
    }

    #[test]
    fn test_timed_run_for_cuts_root_short() {
        let clock = ManualClock::new();
        let composer = Composer::new().with_clock(Rc::new(clock.clone()));
        let journal = Journal::new();

        let mut task = composer
            .timed(|t| {
                t.add_child(ScriptedTask::new("forever", &journal));
                t.run_for(Duration::from_millis(500));
            })
            .unwrap();

        task.initialize();
        task.execute();
        task.execute();
        assert!(!task.is_finished());

        clock.advance(Duration::from_millis(500));
        task.execute();
        task.execute();
        assert!(task.is_finished());
        assert_eq!(journal.ends("forever"), vec![true]);
    }

    #[test]
    fn test_nested_parallel_matches_hand_built_tree() {
        use crate::groups::{ParallelGroup, SequentialGroup};

        fn script(journal: &Journal) -> [ScriptedTask; 3] {
            [
                ScriptedTask::new("left", journal).finish_after(2),
                ScriptedTask::new("right", journal).finish_after(1),
                ScriptedTask::new("then", journal).finish_after(1),
            ]
        }

        let built_journal = Journal::new();
        let [left, right, then] = script(&built_journal);
        let mut built = sequential(|s| {
            s.add_child(parallel(|p| {
                p.add_child(left);
                p.add_child(right);
            }));
            s.add_child(then);
        })
        .unwrap();

        let manual_journal = Journal::new();
        let [left, right, then] = script(&manual_journal);
        let mut manual: BoxedTask = SequentialGroup::new(
            "sequential",
            vec![
                ParallelGroup::new("parallel_all", vec![left.boxed(), right.boxed()]).boxed(),
                then.boxed(),
            ],
        )
        .boxed();

        assert_eq!(built.outline(), manual.outline());
        let built_ticks = run_to_completion(&mut built, 10);
        let manual_ticks = run_to_completion(&mut manual, 10);
        assert_eq!(built_ticks, manual_ticks);
        assert_eq!(built_journal.calls(), manual_journal.calls());
        assert_eq!(built_journal.initialized(), vec!["left", "right", "then"]);
    }

    #[test]
    fn test_builder_timer_restarts_with_group() {
        let clock = ManualClock::new();
        let composer = Composer::new().with_clock(Rc::new(clock.clone()));
        let mut handle = None;

        let mut task = composer
            .race(|r| {
                handle = Some(r.timer());
                r.add_child(WaitUntilTask::timer_reaches(r.timer(), Duration::from_secs(3)));
            })
            .unwrap();
        let timer = handle.unwrap();

        clock.advance(Duration::from_secs(10));
        assert!(!timer.is_running());
        task.initialize();
        assert_eq!(timer.elapsed(), Duration::ZERO);

        clock.advance(Duration::from_secs(3));
        task.execute();
        assert!(task.is_finished());
    }

    #[test]
    fn test_config_from_json_defaults() {
        assert_eq!(ComposeConfig::from_json("{}").unwrap(), ComposeConfig::default());
        assert_eq!(
            ComposeConfig::from_json(r#"{"slot_policy":"strict"}"#).unwrap(),
            ComposeConfig::strict()
        );
        assert_eq!(
            ComposeConfig::default().with_slot_policy(SlotPolicy::Strict),
            ComposeConfig::strict()
        );

        let composer = Composer::new().with_config(ComposeConfig::strict());
        assert_eq!(composer.config().slot_policy, SlotPolicy::Strict);
        assert_eq!(composer.scope().slot_policy(), SlotPolicy::Strict);
    }
}
