//! The fixed strategy → factory dispatch table.

use crate::factory::CompositeFactory;
use crate::groups::{TimedGroup, TimerScope};
use std::time::Duration;
use taskweave_core::{
    BoxedTask, BuildError, CompositionStrategy, InstantTask, PrintTask, Result, Task, TimerHandle,
    WaitUntilTask,
};
use tracing::{debug, warn};

/// Message reported by the placeholder that replaces a missing root.
pub const EMPTY_ROOT_MESSAGE: &str = "No tasks have been added to the timed group builder";

/// Everything a finalized builder hands over for assembly.
pub struct Parts {
    /// Group name; defaults to the strategy name
    pub name: Option<String>,
    /// Ordered children
    pub children: Vec<BoxedTask>,
    /// Distinguished child (deadline or root)
    pub primary: Option<BoxedTask>,
    /// The builder's timer
    pub timer: TimerHandle,
    /// Whether the builder's timer was handed out and must restart with
    /// the composite
    pub timer_used: bool,
    /// Upper bound on how long a timed root may run
    pub run_for: Option<Duration>,
}

impl Parts {
    /// Parts with only children set.
    pub fn new(children: Vec<BoxedTask>) -> Self {
        Self {
            name: None,
            children,
            primary: None,
            timer: TimerHandle::default(),
            timer_used: false,
            run_for: None,
        }
    }
}

/// Assemble the composite for `strategy` from `parts` through `factory`.
///
/// Each strategy maps to exactly one factory method; `Timed` is a
/// sequential group whose first step restarts the builder's timer.
pub fn assemble(
    strategy: CompositionStrategy,
    factory: &dyn CompositeFactory,
    parts: Parts,
) -> Result<BoxedTask> {
    let Parts {
        name,
        children,
        primary,
        timer,
        timer_used,
        run_for,
    } = parts;
    let name = name.unwrap_or_else(|| strategy.to_string());
    debug!("Assembling {} group '{}' with {} children", strategy, name, children.len());

    let task = match strategy {
        CompositionStrategy::Sequential => factory.sequential(&name, children),
        CompositionStrategy::ParallelAll => factory.parallel_all(&name, children),
        CompositionStrategy::ParallelRace => factory.parallel_race(&name, children),
        CompositionStrategy::ParallelDeadline => {
            let deadline = primary.ok_or(BuildError::MissingPrimary {
                strategy,
                slot: "deadline",
            })?;
            factory.parallel_deadline(&name, deadline, children)
        }
        CompositionStrategy::Timed => {
            return Ok(timed(factory, name, primary, timer, run_for));
        }
    };

    if timer_used {
        Ok(TimerScope::new(task, timer).boxed())
    } else {
        Ok(task)
    }
}

fn timed(
    factory: &dyn CompositeFactory,
    name: String,
    root: Option<BoxedTask>,
    timer: TimerHandle,
    run_for: Option<Duration>,
) -> BoxedTask {
    let root = root.unwrap_or_else(|| {
        warn!("Timed group '{}' was built without a root task", name);
        PrintTask::placeholder(EMPTY_ROOT_MESSAGE).boxed()
    });

    let root = match run_for {
        Some(limit) => {
            let expiry = WaitUntilTask::timer_reaches(timer.clone(), limit);
            factory.parallel_race(&format!("{}/run_for", name), vec![root, expiry.boxed()])
        }
        None => root,
    };

    let reset_timer = timer.clone();
    let reset = InstantTask::new(move || reset_timer.restart()).named("ResetTimer");
    let inner = factory.sequential(&name, vec![reset.boxed(), root]);
    TimedGroup::new(name, inner, timer).boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::StandardFactory;
    use taskweave_core::testing::{Journal, ScriptedTask};
    use taskweave_core::TaskKind;

    #[test]
    fn test_each_strategy_maps_to_its_composite() {
        let journal = Journal::new();
        for strategy in CompositionStrategy::ALL {
            let mut parts = Parts::new(vec![ScriptedTask::new("x", &journal).boxed()]);
            parts.primary = Some(ScriptedTask::new("p", &journal).boxed());

            let task = assemble(strategy, &StandardFactory, parts).unwrap();
            assert_eq!(task.outline().kind, TaskKind::Composite(strategy));
            assert_eq!(task.name(), strategy.to_string());
        }
    }

    #[test]
    fn test_deadline_without_primary_fails() {
        let err = assemble(
            CompositionStrategy::ParallelDeadline,
            &StandardFactory,
            Parts::new(Vec::new()),
        )
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
    fn test_timed_without_root_gets_placeholder() {
        let task = assemble(CompositionStrategy::Timed, &StandardFactory, Parts::new(Vec::new())).unwrap();
        let outline = task.outline();
        assert_eq!(outline.child_names(), vec!["ResetTimer", "PrintTask"]);
        assert_eq!(outline.primary_child().map(|c| c.kind), Some(TaskKind::Placeholder));
    }
}
