//! Single-threaded tick scheduler.
//!
//! Each call to [`TaskScheduler::tick`] initializes newly registered
//! tasks, executes every active task once, and ends those that report
//! finished. Timing between ticks belongs to the caller.

use crate::config::{ConflictPolicy, SchedulerConfig};
use crate::error::{Result, ScheduleError};
use crate::registrar::SchedulerRegistrar;
use taskweave_core::{BoxedTask, Requirements, TaskId};
use tracing::{debug, info, warn};

struct Entry {
    id: TaskId,
    task: BoxedTask,
    requirements: Requirements,
    initialized: bool,
}

impl Entry {
    fn interrupt(&mut self) {
        if self.initialized {
            self.task.end(true);
        }
    }
}

/// Outcome of a single tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Tick number, starting at 1
    pub tick: u64,
    /// Tasks that finished on this tick
    pub finished: Vec<String>,
    /// Tasks still active after this tick
    pub active: usize,
}

/// Outcome of [`TaskScheduler::run_until_idle`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Ticks executed during the run
    pub ticks: u64,
    /// Tasks that finished normally, in finishing order
    pub completed: Vec<String>,
    /// Tasks interrupted because the tick limit was reached
    pub cancelled: Vec<String>,
}

impl RunSummary {
    /// Whether the run stopped at the tick limit.
    pub fn hit_limit(&self) -> bool {
        !self.cancelled.is_empty()
    }
}

/// Drives registered tasks one tick at a time.
pub struct TaskScheduler {
    config: SchedulerConfig,
    entries: Vec<Entry>,
    ticks: u64,
}

impl Default for TaskScheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

impl TaskScheduler {
    /// Create a scheduler.
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            entries: Vec::new(),
            ticks: 0,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Number of active tasks.
    pub fn active_count(&self) -> usize {
        self.entries.len()
    }

    /// Whether `id` is still active.
    pub fn is_scheduled(&self, id: TaskId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Names of active tasks, in registration order.
    pub fn active_names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.task.name().to_string()).collect()
    }

    /// Schedule a task tree.
    ///
    /// Trees whose concurrent siblings share a resource are refused
    /// outright. A tree needing a resource held by an active task is
    /// handled according to [`SchedulerConfig::conflict_policy`].
    pub fn schedule(&mut self, task: BoxedTask) -> Result<TaskId> {
        let conflicts = task.conflicts();
        if !conflicts.is_empty() {
            warn!(task = task.name(), count = conflicts.len(), "Refusing tree with sibling conflicts");
            return Err(ScheduleError::SiblingConflict {
                task: task.name().to_string(),
                conflicts,
            });
        }

        let requirements = task.requirements();
        let holders: Vec<usize> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.requirements.is_disjoint(&requirements))
            .map(|(i, _)| i)
            .collect();

        if let Some(&first) = holders.first() {
            match self.config.conflict_policy {
                ConflictPolicy::Reject => {
                    let holder = &self.entries[first];
                    return Err(ScheduleError::RequirementConflict {
                        task: task.name().to_string(),
                        holder: holder.task.name().to_string(),
                        shared: holder.requirements.overlap(&requirements),
                    });
                }
                ConflictPolicy::InterruptExisting => {
                    for &i in holders.iter().rev() {
                        let mut entry = self.entries.remove(i);
                        info!(task = entry.task.name(), by = task.name(), "Interrupting task");
                        entry.interrupt();
                    }
                }
            }
        }

        let id = TaskId::new();
        info!(%id, task = task.name(), requirements = %requirements, "Scheduled task");
        self.entries.push(Entry {
            id,
            task,
            requirements,
            initialized: false,
        });
        Ok(id)
    }

    /// Run one tick.
    pub fn tick(&mut self) -> TickReport {
        self.ticks += 1;
        let mut finished = Vec::new();

        self.entries.retain_mut(|entry| {
            if !entry.initialized {
                debug!(task = entry.task.name(), "Initializing");
                entry.task.initialize();
                entry.initialized = true;
            }
            entry.task.execute();
            if entry.task.is_finished() {
                entry.task.end(false);
                info!(id = %entry.id, task = entry.task.name(), "Task finished");
                finished.push(entry.task.name().to_string());
                false
            } else {
                true
            }
        });

        TickReport {
            tick: self.ticks,
            finished,
            active: self.entries.len(),
        }
    }

    /// Interrupt and remove one task.
    pub fn cancel(&mut self, id: TaskId) -> Result<()> {
        let index = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or(ScheduleError::UnknownTask(id))?;
        let mut entry = self.entries.remove(index);
        info!(%id, task = entry.task.name(), "Cancelled task");
        entry.interrupt();
        Ok(())
    }

    /// Interrupt and remove every task; returns their names.
    pub fn cancel_all(&mut self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.entries.len());
        for mut entry in self.entries.drain(..) {
            entry.interrupt();
            names.push(entry.task.name().to_string());
        }
        if !names.is_empty() {
            info!(count = names.len(), "Cancelled all tasks");
        }
        names
    }

    /// Tick until nothing is active or the tick limit is reached.
    ///
    /// Ticks back to back; callers that need real-time pacing should
    /// drive [`TaskScheduler::tick`] themselves.
    pub fn run_until_idle(&mut self) -> RunSummary {
        let mut summary = RunSummary::default();
        while !self.entries.is_empty() {
            if self.config.max_ticks.is_some_and(|max| summary.ticks >= max) {
                warn!(ticks = summary.ticks, "Tick limit reached");
                summary.cancelled = self.cancel_all();
                break;
            }
            let report = self.tick();
            summary.ticks += 1;
            summary.completed.extend(report.finished);
        }
        summary
    }
}

impl SchedulerRegistrar for TaskScheduler {
    fn register(&mut self, task: BoxedTask) -> Result<TaskId> {
        self.schedule(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use std::time::Duration;
    use taskweave_compose::{parallel, race, sequential, timed, Composer};
    use taskweave_core::testing::{Journal, ScriptedTask};
    use taskweave_core::{ManualClock, Task};

    #[test]
    fn test_tick_lifecycle() {
        let journal = Journal::new();
        let mut scheduler = TaskScheduler::default();
        scheduler
            .schedule(ScriptedTask::new("a", &journal).finish_after(2).boxed())
            .unwrap();

        let first = scheduler.tick();
        assert!(first.finished.is_empty());
        assert_eq!(first.active, 1);

        let second = scheduler.tick();
        assert_eq!(second.finished, vec!["a".to_string()]);
        assert_eq!(second.active, 0);
        assert_eq!(journal.ends("a"), vec![false]);
        assert_eq!(journal.initialized(), vec!["a".to_string()]);
        assert_eq!(scheduler.ticks(), 2);
        assert_eq!(scheduler.config(), &SchedulerConfig::default());
    }

    #[test]
    fn test_rejects_sibling_conflicts() {
        let journal = Journal::new();
        let tree = parallel(|p| {
            p.add_child(ScriptedTask::new("a", &journal).requires("arm"));
            p.add_child(ScriptedTask::new("b", &journal).requires("arm"));
        })
        .unwrap();

        let mut scheduler = TaskScheduler::default();
        let err = scheduler.schedule(tree).unwrap_err();
        match err {
            ScheduleError::SiblingConflict { conflicts, .. } => {
                assert_eq!(conflicts.len(), 1);
                assert_eq!(conflicts[0].first, "a");
                assert_eq!(conflicts[0].second, "b");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(scheduler.active_count(), 0);
        assert!(journal.calls().is_empty());
    }

    #[test]
    fn test_sequential_siblings_may_share() {
        let journal = Journal::new();
        let tree = sequential(|s| {
            s.add_child(ScriptedTask::new("a", &journal).requires("arm").finish_after(1));
            s.add_child(ScriptedTask::new("b", &journal).requires("arm").finish_after(1));
        })
        .unwrap();

        let mut scheduler = TaskScheduler::default();
        scheduler.schedule(tree).unwrap();
        let summary = scheduler.run_until_idle();
        assert_eq!(summary.completed, vec!["sequential".to_string()]);
        assert!(!summary.hit_limit());
    }

    #[test]
    fn test_reject_policy_keeps_holder() {
        let journal = Journal::new();
        let mut scheduler = TaskScheduler::default();
        scheduler
            .schedule(ScriptedTask::new("drive", &journal).requires("drivetrain").boxed())
            .unwrap();

        let err = scheduler
            .schedule(ScriptedTask::new("turn", &journal).requires("drivetrain").boxed())
            .unwrap_err();
        assert_eq!(
            err,
            ScheduleError::RequirementConflict {
                task: "turn".into(),
                holder: "drive".into(),
                shared: Requirements::new().with("drivetrain"),
            }
        );
        assert_eq!(scheduler.active_names(), vec!["drive".to_string()]);
    }

    #[test]
    fn test_interrupt_policy_ends_holder() {
        let journal = Journal::new();
        let config = SchedulerConfig::default().with_conflict_policy(ConflictPolicy::InterruptExisting);
        let mut scheduler = TaskScheduler::new(config);

        scheduler
            .schedule(ScriptedTask::new("drive", &journal).requires("drivetrain").boxed())
            .unwrap();
        scheduler.tick();
        scheduler
            .schedule(ScriptedTask::new("turn", &journal).requires("drivetrain").boxed())
            .unwrap();

        assert_eq!(journal.ends("drive"), vec![true]);
        assert_eq!(scheduler.active_names(), vec!["turn".to_string()]);
    }

    #[test]
    fn test_interrupting_uninitialized_holder_skips_end() {
        let journal = Journal::new();
        let config = SchedulerConfig::default().with_conflict_policy(ConflictPolicy::InterruptExisting);
        let mut scheduler = TaskScheduler::new(config);

        scheduler
            .schedule(ScriptedTask::new("drive", &journal).requires("drivetrain").boxed())
            .unwrap();
        scheduler
            .schedule(ScriptedTask::new("turn", &journal).requires("drivetrain").boxed())
            .unwrap();

        assert!(journal.ends("drive").is_empty());
    }

    #[test]
    fn test_cancel() {
        let journal = Journal::new();
        let mut scheduler = TaskScheduler::default();
        let id = scheduler.schedule(ScriptedTask::new("a", &journal).boxed()).unwrap();
        scheduler.tick();

        scheduler.cancel(id).unwrap();
        assert_eq!(journal.ends("a"), vec![true]);
        assert!(!scheduler.is_scheduled(id));
        assert_eq!(scheduler.cancel(id), Err(ScheduleError::UnknownTask(id)));
    }

    #[test]
    fn test_run_until_idle_hits_limit() {
        let journal = Journal::new();
        let config = SchedulerConfig::default().with_max_ticks(Some(5));
        let mut scheduler = TaskScheduler::new(config);
        scheduler.schedule(ScriptedTask::new("forever", &journal).boxed()).unwrap();

        let summary = scheduler.run_until_idle();
        assert_eq!(summary.ticks, 5);
        assert!(summary.hit_limit());
        assert_eq!(summary.cancelled, vec!["forever".to_string()]);
        assert_eq!(journal.executions("forever"), 5);
        assert_eq!(journal.ends("forever"), vec![true]);
    }

    #[test]
    fn test_race_through_registrar() {
        let journal = Journal::new();
        let tree = race(|r| {
            r.add_child(ScriptedTask::new("fast", &journal).finish_after(1));
            r.add_child(ScriptedTask::new("slow", &journal));
        })
        .unwrap();

        let mut scheduler = TaskScheduler::default();
        let registrar: &mut dyn SchedulerRegistrar = &mut scheduler;
        registrar.register(tree).unwrap();

        let summary = scheduler.run_until_idle();
        assert_eq!(summary.ticks, 1);
        assert_eq!(journal.ends("fast"), vec![false]);
        assert_eq!(journal.ends("slow"), vec![true]);
    }

    #[test]
    fn test_timed_group_runs_for_duration() {
        let clock = ManualClock::new();
        let journal = Journal::new();

        let composer = Composer::new().with_clock(Rc::new(clock.clone()));
        let tree = composer
            .timed(|t| {
                t.add_child(ScriptedTask::new("hold", &journal));
                t.run_for(Duration::from_secs(1));
            })
            .unwrap();

        let mut scheduler = TaskScheduler::default();
        scheduler.schedule(tree).unwrap();

        scheduler.tick();
        clock.advance(Duration::from_millis(600));
        assert!(scheduler.tick().finished.is_empty());
        clock.advance(Duration::from_millis(600));
        let report = scheduler.tick();
        assert_eq!(report.finished.len(), 1);
        assert_eq!(journal.ends("hold"), vec![true]);
    }

    #[test]
    fn test_empty_timed_group_finishes() {
        let tree = timed(|_| {}).unwrap();
        let mut scheduler = TaskScheduler::default();
        scheduler.schedule(tree).unwrap();
        let summary = scheduler.run_until_idle();
        assert_eq!(summary.completed.len(), 1);
    }
}
