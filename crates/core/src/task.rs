//! The task capability polled by a cooperative scheduler.
//!
//! A task is driven through `initialize → execute* → is_finished? → end`.
//! The scheduler calls `initialize` once, then `execute` and
//! `is_finished` once per tick until the task reports finished, then
//! `end(false)`. A task cut short by its parent or the scheduler receives
//! `end(true)` instead and is never polled again.

use crate::error::{BuildError, Result};
use crate::outline::Outline;
use crate::resource::{Conflict, Requirements};

/// A schedulable unit of work.
///
/// Implementors must release everything they hold in [`Task::end`] when
/// `interrupted` is true: a task interrupted mid-flight (for example the
/// losing branch of a race) gets no other chance to stop its mechanisms.
pub trait Task {
    /// Human-readable name, used in logs and outlines.
    fn name(&self) -> &str;

    /// Called once before the first `execute`.
    fn initialize(&mut self) {}

    /// Called once per tick while the task is active.
    fn execute(&mut self) {}

    /// Whether the task has finished its work.
    fn is_finished(&self) -> bool {
        false
    }

    /// Called once when the task stops, either because it finished
    /// (`interrupted == false`) or because it was force-terminated.
    fn end(&mut self, _interrupted: bool) {}

    /// Resources held exclusively while the task is active.
    fn requirements(&self) -> Requirements {
        Requirements::new()
    }

    /// Concurrent siblings inside this task that declare the same resource.
    ///
    /// Leaves have no siblings; composites report their own and their
    /// children's.
    fn conflicts(&self) -> Vec<Conflict> {
        Vec::new()
    }

    /// Static description of this task and everything below it.
    fn outline(&self) -> Outline {
        Outline::leaf(self.name(), self.requirements())
    }

    /// Move the task into a [`BoxedTask`].
    fn boxed(self) -> BoxedTask
    where
        Self: Sized + 'static,
    {
        Box::new(self)
    }
}

/// An owned, type-erased task.
pub type BoxedTask = Box<dyn Task>;

impl<T: Task + ?Sized> Task for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn initialize(&mut self) {
        (**self).initialize()
    }

    fn execute(&mut self) {
        (**self).execute()
    }

    fn is_finished(&self) -> bool {
        (**self).is_finished()
    }

    fn end(&mut self, interrupted: bool) {
        (**self).end(interrupted)
    }

    fn requirements(&self) -> Requirements {
        (**self).requirements()
    }

    fn conflicts(&self) -> Vec<Conflict> {
        (**self).conflicts()
    }

    fn outline(&self) -> Outline {
        (**self).outline()
    }
}

/// Anything a builder accepts as a child.
///
/// Plain tasks convert infallibly. The `Result` returned by a nested
/// group converts to its error, which the enclosing builder reports
/// from its own `build()`.
pub trait IntoTask {
    /// Convert into a boxed task or the error that prevented building it.
    fn into_task(self) -> Result<BoxedTask>;
}

impl<T: Task + 'static> IntoTask for T {
    fn into_task(self) -> Result<BoxedTask> {
        Ok(self.boxed())
    }
}

impl IntoTask for std::result::Result<BoxedTask, BuildError> {
    fn into_task(self) -> Result<BoxedTask> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::CompositionStrategy;

    struct Named(&'static str);

    impl Task for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn requirements(&self) -> Requirements {
            Requirements::new().with("intake")
        }
    }

    #[test]
    fn test_boxed_task_delegates() {
        let task: BoxedTask = Named("intake").boxed();
        assert_eq!(task.name(), "intake");
        assert!(!task.is_finished());
        assert_eq!(task.outline().requirements, Requirements::new().with("intake"));
        assert!(task.conflicts().is_empty());
    }

    #[test]
    fn test_into_task_passes_errors_through() {
        let err = BuildError::MissingPrimary {
            strategy: CompositionStrategy::ParallelDeadline,
            slot: "deadline",
        };
        let nested: Result<BoxedTask> = Err(err.clone());
        assert_eq!(nested.into_task().err(), Some(err));
        assert!(Named("ok").into_task().is_ok());
    }
}
