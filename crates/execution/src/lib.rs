//! Execution layer: hands composed task trees to a tick scheduler.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod registrar;
pub mod scheduler;

pub use config::{ConflictPolicy, SchedulerConfig};
pub use error::{ConfigError, Result, ScheduleError};
pub use registrar::SchedulerRegistrar;
pub use scheduler::{RunSummary, TaskScheduler, TickReport};
