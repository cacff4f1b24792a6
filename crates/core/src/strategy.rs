//! Composition strategies.

use serde::{Deserialize, Serialize};

/// How a composite runs its children and decides when it is finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositionStrategy {
    /// Run each child to completion in declaration order.
    Sequential,
    /// Run every child together; finish when all have finished.
    ParallelAll,
    /// Run every child together; finish when any has finished.
    ParallelRace,
    /// Run every child together; finish when the deadline child finishes.
    ParallelDeadline,
    /// Reset a shared timer, then run a single root task.
    Timed,
}

impl CompositionStrategy {
    /// Every strategy, in declaration order.
    pub const ALL: [CompositionStrategy; 5] = [
        Self::Sequential,
        Self::ParallelAll,
        Self::ParallelRace,
        Self::ParallelDeadline,
        Self::Timed,
    ];

    /// Whether finalizing needs a distinguished child.
    pub fn requires_primary(self) -> bool {
        matches!(self, Self::ParallelDeadline)
    }

    /// Whether the strategy keeps an ordered list of children
    /// (as opposed to a single root slot).
    pub fn accepts_children(self) -> bool {
        !matches!(self, Self::Timed)
    }

    /// Whether children run concurrently and must hold disjoint resources.
    pub fn is_concurrent(self) -> bool {
        matches!(
            self,
            Self::ParallelAll | Self::ParallelRace | Self::ParallelDeadline
        )
    }

    /// Name of the distinguished slot, if the strategy has one.
    pub fn primary_slot(self) -> Option<&'static str> {
        match self {
            Self::ParallelDeadline => Some("deadline"),
            Self::Timed => Some("root"),
            _ => None,
        }
    }

    /// Short identifier, as accepted by [`str::parse`].
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::ParallelAll => "parallel_all",
            Self::ParallelRace => "parallel_race",
            Self::ParallelDeadline => "parallel_deadline",
            Self::Timed => "timed",
        }
    }
}

impl std::fmt::Display for CompositionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown strategy name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown composition strategy: {0}")]
pub struct UnknownStrategy(pub String);

impl std::str::FromStr for CompositionStrategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "sequential" => Ok(Self::Sequential),
            "parallel_all" | "parallel" => Ok(Self::ParallelAll),
            "parallel_race" | "race" => Ok(Self::ParallelRace),
            "parallel_deadline" | "deadline" => Ok(Self::ParallelDeadline),
            "timed" => Ok(Self::Timed),
            _ => Err(UnknownStrategy(s.to_string())),
        }
    }
}
