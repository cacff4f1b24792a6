//! Errors raised while building a task tree.

use crate::strategy::CompositionStrategy;

/// Result alias for building composites.
pub type Result<T> = std::result::Result<T, BuildError>;

/// Errors that can occur while finalizing a builder.
///
/// These surface synchronously from `build()`, before any task in the
/// tree has started running.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// A strategy that needs a distinguished child was finalized without one.
    #[error("{strategy} group finalized without a {slot} task")]
    MissingPrimary {
        /// Strategy being built
        strategy: CompositionStrategy,
        /// Name of the empty slot
        slot: &'static str,
    },

    /// A single slot was assigned twice under the strict slot policy.
    #[error("{strategy} group: {slot} task assigned more than once")]
    DuplicatePrimary {
        /// Strategy being built
        strategy: CompositionStrategy,
        /// Name of the reassigned slot
        slot: &'static str,
    },

    /// A group declared inside this one failed to build.
    #[error("inside {strategy} group: {source}")]
    Nested {
        /// Strategy of the enclosing group
        strategy: CompositionStrategy,
        /// Error from the inner group
        #[source]
        source: Box<BuildError>,
    },
}

impl BuildError {
    /// The innermost error, with every `Nested` layer peeled off.
    pub fn root_cause(&self) -> &BuildError {
        match self {
            BuildError::Nested { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Number of enclosing groups between the failure and the caller.
    pub fn depth(&self) -> usize {
        match self {
            BuildError::Nested { source, .. } => 1 + source.depth(),
            _ => 0,
        }
    }
}
