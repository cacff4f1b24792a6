//! Exclusive resources ("requirements") declared by tasks.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A named resource a task holds exclusively while it is active.
///
/// Typical resources are mechanisms such as a drivetrain or a shooter;
/// two simultaneously active tasks must never share one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resource(String);

impl Resource {
    /// Create a resource with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Resource name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Resource {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Ordered set of resources declared by a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Requirements(BTreeSet<Resource>);

impl Requirements {
    /// An empty requirement set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource.
    pub fn with(mut self, resource: impl Into<Resource>) -> Self {
        self.0.insert(resource.into());
        self
    }

    /// Add a resource in place.
    pub fn insert(&mut self, resource: impl Into<Resource>) {
        self.0.insert(resource.into());
    }

    /// Merge another set into this one.
    pub fn extend(&mut self, other: &Requirements) {
        self.0.extend(other.0.iter().cloned());
    }

    /// Union of two sets.
    pub fn union(&self, other: &Requirements) -> Requirements {
        Requirements(self.0.union(&other.0).cloned().collect())
    }

    /// Resources present in both sets.
    pub fn overlap(&self, other: &Requirements) -> Requirements {
        Requirements(self.0.intersection(&other.0).cloned().collect())
    }

    /// Whether the two sets share no resource.
    pub fn is_disjoint(&self, other: &Requirements) -> bool {
        self.0.is_disjoint(&other.0)
    }

    /// Whether the set contains the resource.
    pub fn contains(&self, resource: &Resource) -> bool {
        self.0.contains(resource)
    }

    /// Whether nothing is required.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of resources.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.0.iter()
    }
}

impl<R: Into<Resource>> FromIterator<R> for Requirements {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl std::fmt::Display for Requirements {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.0.iter().map(Resource::name).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}

/// Two siblings of a concurrent composite that declare the same resource.
///
/// Composites never merge or drop such siblings; they report them so the
/// scheduler can refuse the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    /// Name of the composite holding both siblings
    pub group: String,
    /// Name of the earlier sibling
    pub first: String,
    /// Name of the later sibling
    pub second: String,
    /// Resources both siblings declare
    pub shared: Requirements,
}

impl std::fmt::Display for Conflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: '{}' and '{}' both require {}",
            self.group, self.first, self.second, self.shared
        )
    }
}
