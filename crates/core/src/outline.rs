//! Static description of a task tree.

use crate::resource::Requirements;
use crate::strategy::CompositionStrategy;
use serde::{Deserialize, Serialize};

/// What kind of node an [`Outline`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// A task that does its own work.
    Leaf,
    /// Stand-in produced when a group was finalized with nothing in it.
    Placeholder,
    /// Runs one of its two children, chosen when it starts.
    Conditional,
    /// A composite built under a strategy.
    Composite(CompositionStrategy),
}

impl From<CompositionStrategy> for TaskKind {
    fn from(strategy: CompositionStrategy) -> Self {
        TaskKind::Composite(strategy)
    }
}

/// A node in the description of a task tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    /// Task name
    pub name: String,

    /// Node kind
    pub kind: TaskKind,

    /// Resources held while the task is active
    pub requirements: Requirements,

    /// Whether this node fills its parent's distinguished slot
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub primary: bool,

    /// Children in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Outline>,
}

impl Outline {
    /// Outline of a leaf task.
    pub fn leaf(name: impl Into<String>, requirements: Requirements) -> Self {
        Self {
            name: name.into(),
            kind: TaskKind::Leaf,
            requirements,
            primary: false,
            children: Vec::new(),
        }
    }

    /// Outline of a composite.
    pub fn composite(
        name: impl Into<String>,
        strategy: CompositionStrategy,
        requirements: Requirements,
        children: Vec<Outline>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: strategy.into(),
            requirements,
            primary: false,
            children,
        }
    }

    /// Change the node kind.
    pub fn with_kind(mut self, kind: TaskKind) -> Self {
        self.kind = kind;
        self
    }

    /// Mark this node as its parent's distinguished child.
    pub fn as_primary(mut self) -> Self {
        self.primary = true;
        self
    }

    /// Names of the direct children, in order.
    pub fn child_names(&self) -> Vec<&str> {
        self.children.iter().map(|c| c.name.as_str()).collect()
    }

    /// The distinguished child, if any.
    pub fn primary_child(&self) -> Option<&Outline> {
        self.children.iter().find(|c| c.primary)
    }

    /// Names of every leaf, depth first.
    pub fn leaf_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_leaves(&mut names);
        names
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a str>) {
        if self.children.is_empty() {
            out.push(&self.name);
        }
        for child in &self.children {
            child.collect_leaves(out);
        }
    }

    /// Depth of the tree (a leaf has depth 1).
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(Outline::depth).max().unwrap_or(0)
    }

    /// Pretty-printed JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
