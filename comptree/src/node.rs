//! Node identity, kinds and the one-way lifecycle shared by every tree node.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use generational_arena::Index;

use crate::errors::{TreeError, TreeResult};
use crate::ports::{Port, PortSet, PortVec};
use crate::statistics::{Counter, Histogram, StatKind, StatisticDef, StatisticSet};

/// Identity of one [`crate::arena::ComponentTree`], unique within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct TreeId(u64);

impl TreeId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        TreeId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Handle to a node stored in a [`crate::arena::ComponentTree`].
///
/// Handles never own the node they point to. A handle whose node is gone,
/// or that was issued by another tree, resolves to [`TreeError::UnknownNode`]
/// instead of dangling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub(crate) tree: TreeId,
    pub(crate) index: Index,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (idx, generation) = self.index.into_raw_parts();
        write!(f, "#{}.{}@{}", idx, generation, self.tree.0)
    }
}

/// Optional group membership of a node, e.g. `core` / 0 for `core0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub name: String,
    pub index: u32,
}

impl Group {
    pub fn new(name: impl Into<String>, index: u32) -> Self {
        Self {
            name: name.into(),
            index,
        }
    }
}

/// Construction state of a node. The only transition is `Open -> Finalized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    #[default]
    Open,
    Finalized,
}

impl Lifecycle {
    /// Gate for every mutating operation on a node.
    pub fn ensure_open(&self, location: &str) -> TreeResult<()> {
        match self {
            Lifecycle::Open => Ok(()),
            Lifecycle::Finalized => Err(TreeError::StructureLocked {
                location: location.to_string(),
            }),
        }
    }

    /// Returns true if this call performed the transition.
    pub(crate) fn finalize(&mut self) -> bool {
        match self {
            Lifecycle::Open => {
                *self = Lifecycle::Finalized;
                true
            }
            Lifecycle::Finalized => false,
        }
    }

    pub fn is_finalized(&self) -> bool {
        matches!(self, Lifecycle::Finalized)
    }
}

/// Tag naming the runtime kind of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeClass {
    Component,
    PortSet,
    PortVec,
    Port,
    StatisticSet,
    StatisticDef,
    Counter,
    Histogram,
}

impl fmt::Display for NodeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeClass::Component => "component",
            NodeClass::PortSet => "port set",
            NodeClass::PortVec => "port vec",
            NodeClass::Port => "port",
            NodeClass::StatisticSet => "statistic set",
            NodeClass::StatisticDef => "statistic def",
            NodeClass::Counter => "counter",
            NodeClass::Histogram => "histogram",
        };
        f.write_str(name)
    }
}

/// Closed set of node payloads the tree knows how to admit.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Plain structural node without an admission policy.
    Component,
    PortSet(PortSet),
    PortVec(PortVec),
    Port(Port),
    StatisticSet(StatisticSet),
    StatisticDef(StatisticDef),
    Counter(Counter),
    Histogram(Histogram),
}

impl NodeKind {
    pub fn class(&self) -> NodeClass {
        match self {
            NodeKind::Component => NodeClass::Component,
            NodeKind::PortSet(_) => NodeClass::PortSet,
            NodeKind::PortVec(_) => NodeClass::PortVec,
            NodeKind::Port(_) => NodeClass::Port,
            NodeKind::StatisticSet(_) => NodeClass::StatisticSet,
            NodeKind::StatisticDef(_) => NodeClass::StatisticDef,
            NodeKind::Counter(_) => NodeClass::Counter,
            NodeKind::Histogram(_) => NodeClass::Histogram,
        }
    }

    /// Capability query used by statistic routing.
    pub fn provides(&self, kind: StatKind) -> bool {
        match self {
            NodeKind::StatisticDef(_) => kind == StatKind::StatisticDef,
            NodeKind::Counter(_) => kind == StatKind::Counter,
            NodeKind::Histogram(_) => kind == StatKind::Histogram,
            _ => false,
        }
    }

    /// Parent kinds this node may be constructed under; `None` means any.
    pub fn permitted_parents(&self) -> Option<&'static [NodeClass]> {
        match self {
            NodeKind::Port(_) => Some(&[NodeClass::PortSet, NodeClass::PortVec]),
            NodeKind::PortVec(_) => Some(&[NodeClass::PortSet]),
            NodeKind::StatisticDef(_) | NodeKind::Counter(_) | NodeKind::Histogram(_) => {
                Some(&[NodeClass::StatisticSet])
            }
            _ => None,
        }
    }
}

/// A node stored in the arena.
#[derive(Debug)]
pub struct TreeNode {
    pub(crate) name: String,
    pub(crate) group: Option<Group>,
    pub(crate) description: String,
    pub(crate) lifecycle: Lifecycle,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) kind: NodeKind,
}

impl TreeNode {
    pub(crate) fn from_spec(spec: NodeSpec, parent: Option<NodeId>) -> Self {
        Self {
            name: spec.name,
            group: spec.group,
            description: spec.description,
            lifecycle: Lifecycle::Open,
            parent,
            children: Vec::new(),
            kind: spec.kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn group(&self) -> Option<&Group> {
        self.group.as_ref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_finalized(&self) -> bool {
        self.lifecycle.is_finalized()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn class(&self) -> NodeClass {
        self.kind.class()
    }
}

/// Everything needed to create a node, before it has a place in the tree.
#[derive(Debug, Clone)]
pub struct NodeSpec {
    pub name: String,
    pub group: Option<Group>,
    pub description: String,
    pub kind: NodeKind,
}

impl NodeSpec {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            group: None,
            description: String::new(),
            kind,
        }
    }

    pub fn component(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Component)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_group(mut self, group: Group) -> Self {
        self.group = Some(group);
        self
    }
}

/// Names must be non-empty and must not contain the location separator.
pub fn validate_name(name: &str) -> TreeResult<()> {
    if name.is_empty() {
        return Err(TreeError::InvalidName {
            name: name.to_string(),
            reason: "name must not be empty".to_string(),
        });
    }
    if name.contains('.') {
        return Err(TreeError::InvalidName {
            name: name.to_string(),
            reason: "name must not contain '.'".to_string(),
        });
    }
    if name.chars().any(char::is_whitespace) {
        return Err(TreeError::InvalidName {
            name: name.to_string(),
            reason: "name must not contain whitespace".to_string(),
        });
    }
    Ok(())
}
