use tracing::instrument;

use crate::arena::ComponentTree;
use crate::errors::TreeResult;
use crate::node::{NodeClass, NodeId, NodeKind, NodeSpec};
use crate::ports::Direction;

/// Directional leaf. Its parent must be a port set or a port vec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    direction: Direction,
}

impl Port {
    pub fn new(direction: Direction) -> Self {
        Self { direction }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Creates a port under `parent` and registers it there.
    #[instrument(level = "debug", skip(tree, description))]
    pub fn create(
        tree: &mut ComponentTree,
        parent: NodeId,
        name: &str,
        direction: Direction,
        description: &str,
    ) -> TreeResult<NodeId> {
        tree.add_child(
            parent,
            NodeSpec::new(name, NodeKind::Port(Port::new(direction))).with_description(description),
        )
    }
}

impl ComponentTree {
    pub fn port(&self, id: NodeId) -> TreeResult<&Port> {
        match self.node(id)?.kind() {
            NodeKind::Port(port) => Ok(port),
            _ => Err(self.unexpected_kind(id, NodeClass::Port)),
        }
    }
}
