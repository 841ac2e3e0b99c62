use tracing::{debug, instrument, warn};

use crate::admission::{AdmissionPolicy, Candidate, Slot};
use crate::arena::ComponentTree;
use crate::errors::{TreeError, TreeResult};
use crate::node::{NodeClass, NodeId, NodeKind, NodeSpec, TreeNode};
use crate::ports::Direction;

const DEFAULT_DESCRIPTION: &str = "Port Vec";

/// Ordered, append-only collection of ports with a declared direction.
///
/// Only ports are admitted, and each one must satisfy the configured
/// [`crate::ports::DirectionPolicy`] against the vector's direction.
/// Position `i` is the `i`-th port admitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortVec {
    direction: Direction,
    ports: Vec<NodeId>,
}

impl PortVec {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            ports: Vec::new(),
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    /// Creates a port vec under `port_set` and registers it there.
    ///
    /// An empty description falls back to `"Port Vec"`.
    #[instrument(level = "debug", skip(tree, description))]
    pub fn create(
        tree: &mut ComponentTree,
        port_set: NodeId,
        name: &str,
        direction: Direction,
        description: &str,
    ) -> TreeResult<NodeId> {
        let description = if description.is_empty() {
            DEFAULT_DESCRIPTION
        } else {
            description
        };
        tree.add_child(
            port_set,
            NodeSpec::new(name, NodeKind::PortVec(PortVec::new(direction)))
                .with_description(description),
        )
    }
}

impl AdmissionPolicy for PortVec {
    fn admit(&self, candidate: &Candidate<'_>) -> TreeResult<Slot> {
        let port = match candidate.kind {
            NodeKind::Port(port) => port,
            other => {
                debug!(location = candidate.location, child = candidate.name, kind = %other.class(), "rejected non-port");
                return Err(TreeError::InvalidChildKind {
                    location: candidate.location.to_string(),
                    child: candidate.name.to_string(),
                    child_kind: other.class(),
                    expected: NodeClass::Port.to_string(),
                });
            }
        };

        let policy = candidate.settings.ports.direction_policy;
        if let Some(reason) = policy.violation(self.direction, port.direction()) {
            debug!(location = candidate.location, child = candidate.name, ?policy, "rejected port direction");
            return Err(TreeError::DirectionMismatch {
                location: candidate.location.to_string(),
                child: candidate.name.to_string(),
                direction: port.direction(),
                reason,
            });
        }

        Ok(Slot::Ordered(self.ports.len()))
    }

    fn record(&mut self, slot: Slot, child: NodeId) {
        match slot {
            Slot::Ordered(position) => {
                debug_assert_eq!(
                    position,
                    self.ports.len(),
                    "port vec changed between admit and record"
                );
                self.ports.push(child);
            }
            other => {
                debug_assert!(false, "port vec never issues {other:?}");
                warn!(%child, ?other, "ignored slot not issued by port vec");
            }
        }
    }
}

/// Read access to a port vec together with the tree that owns its ports.
#[derive(Debug, Clone)]
pub struct PortVecView<'a> {
    tree: &'a ComponentTree,
    id: NodeId,
    location: String,
    vec: &'a PortVec,
}

impl<'a> PortVecView<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn direction(&self) -> Direction {
        self.vec.direction
    }

    pub fn len(&self) -> usize {
        self.vec.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vec.is_empty()
    }

    /// Port at `index`, in admission order.
    #[instrument(level = "trace", skip(self), fields(location = %self.location))]
    pub fn get(&self, index: usize) -> TreeResult<NodeId> {
        self.port(index).map(|(id, _)| id)
    }

    /// Port at `index` together with its node.
    pub fn port(&self, index: usize) -> TreeResult<(NodeId, &'a TreeNode)> {
        let id = self
            .vec
            .ports
            .get(index)
            .copied()
            .ok_or_else(|| TreeError::IndexOutOfRange {
                location: self.location.clone(),
                index,
                len: self.vec.len(),
            })?;
        let node = self
            .tree
            .node(id)
            .map_err(|_| TreeError::CorruptedCollection {
                location: self.location.clone(),
                index,
            })?;
        Ok((id, node))
    }

    pub fn ports(&self) -> impl Iterator<Item = NodeId> + 'a {
        self.vec.ports.iter().copied()
    }
}

impl ComponentTree {
    pub fn port_vec(&self, id: NodeId) -> TreeResult<PortVecView<'_>> {
        match self.node(id)?.kind() {
            NodeKind::PortVec(vec) => Ok(PortVecView {
                tree: self,
                id,
                location: self.location(id)?,
                vec,
            }),
            _ => Err(self.unexpected_kind(id, NodeClass::PortVec)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{Port, PortSet};
    use crate::statistics::StatKind;
    use crate::util::testing;
    use generational_arena::Index;

    #[test]
    fn given_stale_slot_when_getting_port_then_reports_corrupted_collection() {
        testing::init_test_setup();
        let mut tree = ComponentTree::new("top").unwrap();
        let root = tree.root();
        let ports = PortSet::create(&mut tree, root, "ports", "").unwrap();
        let vec = PortVec::create(&mut tree, ports, "out_vec", Direction::Out, "").unwrap();
        Port::create(&mut tree, vec, "p0", Direction::In, "").unwrap();

        // Slots only become stale through a framework bug; forge one directly.
        let stale = NodeId {
            tree: vec.tree,
            index: Index::from_raw_parts(10_000, 7),
        };
        if let NodeKind::PortVec(inner) = &mut tree.node_mut(vec).unwrap().kind {
            inner.ports.push(stale);
        }

        let view = tree.port_vec(vec).unwrap();
        assert_eq!(view.len(), 2);
        assert!(view.get(0).is_ok());
        assert_eq!(
            view.get(1).unwrap_err(),
            TreeError::CorruptedCollection {
                location: "top.ports.out_vec".to_string(),
                index: 1,
            }
        );
    }

    #[test]
    fn given_empty_description_when_creating_vec_then_uses_default() {
        let mut tree = ComponentTree::new("top").unwrap();
        let root = tree.root();
        let ports = PortSet::create(&mut tree, root, "ports", "").unwrap();
        let vec = PortVec::create(&mut tree, ports, "in_vec", Direction::In, "").unwrap();
        assert_eq!(tree.node(vec).unwrap().description(), "Port Vec");
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "port vec never issues")]
    fn given_bucket_slot_when_recording_then_panics_in_debug_builds() {
        let tree = ComponentTree::new("top").unwrap();
        let mut vec = PortVec::new(Direction::In);
        vec.record(Slot::Bucket(StatKind::Counter), tree.root());
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "changed between admit and record")]
    fn given_stale_position_when_recording_then_panics_in_debug_builds() {
        let tree = ComponentTree::new("top").unwrap();
        let mut vec = PortVec::new(Direction::In);
        vec.record(Slot::Ordered(3), tree.root());
    }
}
