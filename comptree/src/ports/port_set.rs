use tracing::instrument;

use crate::arena::ComponentTree;
use crate::errors::TreeResult;
use crate::node::{NodeId, NodeKind, NodeSpec};

/// Unordered grouping of a component's ports and port vecs.
///
/// The set has no admission policy of its own and checks nothing beyond the
/// lifecycle gate; ports and port vecs refuse to live anywhere else.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortSet;

impl PortSet {
    #[instrument(level = "debug", skip(tree, description))]
    pub fn create(
        tree: &mut ComponentTree,
        parent: NodeId,
        name: &str,
        description: &str,
    ) -> TreeResult<NodeId> {
        tree.add_child(
            parent,
            NodeSpec::new(name, NodeKind::PortSet(PortSet)).with_description(description),
        )
    }
}
