use generational_arena::Arena;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::admission::Candidate;
use crate::config::Settings;
use crate::errors::{TreeError, TreeResult};
use crate::node::{validate_name, NodeClass, NodeId, NodeSpec, TreeId, TreeNode};

/// Arena-backed component tree.
///
/// The arena owns every node; collections only hold [`NodeId`] handles to
/// their children. Nodes are added through [`ComponentTree::add_child`],
/// which runs the child's parent check and the parent's admission policy
/// before anything is inserted. Nodes are never removed.
#[derive(Debug)]
pub struct ComponentTree {
    id: TreeId,
    arena: Arena<TreeNode>,
    root: NodeId,
    settings: Settings,
}

impl ComponentTree {
    pub fn new(root_name: &str) -> TreeResult<Self> {
        Self::with_settings(root_name, Settings::default())
    }

    #[instrument(level = "debug", skip(settings))]
    pub fn with_settings(root_name: &str, settings: Settings) -> TreeResult<Self> {
        validate_name(root_name)?;
        let id = TreeId::next();
        let mut arena = Arena::new();
        let root = NodeId {
            tree: id,
            index: arena.insert(TreeNode::from_spec(NodeSpec::component(root_name), None)),
        };
        Ok(Self {
            id,
            arena,
            root,
            settings,
        })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.lookup(id).is_some()
    }

    /// Resolves a handle only if this tree issued it.
    fn lookup(&self, id: NodeId) -> Option<&TreeNode> {
        if id.tree != self.id {
            return None;
        }
        self.arena.get(id.index)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn node(&self, id: NodeId) -> TreeResult<&TreeNode> {
        self.lookup(id).ok_or(TreeError::UnknownNode(id))
    }

    #[instrument(level = "trace", skip(self))]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> TreeResult<&mut TreeNode> {
        if id.tree != self.id {
            return Err(TreeError::UnknownNode(id));
        }
        self.arena.get_mut(id.index).ok_or(TreeError::UnknownNode(id))
    }

    pub fn parent(&self, id: NodeId) -> TreeResult<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    pub fn children(&self, id: NodeId) -> TreeResult<&[NodeId]> {
        Ok(self.node(id)?.children())
    }

    /// Dotted path from the root, e.g. `top.core0.ports.in_vec`.
    #[instrument(level = "trace", skip(self))]
    pub fn location(&self, id: NodeId) -> TreeResult<String> {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(idx) = current {
            let node = self.node(idx)?;
            names.push(node.name.as_str());
            current = node.parent;
        }
        Ok(names.iter().rev().join("."))
    }

    /// Depth of a single node, counting the root as 1.
    #[instrument(level = "trace", skip(self))]
    pub fn depth_of(&self, id: NodeId) -> TreeResult<usize> {
        let mut depth = 1;
        let mut current = self.node(id)?.parent;
        while let Some(idx) = current {
            depth += 1;
            current = self.node(idx)?.parent;
        }
        Ok(depth)
    }

    /// Depth of the deepest node in the tree.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.calculate_depth(self.root)
    }

    fn calculate_depth(&self, id: NodeId) -> usize {
        if let Some(node) = self.lookup(id) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Creates a node under `parent`.
    ///
    /// Checks run in this order and the first failure wins:
    /// 1. the child's name,
    /// 2. the child's own constraint on its parent kind,
    /// 3. the parent's lifecycle gate,
    /// 4. the configured maximum depth and sibling name uniqueness,
    /// 5. the parent's admission policy.
    ///
    /// Nothing is inserted unless every check passes.
    #[instrument(level = "trace", skip(self, spec), fields(child = %spec.name))]
    pub fn add_child(&mut self, parent: NodeId, spec: NodeSpec) -> TreeResult<NodeId> {
        validate_name(&spec.name)?;
        let parent_location = self.location(parent)?;
        let parent_node = self.node(parent)?;
        let child_location = format!("{}.{}", parent_location, spec.name);

        if let Some(permitted) = spec.kind.permitted_parents() {
            if !permitted.contains(&parent_node.class()) {
                debug!(location = %child_location, parent_kind = %parent_node.class(), "rejected parent");
                return Err(TreeError::InvalidParentKind {
                    location: child_location,
                    parent: parent_location,
                    parent_kind: parent_node.class(),
                    expected: permitted.iter().join(" or "),
                });
            }
        }

        parent_node.lifecycle.ensure_open(&parent_location)?;

        let max_depth = self.settings.tree.max_depth;
        if self.depth_of(parent)? + 1 > max_depth {
            return Err(TreeError::DepthExceeded {
                location: parent_location,
                max: max_depth,
            });
        }

        let duplicate = parent_node
            .children
            .iter()
            .filter_map(|c| self.lookup(*c))
            .any(|sibling| sibling.name == spec.name);
        if duplicate {
            return Err(TreeError::DuplicateChild {
                location: parent_location,
                name: spec.name,
            });
        }

        let slot = parent_node.kind.admit(&Candidate {
            location: &parent_location,
            name: &spec.name,
            kind: &spec.kind,
            settings: &self.settings,
        })?;

        let id = NodeId {
            tree: self.id,
            index: self.arena.insert(TreeNode::from_spec(spec, Some(parent))),
        };
        let parent_node = self.node_mut(parent)?;
        parent_node.children.push(id);
        parent_node.kind.record(slot, id);
        debug!(location = %child_location, ?slot, "attached child");
        Ok(id)
    }

    /// Finds a direct child by name.
    #[instrument(level = "trace", skip(self))]
    pub fn get_child(&self, parent: NodeId, name: &str) -> TreeResult<NodeId> {
        let node = self.node(parent)?;
        node.children
            .iter()
            .copied()
            .find(|c| self.lookup(*c).is_some_and(|n| n.name == name))
            .ok_or_else(|| TreeError::ChildNotFound {
                location: self.location(parent).unwrap_or_default(),
                name: name.to_string(),
            })
    }

    pub fn is_finalized(&self, id: NodeId) -> TreeResult<bool> {
        Ok(self.node(id)?.is_finalized())
    }

    /// Locks one node against further children. Repeated calls are no-ops.
    #[instrument(level = "debug", skip(self))]
    pub fn finalize(&mut self, id: NodeId) -> TreeResult<()> {
        let node = self.node_mut(id)?;
        if node.lifecycle.finalize() {
            debug!(node = %node.name, "finalized");
        }
        Ok(())
    }

    /// Finalizes `id` and all of its descendants, children before parents.
    #[instrument(level = "debug", skip(self))]
    pub fn finalize_subtree(&mut self, id: NodeId) -> TreeResult<()> {
        let order: Vec<NodeId> = self.iter_postorder_from(id)?.map(|(idx, _)| idx).collect();
        for idx in order {
            self.finalize(idx)?;
        }
        Ok(())
    }

    /// Error for a typed view requested on a node of another kind.
    pub(crate) fn unexpected_kind(&self, id: NodeId, expected: NodeClass) -> TreeError {
        match self.node(id) {
            Ok(node) => TreeError::UnexpectedKind {
                location: self.location(id).unwrap_or_default(),
                expected,
                actual: node.class(),
            },
            Err(err) => err,
        }
    }

    /// Pre-order traversal from the root.
    #[instrument(level = "trace", skip(self))]
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self, self.root)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn iter_from(&self, id: NodeId) -> TreeResult<TreeIterator<'_>> {
        self.node(id)?;
        Ok(TreeIterator::new(self, id))
    }

    #[instrument(level = "trace", skip(self))]
    pub fn iter_postorder_from(&self, id: NodeId) -> TreeResult<PostOrderIterator<'_>> {
        self.node(id)?;
        Ok(PostOrderIterator::new(self, id))
    }
}

pub struct TreeIterator<'a> {
    tree: &'a ComponentTree,
    stack: Vec<NodeId>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a ComponentTree, start: NodeId) -> Self {
        Self {
            tree,
            stack: vec![start],
        }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (NodeId, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if let Some(node) = self.tree.lookup(current) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    tree: &'a ComponentTree,
    stack: Vec<(NodeId, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(tree: &'a ComponentTree, start: NodeId) -> Self {
        Self {
            tree,
            stack: vec![(start, false)],
        }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (NodeId, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current, visited)) = self.stack.pop() {
            if let Some(node) = self.tree.lookup(current) {
                if !visited {
                    self.stack.push((current, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current, node));
                }
            }
        }
        None
    }
}
