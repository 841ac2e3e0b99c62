use termtree::Tree;
use tracing::instrument;

use crate::arena::ComponentTree;
use crate::node::{NodeId, TreeNode};

pub trait TreeRender {
    fn to_tree_string(&self) -> Tree<String>;
}

fn label(node: &TreeNode) -> String {
    let marker = if node.is_finalized() { "*" } else { "" };
    format!("{} [{}]{}", node.name(), node.class(), marker)
}

// Renders each node as `name [kind]`, finalized nodes marked with `*`
impl TreeRender for ComponentTree {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        fn build_tree(tree: &ComponentTree, id: NodeId, parent_tree: &mut Tree<String>) {
            if let Ok(node) = tree.node(id) {
                for &child_id in node.children() {
                    if let Ok(child) = tree.node(child_id) {
                        let mut child_tree = Tree::new(label(child));
                        build_tree(tree, child_id, &mut child_tree);
                        parent_tree.push(child_tree);
                    }
                }
            }
        }

        match self.node(self.root()) {
            Ok(root) => {
                let mut tree = Tree::new(label(root));
                build_tree(self, self.root(), &mut tree);
                tree
            }
            Err(_) => Tree::new("Empty tree".to_string()),
        }
    }
}
