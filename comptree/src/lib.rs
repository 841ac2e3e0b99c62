//! Hierarchical component trees with typed admission policies.
//!
//! A [`ComponentTree`] owns every node in a generational arena. Typed nodes
//! are created under their parent, which validates them on the spot:
//! ports only live in port sets or port vecs, port vecs enforce a direction
//! policy, and statistic sets route each payload into the bucket for its
//! kind. Once a node is finalized it refuses any further children.
//!
//! ```
//! use comptree::{ComponentTree, Direction, Port, PortSet, PortVec};
//!
//! let mut tree = ComponentTree::new("top")?;
//! let root = tree.root();
//! let ports = PortSet::create(&mut tree, root, "ports", "")?;
//! let in_vec = PortVec::create(&mut tree, ports, "in_vec", Direction::In, "")?;
//! let p0 = Port::create(&mut tree, in_vec, "p0", Direction::Out, "")?;
//! assert_eq!(tree.port_vec(in_vec)?.get(0)?, p0);
//! # Ok::<(), comptree::TreeError>(())
//! ```

pub mod admission;
pub mod arena;
pub mod config;
pub mod errors;
pub mod node;
pub mod ports;
pub mod statistics;
pub mod tree_traits;
pub mod util;

pub use arena::ComponentTree;
pub use config::Settings;
pub use errors::{TreeError, TreeResult};
pub use node::{Group, Lifecycle, NodeClass, NodeId, NodeKind, NodeSpec, TreeNode};
pub use ports::{Direction, DirectionPolicy, Port, PortSet, PortVec, PortVecView};
pub use statistics::{
    Counter, CounterBehavior, Histogram, StatKind, StatisticDef, StatisticSet, StatisticSetView,
};
pub use tree_traits::TreeRender;
