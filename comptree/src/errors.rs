use thiserror::Error;

use crate::node::{NodeClass, NodeId};
use crate::ports::Direction;
use crate::statistics::StatKind;

/// Structural errors raised while building or querying a component tree.
///
/// Every variant that concerns a live node carries that node's dotted
/// location so the message can be traced back to the tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("cannot add a child once {location} is finalized")]
    StructureLocked { location: String },

    #[error("{location} cannot be placed under {parent}: parent is a {parent_kind}, expected {expected}")]
    InvalidParentKind {
        location: String,
        parent: String,
        parent_kind: NodeClass,
        expected: String,
    },

    #[error("cannot add child {child} ({child_kind}) to {location}: only {expected} is accepted")]
    InvalidChildKind {
        location: String,
        child: String,
        child_kind: NodeClass,
        expected: String,
    },

    #[error("cannot add child {child} to {location}: {reason}")]
    DirectionMismatch {
        location: String,
        child: String,
        direction: Direction,
        reason: String,
    },

    #[error("index {index} is out of range for {location} (len {len})")]
    IndexOutOfRange {
        location: String,
        index: usize,
        len: usize,
    },

    #[error("slot {index} of {location} does not resolve to a node")]
    CorruptedCollection { location: String, index: usize },

    #[error("no {kind} named {name} in {location}")]
    NotFound {
        location: String,
        name: String,
        kind: StatKind,
    },

    #[error("invalid node name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    #[error("{location} already has a child named {name}")]
    DuplicateChild { location: String, name: String },

    #[error("{location} has no child named {name}")]
    ChildNotFound { location: String, name: String },

    #[error("node {0} does not exist in this tree")]
    UnknownNode(NodeId),

    #[error("{location} is a {actual}, expected a {expected}")]
    UnexpectedKind {
        location: String,
        expected: NodeClass,
        actual: NodeClass,
    },

    #[error("adding a child under {location} would exceed the maximum depth of {max}")]
    DepthExceeded { location: String, max: usize },

    #[error("invalid payload for {location}: {reason}")]
    InvalidPayload { location: String, reason: String },
}

pub type TreeResult<T> = Result<T, TreeError>;
