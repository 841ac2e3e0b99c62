//! Admission policies: the checks a collection runs when a child attaches.
//!
//! Attaching happens in two steps. [`AdmissionPolicy::admit`] inspects the
//! candidate without touching the collection and decides where it goes.
//! Only after every check has passed and the child is in the arena does
//! [`AdmissionPolicy::record`] store the new handle. A rejected candidate
//! therefore never leaves a trace in any collection.

use crate::config::Settings;
use crate::errors::TreeResult;
use crate::node::{NodeId, NodeKind};
use crate::statistics::StatKind;

/// A child about to be attached, as seen by its future parent.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    /// Location of the collection the child is attaching to.
    pub location: &'a str,
    pub name: &'a str,
    pub kind: &'a NodeKind,
    pub settings: &'a Settings,
}

/// Where an admitted child is recorded inside its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Kept only in the generic child list.
    Untracked,
    /// Appended to an ordered collection at this position.
    Ordered(usize),
    /// Routed to the bucket of a classifying collection.
    Bucket(StatKind),
}

pub trait AdmissionPolicy {
    fn admit(&self, candidate: &Candidate<'_>) -> TreeResult<Slot>;

    fn record(&mut self, slot: Slot, child: NodeId);
}

/// Nodes without a policy accept any child the child itself agrees to.
struct OpenPolicy;

impl AdmissionPolicy for OpenPolicy {
    fn admit(&self, _candidate: &Candidate<'_>) -> TreeResult<Slot> {
        Ok(Slot::Untracked)
    }

    fn record(&mut self, _slot: Slot, _child: NodeId) {}
}

impl NodeKind {
    pub(crate) fn admit(&self, candidate: &Candidate<'_>) -> TreeResult<Slot> {
        match self {
            NodeKind::PortVec(vec) => vec.admit(candidate),
            NodeKind::StatisticSet(set) => set.admit(candidate),
            _ => OpenPolicy.admit(candidate),
        }
    }

    pub(crate) fn record(&mut self, slot: Slot, child: NodeId) {
        match self {
            NodeKind::PortVec(vec) => vec.record(slot, child),
            NodeKind::StatisticSet(set) => set.record(slot, child),
            _ => OpenPolicy.record(slot, child),
        }
    }
}
