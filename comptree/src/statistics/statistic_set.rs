use tracing::{debug, instrument, warn};

use crate::admission::{AdmissionPolicy, Candidate, Slot};
use crate::arena::ComponentTree;
use crate::errors::{TreeError, TreeResult};
use crate::node::{NodeClass, NodeId, NodeKind, NodeSpec};
use crate::statistics::StatKind;

/// Conventional name of a component's statistic set.
pub const STATISTIC_SET_NAME: &str = "stats";

/// Collection that sorts statistic payloads into one bucket per kind.
///
/// Children are classified by [`StatKind::PRIORITY`]: statistic defs first,
/// then counters, then histograms. Anything else is refused.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatisticSet {
    stats: Vec<NodeId>,
    counters: Vec<NodeId>,
    histograms: Vec<NodeId>,
}

impl StatisticSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bucket(&self, kind: StatKind) -> &[NodeId] {
        match kind {
            StatKind::StatisticDef => &self.stats,
            StatKind::Counter => &self.counters,
            StatKind::Histogram => &self.histograms,
        }
    }

    pub fn len(&self) -> usize {
        self.stats.len() + self.counters.len() + self.histograms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Creates the conventional `stats` node under `parent`.
    pub fn create(tree: &mut ComponentTree, parent: NodeId) -> TreeResult<NodeId> {
        Self::create_named(tree, parent, STATISTIC_SET_NAME, "Statistics")
    }

    #[instrument(level = "debug", skip(tree, description))]
    pub fn create_named(
        tree: &mut ComponentTree,
        parent: NodeId,
        name: &str,
        description: &str,
    ) -> TreeResult<NodeId> {
        tree.add_child(
            parent,
            NodeSpec::new(name, NodeKind::StatisticSet(StatisticSet::new()))
                .with_description(description),
        )
    }
}

impl AdmissionPolicy for StatisticSet {
    fn admit(&self, candidate: &Candidate<'_>) -> TreeResult<Slot> {
        match StatKind::classify(|kind| candidate.kind.provides(kind)) {
            Some(kind) => Ok(Slot::Bucket(kind)),
            None => {
                debug!(location = candidate.location, child = candidate.name, "rejected unclassifiable child");
                Err(TreeError::InvalidChildKind {
                    location: candidate.location.to_string(),
                    child: candidate.name.to_string(),
                    child_kind: candidate.kind.class(),
                    expected: "a statistic def, counter or histogram".to_string(),
                })
            }
        }
    }

    fn record(&mut self, slot: Slot, child: NodeId) {
        match slot {
            Slot::Bucket(StatKind::StatisticDef) => self.stats.push(child),
            Slot::Bucket(StatKind::Counter) => self.counters.push(child),
            Slot::Bucket(StatKind::Histogram) => self.histograms.push(child),
            other => {
                debug_assert!(false, "statistic set never issues {other:?}");
                warn!(%child, ?other, "ignored slot not issued by statistic set");
            }
        }
    }
}

/// Read access to a statistic set and the payloads it classified.
#[derive(Debug, Clone)]
pub struct StatisticSetView<'a> {
    tree: &'a ComponentTree,
    id: NodeId,
    location: String,
    set: &'a StatisticSet,
}

impl<'a> StatisticSetView<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn statistic_defs(&self) -> &'a [NodeId] {
        &self.set.stats
    }

    pub fn counters(&self) -> &'a [NodeId] {
        &self.set.counters
    }

    pub fn histograms(&self) -> &'a [NodeId] {
        &self.set.histograms
    }

    /// Finds `name` in the bucket for `kind` only.
    #[instrument(level = "trace", skip(self), fields(location = %self.location))]
    pub fn lookup(&self, name: &str, kind: StatKind) -> TreeResult<NodeId> {
        self.set
            .bucket(kind)
            .iter()
            .copied()
            .find(|&id| self.tree.node(id).is_ok_and(|node| node.name() == name))
            .ok_or_else(|| TreeError::NotFound {
                location: self.location.clone(),
                name: name.to_string(),
                kind,
            })
    }

    pub fn get_statistic_def(&self, name: &str) -> TreeResult<NodeId> {
        self.lookup(name, StatKind::StatisticDef)
    }

    pub fn get_counter(&self, name: &str) -> TreeResult<NodeId> {
        self.lookup(name, StatKind::Counter)
    }

    pub fn get_histogram(&self, name: &str) -> TreeResult<NodeId> {
        self.lookup(name, StatKind::Histogram)
    }
}

impl ComponentTree {
    pub fn statistic_set(&self, id: NodeId) -> TreeResult<StatisticSetView<'_>> {
        match self.node(id)?.kind() {
            NodeKind::StatisticSet(set) => Ok(StatisticSetView {
                tree: self,
                id,
                location: self.location(id)?,
                set,
            }),
            _ => Err(self.unexpected_kind(id, NodeClass::StatisticSet)),
        }
    }
}
