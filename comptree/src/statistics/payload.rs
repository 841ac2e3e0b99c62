//! Payload nodes routed by a [`crate::statistics::StatisticSet`].
//!
//! Payloads carry their description only; they hold no values and are
//! never sampled here.

use tracing::instrument;

use crate::arena::ComponentTree;
use crate::errors::{TreeError, TreeResult};
use crate::node::{NodeId, NodeKind, NodeSpec};

/// Derived statistic described by an expression over other statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatisticDef {
    expression: String,
}

impl StatisticDef {
    pub fn expression(&self) -> &str {
        &self.expression
    }

    #[instrument(level = "debug", skip(tree, description))]
    pub fn create(
        tree: &mut ComponentTree,
        parent: NodeId,
        name: &str,
        description: &str,
        expression: &str,
    ) -> TreeResult<NodeId> {
        if expression.trim().is_empty() {
            return Err(TreeError::InvalidPayload {
                location: payload_location(tree, parent, name)?,
                reason: "statistic expression must not be empty".to_string(),
            });
        }
        let payload = StatisticDef {
            expression: expression.to_string(),
        };
        tree.add_child(
            parent,
            NodeSpec::new(name, NodeKind::StatisticDef(payload)).with_description(description),
        )
    }
}

/// How a counter's value is meant to be interpreted when reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CounterBehavior {
    /// Monotonic count of events.
    #[default]
    Accumulating,
    /// Value sampled at report time.
    Sampled,
    /// Mirrors a value owned elsewhere; never incremented directly.
    ReadOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counter {
    behavior: CounterBehavior,
}

impl Counter {
    pub fn behavior(&self) -> CounterBehavior {
        self.behavior
    }

    #[instrument(level = "debug", skip(tree, description))]
    pub fn create(
        tree: &mut ComponentTree,
        parent: NodeId,
        name: &str,
        description: &str,
        behavior: CounterBehavior,
    ) -> TreeResult<NodeId> {
        tree.add_child(
            parent,
            NodeSpec::new(name, NodeKind::Counter(Counter { behavior }))
                .with_description(description),
        )
    }
}

/// Histogram over `[lower, upper)` split into `bins` equal buckets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    lower: u64,
    upper: u64,
    bins: u32,
}

impl Histogram {
    pub fn lower(&self) -> u64 {
        self.lower
    }

    pub fn upper(&self) -> u64 {
        self.upper
    }

    pub fn bins(&self) -> u32 {
        self.bins
    }

    /// Width of one bucket, rounded up.
    pub fn bin_width(&self) -> u64 {
        (self.upper - self.lower).div_ceil(u64::from(self.bins))
    }

    #[instrument(level = "debug", skip(tree, description))]
    pub fn create(
        tree: &mut ComponentTree,
        parent: NodeId,
        name: &str,
        description: &str,
        lower: u64,
        upper: u64,
        bins: u32,
    ) -> TreeResult<NodeId> {
        let reason = if lower >= upper {
            Some(format!("lower bound {lower} must be below upper bound {upper}"))
        } else if bins == 0 {
            Some("histogram needs at least one bin".to_string())
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(TreeError::InvalidPayload {
                location: payload_location(tree, parent, name)?,
                reason,
            });
        }
        tree.add_child(
            parent,
            NodeSpec::new(name, NodeKind::Histogram(Histogram { lower, upper, bins }))
                .with_description(description),
        )
    }
}

fn payload_location(tree: &ComponentTree, parent: NodeId, name: &str) -> TreeResult<String> {
    Ok(format!("{}.{}", tree.location(parent)?, name))
}
