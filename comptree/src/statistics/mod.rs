//! Statistics: payload nodes and the set that classifies them.

use std::fmt;

pub mod payload;
pub mod statistic_set;

pub use payload::{Counter, CounterBehavior, Histogram, StatisticDef};
pub use statistic_set::{StatisticSet, StatisticSetView};

/// Buckets of a [`StatisticSet`], one per recognized payload kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatKind {
    StatisticDef,
    Counter,
    Histogram,
}

impl StatKind {
    /// Order in which an attaching child is tested; the first match wins.
    pub const PRIORITY: [StatKind; 3] = [
        StatKind::StatisticDef,
        StatKind::Counter,
        StatKind::Histogram,
    ];

    /// First kind in priority order for which `provides` holds.
    pub fn classify(provides: impl Fn(StatKind) -> bool) -> Option<StatKind> {
        Self::PRIORITY.into_iter().find(|&kind| provides(kind))
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatKind::StatisticDef => f.write_str("statistic def"),
            StatKind::Counter => f.write_str("counter"),
            StatKind::Histogram => f.write_str("histogram"),
        }
    }
}
