//! Per-run mutable state.
//!
//! A [`RunState`] is created empty at the start of a run, threaded by reference
//! through every component, and handed back to the caller at the end. Workers
//! own private states that are folded with [`RunState::combine`].

use crate::entity::EntityKind;
use crate::labels::LabelAggregator;

/// Entity and error tallies for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunCounters {
    /// Accepted nodes.
    pub nodes: u64,
    /// Accepted ways.
    pub ways: u64,
    /// Accepted relations.
    pub relations: u64,
    /// Findings and applied corrections.
    pub errors: u64,
    /// Edit proposals emitted by the corrector.
    pub corrections: u64,
}

impl RunCounters {
    /// Count one accepted entity of `kind`.
    pub const fn record_entity(&mut self, kind: EntityKind) {
        match kind {
            EntityKind::Node => self.nodes += 1,
            EntityKind::Way => self.ways += 1,
            EntityKind::Relation => self.relations += 1,
        }
    }

    /// Count one finding.
    pub const fn record_error(&mut self) {
        self.errors += 1;
    }

    /// Count one emitted edit proposal.
    pub const fn record_correction(&mut self) {
        self.corrections += 1;
    }

    /// Accepted entities of `kind`.
    #[must_use]
    pub const fn entities(&self, kind: EntityKind) -> u64 {
        match kind {
            EntityKind::Node => self.nodes,
            EntityKind::Way => self.ways,
            EntityKind::Relation => self.relations,
        }
    }

    /// Accepted entities of every kind.
    #[must_use]
    pub const fn total_entities(&self) -> u64 {
        self.nodes + self.ways + self.relations
    }

    /// Sum two tallies.
    #[must_use]
    pub const fn combine(self, other: Self) -> Self {
        Self {
            nodes: self.nodes + other.nodes,
            ways: self.ways + other.ways,
            relations: self.relations + other.relations,
            errors: self.errors + other.errors,
            corrections: self.corrections + other.corrections,
        }
    }
}

/// Counters and aggregated labels accumulated during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunState {
    /// Entity and error tallies.
    pub counters: RunCounters,
    /// Label to entity mapping.
    pub labels: LabelAggregator,
}

impl RunState {
    /// Fold another state into this one.
    #[must_use]
    pub fn combine(mut self, other: Self) -> Self {
        self.counters = self.counters.combine(other.counters);
        self.labels.merge(other.labels);
        self
    }
}
