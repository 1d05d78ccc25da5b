//! Classification of decoded entities and exclusion filtering.

use crate::catalogue::Exclusions;
use crate::entity::{Entity, RawEntity};
use crate::state::RunCounters;

/// Turns decoder output into [`Entity`] values, dropping excluded ids.
///
/// The decoder contract only knows three shapes, so classification is total;
/// the closed [`RawEntity`] enum makes a fourth kind unrepresentable.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use toponym_core::{EntityClassifier, EntityKind, RawEntity, RuleCatalogue, RunCounters, Tags};
///
/// let catalogue = RuleCatalogue::builder().exclude(EntityKind::Node, 2).build();
/// let classifier = EntityClassifier::new(catalogue.exclusions());
/// let mut counters = RunCounters::default();
///
/// let node = |id| RawEntity::Node { id, tags: Tags::new(), location: Coord { x: 0.0, y: 0.0 } };
/// assert!(classifier.classify(node(1), &mut counters).is_some());
/// assert!(classifier.classify(node(2), &mut counters).is_none());
/// assert_eq!(counters.nodes, 1);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct EntityClassifier<'a> {
    exclusions: &'a Exclusions,
}

impl<'a> EntityClassifier<'a> {
    /// Build a classifier over the run's exclusion sets.
    #[must_use]
    pub const fn new(exclusions: &'a Exclusions) -> Self {
        Self { exclusions }
    }

    /// Classify `raw`, counting it when accepted.
    ///
    /// Returns `None` when the entity is excluded; excluded entities leave no
    /// trace in the counters.
    pub fn classify(&self, raw: RawEntity, counters: &mut RunCounters) -> Option<Entity> {
        let reference = raw.reference();
        if self.exclusions.contains(reference) {
            return None;
        }
        counters.record_entity(reference.kind);
        Some(Entity::from(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityKind, Tags};
    use rstest::rstest;

    #[rstest]
    fn exclusion_is_per_kind() {
        let mut exclusions = Exclusions::default();
        exclusions.insert(EntityKind::Way, 10);
        let classifier = EntityClassifier::new(&exclusions);
        let mut counters = RunCounters::default();

        let way = RawEntity::Way {
            id: 10,
            tags: Tags::new(),
            node_refs: Vec::new(),
        };
        let relation = RawEntity::Relation {
            id: 10,
            tags: Tags::new(),
            members: Vec::new(),
        };

        assert!(classifier.classify(way, &mut counters).is_none());
        let accepted = classifier
            .classify(relation, &mut counters)
            .expect("relation 10 is not excluded");
        assert_eq!(accepted.kind, EntityKind::Relation);
        assert_eq!(counters.ways, 0);
        assert_eq!(counters.relations, 1);
    }
}
