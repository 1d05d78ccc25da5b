//! Aggregation of labels across a run.
//!
//! Every entity carrying a non-empty `name` contributes its [`EntityRef`] to
//! exactly one bucket keyed by the label text. Worker-local aggregators are
//! folded together with [`LabelAggregator::merge`].

use std::collections::{HashMap, HashSet};

use crate::entity::{Entity, EntityRef};

/// One row of the label report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRow {
    /// Label text.
    pub label: String,
    /// Entities sharing the label, sorted by kind then id.
    pub refs: Vec<EntityRef>,
}

/// Mapping from label text to the entities sharing it.
///
/// # Examples
/// ```
/// use toponym_core::{Entity, EntityKind, LabelAggregator, Tags};
///
/// let mut labels = LabelAggregator::default();
/// let tags = Tags::from([("name".into(), "Rue Pasteur".into())]);
/// labels.add(&Entity::new(EntityKind::Way, 2, tags.clone()));
/// labels.add(&Entity::new(EntityKind::Way, 1, tags));
///
/// let rows = labels.into_sorted_rows();
/// assert_eq!(rows.len(), 1);
/// assert_eq!(rows[0].refs.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelAggregator {
    buckets: HashMap<String, HashSet<EntityRef>>,
}

impl LabelAggregator {
    /// Record the entity's label. Entities without a non-empty `name` are ignored.
    pub fn add(&mut self, entity: &Entity) {
        let Some(label) = entity.label().filter(|label| !label.is_empty()) else {
            return;
        };
        self.insert(label, entity.reference());
    }

    fn insert(&mut self, label: &str, reference: EntityRef) {
        if let Some(bucket) = self.buckets.get_mut(label) {
            bucket.insert(reference);
        } else {
            self.buckets
                .insert(label.to_owned(), HashSet::from([reference]));
        }
    }

    /// Fold another aggregator into this one.
    pub fn merge(&mut self, other: Self) {
        for (label, refs) in other.buckets {
            self.buckets.entry(label).or_default().extend(refs);
        }
    }

    /// Number of distinct labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Whether no label has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Entities recorded under `label`.
    #[must_use]
    pub fn refs(&self, label: &str) -> Option<&HashSet<EntityRef>> {
        self.buckets.get(label)
    }

    /// Total number of references across all buckets.
    #[must_use]
    pub fn total_refs(&self) -> usize {
        self.buckets.values().map(HashSet::len).sum()
    }

    /// Rows sorted by label in code-point order.
    #[must_use]
    pub fn into_sorted_rows(self) -> Vec<LabelRow> {
        let mut rows: Vec<LabelRow> = self
            .buckets
            .into_iter()
            .map(|(label, refs)| {
                let mut refs: Vec<EntityRef> = refs.into_iter().collect();
                refs.sort_unstable();
                LabelRow { label, refs }
            })
            .collect();
        rows.sort_unstable_by(|a, b| a.label.cmp(&b.label));
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityKind, Tags};
    use rstest::rstest;

    fn named(kind: EntityKind, id: i64, name: &str) -> Entity {
        Entity::new(kind, id, Tags::from([("name".into(), name.into())]))
    }

    #[rstest]
    fn unnamed_and_empty_labels_are_ignored() {
        let mut labels = LabelAggregator::default();
        labels.add(&Entity::new(EntityKind::Node, 1, Tags::new()));
        labels.add(&named(EntityKind::Node, 2, ""));
        assert!(labels.is_empty());
    }

    #[rstest]
    fn duplicate_refs_collapse() {
        let mut labels = LabelAggregator::default();
        let entity = named(EntityKind::Way, 3, "Place du Marché");
        labels.add(&entity);
        labels.add(&entity);
        assert_eq!(labels.total_refs(), 1);
    }

    #[rstest]
    fn rows_sort_by_code_point() {
        let mut labels = LabelAggregator::default();
        labels.add(&named(EntityKind::Way, 1, "Église"));
        labels.add(&named(EntityKind::Way, 2, "Allée"));
        labels.add(&named(EntityKind::Way, 3, "allée"));
        let order: Vec<String> = labels
            .into_sorted_rows()
            .into_iter()
            .map(|row| row.label)
            .collect();
        assert_eq!(order, vec!["Allée", "allée", "Église"]);
    }

    #[rstest]
    fn merge_unions_buckets() {
        let mut left = LabelAggregator::default();
        left.add(&named(EntityKind::Way, 1, "Rue"));
        let mut right = LabelAggregator::default();
        right.add(&named(EntityKind::Relation, 1, "Rue"));
        right.add(&named(EntityKind::Node, 9, "Parc"));
        left.merge(right);
        assert_eq!(left.len(), 2);
        let refs = left.refs("Rue").expect("bucket for Rue");
        assert!(refs.contains(&EntityRef::new(EntityKind::Way, 1)));
        assert!(refs.contains(&EntityRef::new(EntityKind::Relation, 1)));
    }
}
