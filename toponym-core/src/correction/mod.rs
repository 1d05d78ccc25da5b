//! Re-fetch and correct labels against the live copy of an entity.
//!
//! [`ConvergentCorrector::correct`] first probes the local value. Only when a
//! rule would act does it fetch the authoritative tags and run the bounded
//! fixpoint from the fetched value, so an edit is never proposed against a
//! stale snapshot.

mod fixpoint;

use thiserror::Error;

use crate::catalogue::CorrectionRule;
use crate::entity::{Entity, EntityKind, EntityRef};
use crate::remote::{EntityFetcher, FetchError, FetchOutcome};
use crate::validation::HighwayNameRules;

pub use fixpoint::{Convergence, DEFAULT_MAX_PASSES, Diverged, RewriteStep, converge, probe};

/// Fatal correction failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CorrectionError {
    /// The remote copy could not be fetched.
    #[error("failed to fetch {entity}")]
    Fetch {
        /// Entity being corrected.
        entity: EntityRef,
        /// Underlying fetch failure.
        #[source]
        source: FetchError,
    },
    /// The rules did not reach a fixpoint.
    #[error(
        "correction of {key} on {entity} diverged after {passes} passes at rule {pattern:?} (value {value:?})"
    )]
    Divergence {
        /// Entity being corrected.
        entity: EntityRef,
        /// Tag being corrected.
        key: String,
        /// Pattern of the last rule that rewrote the value.
        pattern: String,
        /// Passes run before giving up.
        passes: usize,
        /// Value at the point of failure.
        value: String,
    },
}

/// What happened to one correction attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum CorrectionOutcome {
    /// No rule applies to the local value; nothing was fetched.
    Clean,
    /// The entity no longer exists remotely.
    Gone,
    /// The remote copy no longer carries the tag.
    RemoteTagMissing,
    /// The fetched value is already at a fixpoint.
    Stable {
        /// Fetched value.
        value: String,
    },
    /// A search-only rule matched; the value needs an out-of-band fix.
    Flagged {
        /// Index of the matching rule.
        rule: usize,
        /// Pattern of the matching rule.
        pattern: String,
        /// Value the rule matched.
        value: String,
        /// Rewrites applied before the match.
        steps: Vec<RewriteStep>,
    },
    /// The rules rewrote the fetched value.
    Corrected {
        /// Corrected tag.
        key: String,
        /// Value fetched from the remote service.
        fetched: String,
        /// Final value.
        corrected: String,
        /// Every rewrite, in application order.
        steps: Vec<RewriteStep>,
        /// Copy of the entity carrying the corrected value.
        entity: Entity,
    },
}

enum Trigger {
    HasKey(&'static str),
    Roadway,
    TagIn(&'static str, &'static [&'static str]),
}

struct Eligibility {
    kind: EntityKind,
    key: &'static str,
    triggers: &'static [Trigger],
}

const ELIGIBILITY: &[Eligibility] = &[
    Eligibility {
        kind: EntityKind::Node,
        key: "addr:street",
        triggers: &[Trigger::HasKey("addr:street")],
    },
    Eligibility {
        kind: EntityKind::Way,
        key: "name",
        triggers: &[Trigger::Roadway],
    },
    Eligibility {
        kind: EntityKind::Relation,
        key: "name",
        triggers: &[
            Trigger::Roadway,
            Trigger::TagIn("type", &["street", "associatedStreet"]),
        ],
    },
];

/// Tag to correct on `entity`, if it is eligible at all.
///
/// Nodes are corrected on `addr:street`; roadway ways and relations (and
/// street relations) on `name`.
#[must_use]
pub fn correction_key(entity: &Entity, highway: &HighwayNameRules) -> Option<&'static str> {
    let row = ELIGIBILITY.iter().find(|row| row.kind == entity.kind)?;
    row.triggers
        .iter()
        .any(|trigger| match trigger {
            Trigger::HasKey(key) => entity.has_tag(key),
            Trigger::Roadway => entity.tag("highway").is_some_and(|v| highway.is_roadway(v)),
            Trigger::TagIn(key, values) => entity.tag_is_any(key, values),
        })
        .then_some(row.key)
}

/// Probe, re-fetch and correct one tag.
pub struct ConvergentCorrector<'a> {
    rules: &'a [CorrectionRule],
    fetcher: &'a dyn EntityFetcher,
    max_passes: usize,
}

impl<'a> ConvergentCorrector<'a> {
    /// Correct with `rules`, fetching through `fetcher`.
    #[must_use]
    pub fn new(rules: &'a [CorrectionRule], fetcher: &'a dyn EntityFetcher) -> Self {
        Self {
            rules,
            fetcher,
            max_passes: DEFAULT_MAX_PASSES,
        }
    }

    /// Override the pass cap.
    #[must_use]
    pub const fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    /// Correct `key` on `entity`.
    ///
    /// # Errors
    /// Returns [`CorrectionError::Fetch`] when the remote lookup fails and
    /// [`CorrectionError::Divergence`] when the rules do not settle.
    pub fn correct(&self, entity: &Entity, key: &str) -> Result<CorrectionOutcome, CorrectionError> {
        let Some(local) = entity.tag(key) else {
            return Ok(CorrectionOutcome::Clean);
        };
        if !probe(self.rules, local) {
            return Ok(CorrectionOutcome::Clean);
        }

        let reference = entity.reference();
        let tags = match self.fetcher.fetch(entity.kind, entity.id) {
            Ok(FetchOutcome::Found(tags)) => tags,
            Ok(FetchOutcome::Gone) => return Ok(CorrectionOutcome::Gone),
            Err(source) => {
                return Err(CorrectionError::Fetch {
                    entity: reference,
                    source,
                });
            }
        };
        let Some(fetched) = tags.get(key) else {
            return Ok(CorrectionOutcome::RemoteTagMissing);
        };

        let convergence = converge(self.rules, fetched, self.max_passes).map_err(|diverged| {
            CorrectionError::Divergence {
                entity: reference,
                key: key.to_owned(),
                pattern: self.pattern(diverged.rule),
                passes: diverged.passes,
                value: diverged.value,
            }
        })?;

        if let Some(rule) = convergence.flagged {
            return Ok(CorrectionOutcome::Flagged {
                rule,
                pattern: self.pattern(rule),
                value: convergence.value,
                steps: convergence.steps,
            });
        }
        if convergence.value == *fetched {
            return Ok(CorrectionOutcome::Stable {
                value: convergence.value,
            });
        }
        Ok(CorrectionOutcome::Corrected {
            key: key.to_owned(),
            fetched: fetched.clone(),
            entity: entity.with_tag(key, &convergence.value),
            corrected: convergence.value,
            steps: convergence.steps,
        })
    }

    /// Pattern text of the rule at `index`.
    #[must_use]
    pub fn pattern(&self, index: usize) -> String {
        self.rules
            .get(index)
            .map(|rule| rule.pattern().to_owned())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Tags;
    use crate::test_support::StubFetcher;
    use rstest::{fixture, rstest};

    fn tags(pairs: &[(&str, &str)]) -> Tags {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[fixture]
    fn rules() -> Vec<CorrectionRule> {
        vec![CorrectionRule::search_and_replace(r"^Ch\.\s", "Chemin ").expect("pattern compiles")]
    }

    #[fixture]
    fn way() -> Entity {
        Entity::new(
            EntityKind::Way,
            12,
            tags(&[("highway", "residential"), ("name", "Ch. Pasteur")]),
        )
    }

    #[rstest]
    fn corrects_from_fetched_value(rules: Vec<CorrectionRule>, way: Entity) {
        let fetcher = StubFetcher::default().with_found(EntityKind::Way, 12, tags(&[("name", "Ch. Pasteur")]));
        let outcome = ConvergentCorrector::new(&rules, &fetcher)
            .correct(&way, "name")
            .expect("correction succeeds");
        let CorrectionOutcome::Corrected { corrected, entity, steps, .. } = outcome else {
            panic!("expected a correction, got {outcome:?}");
        };
        assert_eq!(corrected, "Chemin Pasteur");
        assert_eq!(entity.label(), Some("Chemin Pasteur"));
        assert_eq!(steps.len(), 1);
        assert_eq!(way.label(), Some("Ch. Pasteur"));
    }

    #[rstest]
    fn clean_local_value_skips_fetch(rules: Vec<CorrectionRule>) {
        let fetcher = StubFetcher::default();
        let entity = Entity::new(EntityKind::Way, 1, tags(&[("name", "Chemin Vert")]));
        let outcome = ConvergentCorrector::new(&rules, &fetcher)
            .correct(&entity, "name")
            .expect("probe succeeds");
        assert_eq!(outcome, CorrectionOutcome::Clean);
        assert_eq!(fetcher.calls(), 0);
    }

    #[rstest]
    fn remote_already_fixed_is_stable(rules: Vec<CorrectionRule>, way: Entity) {
        let fetcher = StubFetcher::default().with_found(EntityKind::Way, 12, tags(&[("name", "Chemin Pasteur")]));
        let outcome = ConvergentCorrector::new(&rules, &fetcher)
            .correct(&way, "name")
            .expect("correction succeeds");
        assert_eq!(
            outcome,
            CorrectionOutcome::Stable {
                value: "Chemin Pasteur".into()
            }
        );
    }

    #[rstest]
    fn gone_and_missing_tag_are_not_errors(rules: Vec<CorrectionRule>, way: Entity) {
        let gone = StubFetcher::default();
        let corrector = ConvergentCorrector::new(&rules, &gone);
        assert_eq!(corrector.correct(&way, "name").expect("gone"), CorrectionOutcome::Gone);

        let untagged = StubFetcher::default().with_found(EntityKind::Way, 12, Tags::new());
        let corrector = ConvergentCorrector::new(&rules, &untagged);
        assert_eq!(
            corrector.correct(&way, "name").expect("missing tag"),
            CorrectionOutcome::RemoteTagMissing
        );
    }

    #[rstest]
    fn fetch_failure_propagates(rules: Vec<CorrectionRule>, way: Entity) {
        let fetcher = StubFetcher::default().with_error(FetchError::Network {
            url: "http://osm.test".into(),
            message: "refused".into(),
        });
        let err = ConvergentCorrector::new(&rules, &fetcher)
            .correct(&way, "name")
            .expect_err("fetch fails");
        assert!(matches!(err, CorrectionError::Fetch { entity, .. } if entity == way.reference()));
    }

    #[rstest]
    fn divergence_names_rule_and_entity() {
        let rules = vec![
            CorrectionRule::search_and_replace("^A$", "B").expect("pattern compiles"),
            CorrectionRule::search_and_replace("^B$", "A").expect("pattern compiles"),
        ];
        let entity = Entity::new(EntityKind::Relation, 4, tags(&[("name", "A")]));
        let fetcher = StubFetcher::default().with_found(EntityKind::Relation, 4, tags(&[("name", "A")]));
        let err = ConvergentCorrector::new(&rules, &fetcher)
            .correct(&entity, "name")
            .expect_err("cycle diverges");
        let CorrectionError::Divergence { entity: reference, pattern, .. } = err else {
            panic!("expected divergence, got {err:?}");
        };
        assert_eq!(reference, entity.reference());
        assert_eq!(pattern, "^B$");
    }

    #[rstest]
    #[case(EntityKind::Node, &[("addr:street", "Rue")], Some("addr:street"))]
    #[case(EntityKind::Node, &[("name", "Rue")], None)]
    #[case(EntityKind::Way, &[("highway", "residential")], Some("name"))]
    #[case(EntityKind::Way, &[("highway", "footway")], None)]
    #[case(EntityKind::Relation, &[("type", "associatedStreet")], Some("name"))]
    #[case(EntityKind::Relation, &[("type", "multipolygon")], None)]
    fn eligibility_table(
        #[case] kind: EntityKind,
        #[case] pairs: &[(&str, &str)],
        #[case] expected: Option<&str>,
    ) {
        let highway = HighwayNameRules::french().expect("default vocabularies compile");
        let entity = Entity::new(kind, 1, tags(pairs));
        assert_eq!(correction_key(&entity, &highway), expected);
    }
}
