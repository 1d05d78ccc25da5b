//! Individual label and tag predicates.
//!
//! Each function inspects one entity and returns the findings it raises. A
//! missing tag skips the check.

use regex::Regex;

use crate::catalogue::{RuleCatalogue, RuleError};
use crate::entity::{Entity, EntityKind};

use super::highway::{HighwayNameRules, HighwayVerdict};
use super::{Check, Finding, Severity, ValidationOptions};

const MONTHS: &str = "Janvier|Février|Mars|Avril|Mai|Juin|Juillet|Août|Septembre|Octobre|Novembre|Décembre";

/// Tags whose presence allows a label to start with a digit.
const DIGIT_LABEL_KEYS: &[&str] = &["amenity", "office", "razed:shop", "shop"];

const DIGIT_LABEL_TAGS: &[(&str, &[&str])] = &[
    ("highway", &["bus_stop"]),
    ("historic", &["memorial"]),
    ("public_transport", &["stop_position", "plateform"]),
    ("tourism", &["artwork", "chalet", "hotel"]),
];

/// Compiled patterns for the leading-digit check.
#[derive(Debug, Clone)]
pub(super) struct DigitPatterns {
    leading_digit: Regex,
    month: Regex,
    ordinal: Regex,
}

impl DigitPatterns {
    pub(super) fn new() -> Result<Self, RuleError> {
        Ok(Self {
            leading_digit: compile(r"^\d")?,
            month: compile(&format!(r"^\d+ (?:{MONTHS})"))?,
            ordinal: compile(r"^(?:1er|1ère|\d+e|\d+è|\d+ème)\s")?,
        })
    }

    fn is_suspect(&self, label: &str) -> bool {
        self.leading_digit.is_match(label)
            && !self.month.is_match(label)
            && !self.ordinal.is_match(label)
    }
}

fn compile(pattern: &str) -> Result<Regex, RuleError> {
    Regex::new(pattern).map_err(|source| RuleError::InvalidPattern {
        pattern: pattern.to_owned(),
        source,
    })
}

pub(super) fn label_equals_housenumber(
    entity: &Entity,
    options: &ValidationOptions,
) -> Option<Finding> {
    let label = entity.label()?;
    let housenumber = entity.tag("addr:housenumber")?;
    if label != housenumber
        || (entity.kind == EntityKind::Node
            && options.housenumber_exempt_nodes.contains(&entity.id))
        || entity.tag_is_any("amenity", &["restaurant"])
    {
        return None;
    }
    Some(Finding::new(
        Check::LabelEqualsHousenumber,
        Severity::Warning,
        entity.reference(),
        format!("name {label:?} equals addr:housenumber"),
    ))
}

pub(super) fn label_equals_ref(entity: &Entity) -> Option<Finding> {
    let label = entity.label()?;
    let reference = entity.tag("ref")?;
    (label == reference).then(|| {
        Finding::new(
            Check::LabelEqualsRef,
            Severity::Warning,
            entity.reference(),
            format!("name {label:?} equals ref"),
        )
    })
}

/// Leading whitespace is an error; trailing whitespace alone is informational.
pub(super) fn label_padding(entity: &Entity) -> Option<Finding> {
    let label = entity.label()?;
    let (severity, position) = if label.starts_with(char::is_whitespace) {
        (Severity::Error, "leading")
    } else if label.ends_with(char::is_whitespace) {
        (Severity::Info, "trailing")
    } else {
        return None;
    };
    Some(Finding::new(
        Check::LabelPadding,
        severity,
        entity.reference(),
        format!("name {label:?} has {position} whitespace"),
    ))
}

pub(super) fn label_leading_digit(entity: &Entity, patterns: &DigitPatterns) -> Option<Finding> {
    let label = entity.label()?;
    if !patterns.is_suspect(label) || has_digit_label_carve_out(entity) {
        return None;
    }
    Some(Finding::new(
        Check::LabelLeadingDigit,
        Severity::Warning,
        entity.reference(),
        format!("name {label:?} starts with a digit"),
    ))
}

fn has_digit_label_carve_out(entity: &Entity) -> bool {
    DIGIT_LABEL_KEYS.iter().any(|key| entity.has_tag(key))
        || DIGIT_LABEL_TAGS
            .iter()
            .any(|(key, values)| entity.tag_is_any(key, values))
}

pub(super) fn deprecated_tags(entity: &Entity, catalogue: &RuleCatalogue) -> Vec<Finding> {
    catalogue
        .deprecated_tags_in(&entity.tags)
        .into_iter()
        .map(|(key, value)| {
            Finding::new(
                Check::DeprecatedTag,
                Severity::Info,
                entity.reference(),
                format!("deprecated tag {key}={value}"),
            )
        })
        .collect()
}

pub(super) fn deprecated_keys(entity: &Entity, catalogue: &RuleCatalogue) -> Vec<Finding> {
    catalogue
        .deprecated_keys_in(&entity.tags)
        .into_iter()
        .map(|key| {
            Finding::new(
                Check::DeprecatedKey,
                Severity::Info,
                entity.reference(),
                format!("deprecated key {key}"),
            )
        })
        .collect()
}

pub(super) fn highway_name_shape(
    entity: &Entity,
    rules: &HighwayNameRules,
    options: &ValidationOptions,
) -> Option<Finding> {
    let highway = entity.tag("highway")?;
    if !rules.is_roadway(highway) {
        return None;
    }
    let label = entity.label()?;
    let (severity, message) = match rules.classify(label, options.highway_whitelist) {
        HighwayVerdict::Blacklisted(pattern) => (
            Severity::Error,
            format!("road name {label:?} matches bad pattern {pattern:?}"),
        ),
        HighwayVerdict::UnknownRoadType => (
            Severity::Debug,
            format!("road name {label:?} has no known road-type prefix"),
        ),
        HighwayVerdict::Accepted => return None,
    };
    Some(Finding::new(
        Check::HighwayNameShape,
        severity,
        entity.reference(),
        message,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Tags;
    use rstest::{fixture, rstest};

    fn way(tags: &[(&str, &str)]) -> Entity {
        let tags: Tags = tags
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        Entity::new(EntityKind::Way, 10, tags)
    }

    #[fixture]
    fn patterns() -> DigitPatterns {
        DigitPatterns::new().expect("digit patterns compile")
    }

    #[rstest]
    #[case(" Rue Pasteur", Some(Severity::Error))]
    #[case("Rue Pasteur ", Some(Severity::Info))]
    #[case(" Rue Pasteur ", Some(Severity::Error))]
    #[case("Rue Pasteur", None)]
    fn padding_severity(#[case] label: &str, #[case] expected: Option<Severity>) {
        let finding = label_padding(&way(&[("name", label)]));
        assert_eq!(finding.map(|f| f.severity), expected);
    }

    #[rstest]
    #[case("12 Rue Pasteur", true)]
    #[case("8 Mai 1945", false)]
    #[case("14 Juillet", false)]
    #[case("1er Régiment", false)]
    #[case("1ère Armée", false)]
    #[case("2e Division", false)]
    #[case("3ème Zouaves", false)]
    #[case("Rue Pasteur", false)]
    fn leading_digit(patterns: DigitPatterns, #[case] label: &str, #[case] fires: bool) {
        let finding = label_leading_digit(&way(&[("name", label)]), &patterns);
        assert_eq!(finding.is_some(), fires);
    }

    #[rstest]
    #[case(&[("shop", "bakery")])]
    #[case(&[("amenity", "cafe")])]
    #[case(&[("highway", "bus_stop")])]
    #[case(&[("public_transport", "plateform")])]
    #[case(&[("tourism", "hotel")])]
    fn leading_digit_carve_outs(patterns: DigitPatterns, #[case] extra: &[(&str, &str)]) {
        let mut tags = vec![("name", "12 Rue Pasteur")];
        tags.extend_from_slice(extra);
        assert!(label_leading_digit(&way(&tags), &patterns).is_none());
    }

    #[rstest]
    fn housenumber_skips_restaurants_and_exempt_nodes() {
        let options = ValidationOptions::default().with_housenumber_exempt_nodes([10]);
        let pairs = [("name", "12"), ("addr:housenumber", "12")];
        let node = Entity::new(EntityKind::Node, 10, way(&pairs).tags);
        assert!(label_equals_housenumber(&node, &ValidationOptions::default()).is_some());
        assert!(label_equals_housenumber(&node, &options).is_none());

        let same_id_way = way(&pairs);
        assert_eq!(same_id_way.id, 10);
        assert!(label_equals_housenumber(&same_id_way, &options).is_some());

        let restaurant = way(&[("name", "12"), ("addr:housenumber", "12"), ("amenity", "restaurant")]);
        assert!(label_equals_housenumber(&restaurant, &ValidationOptions::default()).is_none());
    }

    #[rstest]
    fn missing_tags_skip_checks(patterns: DigitPatterns) {
        let entity = way(&[("ref", "D 12")]);
        assert!(label_equals_ref(&entity).is_none());
        assert!(label_padding(&entity).is_none());
        assert!(label_leading_digit(&entity, &patterns).is_none());
    }

    #[rstest]
    fn highway_shape_ignores_non_roadways() {
        let rules = HighwayNameRules::french().expect("default vocabularies compile");
        let options = ValidationOptions::default();
        let footway = way(&[("highway", "footway"), ("name", "Chemin Chemin Vert")]);
        let road = way(&[("highway", "residential"), ("name", "Chemin Chemin Vert")]);
        assert!(highway_name_shape(&footway, &rules, &options).is_none());
        assert_eq!(
            highway_name_shape(&road, &rules, &options).map(|f| f.severity),
            Some(Severity::Error)
        );
    }
}
