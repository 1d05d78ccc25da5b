//! The rule catalogue: deprecated tags, exclusions and correction rules.
//!
//! A [`RuleCatalogue`] is assembled once through [`RuleCatalogueBuilder`] and is
//! read-only afterwards, so a single instance can be shared by every worker of
//! a run.

use std::collections::{HashMap, HashSet};
use std::fmt;

use regex::Regex;
use thiserror::Error;

use crate::entity::{EntityKind, EntityRef, Tags};

/// Errors raised while building catalogue rules.
#[derive(Debug, Error)]
pub enum RuleError {
    /// A correction pattern is not a valid regular expression.
    #[error("invalid correction pattern {pattern:?}")]
    InvalidPattern {
        /// Pattern as written in the configuration.
        pattern: String,
        /// Compilation error reported by `regex`.
        #[source]
        source: regex::Error,
    },
}

/// Outcome of applying a single [`CorrectionRule`] to a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleEffect {
    /// The rule does not change the value.
    Unchanged,
    /// A search-only rule matched; the value needs an out-of-band fix.
    Flagged,
    /// A search-and-replace rule produced a different value.
    Rewritten(String),
}

/// A pattern with an optional replacement template.
///
/// Templates use `$1` / `${name}` capture references. Without a template the
/// rule only reports.
///
/// # Examples
/// ```
/// use toponym_core::{CorrectionRule, RuleEffect};
///
/// # fn main() -> Result<(), toponym_core::RuleError> {
/// let rule = CorrectionRule::search_and_replace(r"^Ch\.\s", "Chemin ")?;
/// assert_eq!(
///     rule.apply("Ch. Pasteur"),
///     RuleEffect::Rewritten("Chemin Pasteur".into())
/// );
/// assert_eq!(rule.apply("Chemin Pasteur"), RuleEffect::Unchanged);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CorrectionRule {
    pattern: Regex,
    template: Option<String>,
}

impl CorrectionRule {
    /// A rule that only reports matches.
    ///
    /// # Errors
    /// Returns [`RuleError::InvalidPattern`] when `pattern` does not compile.
    pub fn search_only(pattern: &str) -> Result<Self, RuleError> {
        Ok(Self {
            pattern: compile(pattern)?,
            template: None,
        })
    }

    /// A rule that rewrites every match with `template`.
    ///
    /// # Errors
    /// Returns [`RuleError::InvalidPattern`] when `pattern` does not compile.
    pub fn search_and_replace(pattern: &str, template: &str) -> Result<Self, RuleError> {
        Ok(Self {
            pattern: compile(pattern)?,
            template: Some(template.to_owned()),
        })
    }

    /// Build from a configuration row; an empty template means search-only.
    ///
    /// A rewrite that deletes text therefore has to keep what survives
    /// through a capture group, e.g. `^(.*\S)\s+$` with template `$1`.
    ///
    /// # Errors
    /// Returns [`RuleError::InvalidPattern`] when `pattern` does not compile.
    pub fn from_parts(pattern: &str, template: Option<&str>) -> Result<Self, RuleError> {
        match template {
            Some(template) if !template.is_empty() => Self::search_and_replace(pattern, template),
            _ => Self::search_only(pattern),
        }
    }

    /// Source text of the pattern.
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Replacement template, if any.
    #[must_use]
    pub fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    /// Whether this rule reports without rewriting.
    #[must_use]
    pub const fn is_search_only(&self) -> bool {
        self.template.is_none()
    }

    /// Apply the rule once to `value`.
    #[must_use]
    pub fn apply(&self, value: &str) -> RuleEffect {
        match &self.template {
            None if self.pattern.is_match(value) => RuleEffect::Flagged,
            None => RuleEffect::Unchanged,
            Some(template) => {
                let expanded = self.pattern.replace_all(value, template.as_str());
                if expanded == value {
                    RuleEffect::Unchanged
                } else {
                    RuleEffect::Rewritten(expanded.into_owned())
                }
            }
        }
    }
}

impl fmt::Display for CorrectionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.template {
            Some(template) => write!(f, "/{}/ -> {template:?}", self.pattern),
            None => write!(f, "/{}/", self.pattern),
        }
    }
}

fn compile(pattern: &str) -> Result<Regex, RuleError> {
    Regex::new(pattern).map_err(|source| RuleError::InvalidPattern {
        pattern: pattern.to_owned(),
        source,
    })
}

/// Identifiers skipped from all processing, per entity kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Exclusions {
    ids: HashMap<EntityKind, HashSet<i64>>,
}

impl Exclusions {
    /// Add `id` to the exclusion set for `kind`.
    pub fn insert(&mut self, kind: EntityKind, id: i64) {
        self.ids.entry(kind).or_default().insert(id);
    }

    /// Whether the referenced entity is excluded.
    #[must_use]
    pub fn contains(&self, reference: EntityRef) -> bool {
        self.ids
            .get(&reference.kind)
            .is_some_and(|ids| ids.contains(&reference.id))
    }

    /// Number of excluded identifiers for `kind`.
    #[must_use]
    pub fn len(&self, kind: EntityKind) -> usize {
        self.ids.get(&kind).map_or(0, HashSet::len)
    }

    /// Whether no identifier is excluded at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.values().all(HashSet::is_empty)
    }
}

/// Immutable collection of rules consulted during a run.
#[derive(Debug, Clone, Default)]
pub struct RuleCatalogue {
    deprecated_keys: HashSet<String>,
    deprecated_tags: HashMap<String, HashSet<String>>,
    exclusions: Exclusions,
    corrections: Vec<CorrectionRule>,
}

impl RuleCatalogue {
    /// Start assembling a catalogue.
    #[must_use]
    pub fn builder() -> RuleCatalogueBuilder {
        RuleCatalogueBuilder::default()
    }

    /// Whether `key` is deprecated.
    #[must_use]
    pub fn is_deprecated_key(&self, key: &str) -> bool {
        self.deprecated_keys.contains(key)
    }

    /// Whether the `key=value` pair is deprecated.
    #[must_use]
    pub fn is_deprecated_tag(&self, key: &str, value: &str) -> bool {
        self.deprecated_tags
            .get(key)
            .is_some_and(|values| values.contains(value))
    }

    /// Deprecated keys present in `tags`, sorted for stable reporting.
    #[must_use]
    pub fn deprecated_keys_in<'a>(&self, tags: &'a Tags) -> Vec<&'a str> {
        let mut found: Vec<&str> = tags
            .keys()
            .map(String::as_str)
            .filter(|key| self.is_deprecated_key(key))
            .collect();
        found.sort_unstable();
        found
    }

    /// Deprecated `key=value` pairs present in `tags`, sorted by key.
    #[must_use]
    pub fn deprecated_tags_in<'a>(&self, tags: &'a Tags) -> Vec<(&'a str, &'a str)> {
        let mut found: Vec<(&str, &str)> = tags
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .filter(|(key, value)| self.is_deprecated_tag(key, value))
            .collect();
        found.sort_unstable();
        found
    }

    /// Exclusion sets per kind.
    #[must_use]
    pub const fn exclusions(&self) -> &Exclusions {
        &self.exclusions
    }

    /// Correction rules in evaluation order.
    #[must_use]
    pub fn corrections(&self) -> &[CorrectionRule] {
        &self.corrections
    }

    /// Number of deprecated keys.
    #[must_use]
    pub fn deprecated_key_count(&self) -> usize {
        self.deprecated_keys.len()
    }

    /// Number of deprecated key/value pairs.
    #[must_use]
    pub fn deprecated_tag_count(&self) -> usize {
        self.deprecated_tags.values().map(HashSet::len).sum()
    }
}

/// Builder for [`RuleCatalogue`].
///
/// # Examples
/// ```
/// use toponym_core::{CorrectionRule, EntityKind, EntityRef, RuleCatalogue};
///
/// # fn main() -> Result<(), toponym_core::RuleError> {
/// let catalogue = RuleCatalogue::builder()
///     .deprecated_key("fixme:name")
///     .deprecated_tag("highway", "ford")
///     .exclude(EntityKind::Way, 12)
///     .correction(CorrectionRule::search_and_replace(r"^Av\.\s", "Avenue ")?)
///     .build();
///
/// assert!(catalogue.is_deprecated_key("fixme:name"));
/// assert!(catalogue.exclusions().contains(EntityRef::new(EntityKind::Way, 12)));
/// assert_eq!(catalogue.corrections().len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct RuleCatalogueBuilder {
    catalogue: RuleCatalogue,
}

impl RuleCatalogueBuilder {
    /// Mark `key` as deprecated.
    #[must_use]
    pub fn deprecated_key(mut self, key: impl Into<String>) -> Self {
        self.catalogue.deprecated_keys.insert(key.into());
        self
    }

    /// Mark the `key=value` pair as deprecated.
    #[must_use]
    pub fn deprecated_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.catalogue
            .deprecated_tags
            .entry(key.into())
            .or_default()
            .insert(value.into());
        self
    }

    /// Skip the entity `kind/id` for the whole run.
    #[must_use]
    pub fn exclude(mut self, kind: EntityKind, id: i64) -> Self {
        self.catalogue.exclusions.insert(kind, id);
        self
    }

    /// Append a correction rule; order of calls is evaluation order.
    #[must_use]
    pub fn correction(mut self, rule: CorrectionRule) -> Self {
        self.catalogue.corrections.push(rule);
        self
    }

    /// Append several correction rules in order.
    #[must_use]
    pub fn corrections<I>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = CorrectionRule>,
    {
        self.catalogue.corrections.extend(rules);
        self
    }

    /// Freeze the catalogue.
    #[must_use]
    pub fn build(self) -> RuleCatalogue {
        self.catalogue
    }
}
