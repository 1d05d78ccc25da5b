//! Stateless per-entity validation checks.
//!
//! [`ValidationRuleSet::check`] runs the checks applicable to an entity's kind
//! (see [`Check::for_kind`]) and returns every finding. Checks never fail; a
//! missing tag simply skips the dependent check.

mod checks;
mod finding;
mod highway;

use std::collections::HashSet;

use crate::catalogue::{RuleCatalogue, RuleError};
use crate::entity::{Entity, EntityKind};

use checks::DigitPatterns;
pub use finding::{Finding, Severity};
pub use highway::{HighwayNameRules, HighwayVerdict, ROADWAY_VALUES};

/// Identifies one validation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Check {
    /// `name` equals `addr:housenumber`.
    LabelEqualsHousenumber,
    /// `name` equals `ref`.
    LabelEqualsRef,
    /// `name` starts or ends with whitespace.
    LabelPadding,
    /// `name` starts with a digit.
    LabelLeadingDigit,
    /// A deprecated `key=value` pair is present.
    DeprecatedTag,
    /// A deprecated key is present.
    DeprecatedKey,
    /// Road name matches the blacklist or misses the whitelist.
    HighwayNameShape,
}

const NODE_AND_WAY_CHECKS: &[Check] = &[
    Check::HighwayNameShape,
    Check::LabelEqualsHousenumber,
    Check::LabelEqualsRef,
    Check::LabelPadding,
    Check::LabelLeadingDigit,
    Check::DeprecatedTag,
    Check::DeprecatedKey,
];

const RELATION_CHECKS: &[Check] = &[
    Check::HighwayNameShape,
    Check::LabelEqualsRef,
    Check::LabelPadding,
    Check::DeprecatedTag,
    Check::DeprecatedKey,
];

impl Check {
    /// Stable identifier used in diagnostics.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::LabelEqualsHousenumber => "label-equals-housenumber",
            Self::LabelEqualsRef => "label-equals-ref",
            Self::LabelPadding => "label-padding",
            Self::LabelLeadingDigit => "label-leading-digit",
            Self::DeprecatedTag => "deprecated-tag",
            Self::DeprecatedKey => "deprecated-key",
            Self::HighwayNameShape => "highway-name-shape",
        }
    }

    /// Checks applicable to entities of `kind`, in evaluation order.
    ///
    /// # Examples
    /// ```
    /// use toponym_core::{Check, EntityKind};
    ///
    /// assert!(Check::for_kind(EntityKind::Way).contains(&Check::LabelLeadingDigit));
    /// assert!(!Check::for_kind(EntityKind::Relation).contains(&Check::LabelLeadingDigit));
    /// ```
    #[must_use]
    pub const fn for_kind(kind: EntityKind) -> &'static [Self] {
        match kind {
            EntityKind::Node | EntityKind::Way => NODE_AND_WAY_CHECKS,
            EntityKind::Relation => RELATION_CHECKS,
        }
    }

    const fn is_deprecation(self) -> bool {
        matches!(self, Self::DeprecatedTag | Self::DeprecatedKey)
    }
}

/// Toggles for optional checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Flag road names with no known road-type prefix.
    pub highway_whitelist: bool,
    /// Run the deprecated key and tag checks.
    pub deprecated_checks: bool,
    /// Node ids exempt from the housenumber check.
    pub housenumber_exempt_nodes: HashSet<i64>,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            highway_whitelist: false,
            deprecated_checks: true,
            housenumber_exempt_nodes: HashSet::new(),
        }
    }
}

impl ValidationOptions {
    /// Enable or disable the road-type whitelist.
    #[must_use]
    pub const fn with_highway_whitelist(mut self, enabled: bool) -> Self {
        self.highway_whitelist = enabled;
        self
    }

    /// Enable or disable the deprecated key and tag checks.
    #[must_use]
    pub const fn with_deprecated_checks(mut self, enabled: bool) -> Self {
        self.deprecated_checks = enabled;
        self
    }

    /// Exempt the given node ids from the housenumber check.
    #[must_use]
    pub fn with_housenumber_exempt_nodes<I>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = i64>,
    {
        self.housenumber_exempt_nodes.extend(ids);
        self
    }
}

/// The full set of validation checks with their compiled vocabularies.
#[derive(Debug, Clone)]
pub struct ValidationRuleSet {
    options: ValidationOptions,
    highway: HighwayNameRules,
    digits: DigitPatterns,
}

impl ValidationRuleSet {
    /// Build a rule set using the French road-name vocabularies.
    ///
    /// # Errors
    /// Returns [`RuleError`] if a built-in pattern fails to compile.
    pub fn new(options: ValidationOptions) -> Result<Self, RuleError> {
        Self::with_highway_rules(options, HighwayNameRules::french()?)
    }

    /// Build a rule set with custom road-name vocabularies.
    ///
    /// # Errors
    /// Returns [`RuleError`] if a built-in pattern fails to compile.
    pub fn with_highway_rules(
        options: ValidationOptions,
        highway: HighwayNameRules,
    ) -> Result<Self, RuleError> {
        Ok(Self {
            options,
            highway,
            digits: DigitPatterns::new()?,
        })
    }

    /// Road-name vocabularies, also used to decide correction eligibility.
    #[must_use]
    pub const fn highway_rules(&self) -> &HighwayNameRules {
        &self.highway
    }

    /// Run every check applicable to `entity` and collect the findings.
    #[must_use]
    pub fn check(&self, entity: &Entity, catalogue: &RuleCatalogue) -> Vec<Finding> {
        let mut findings = Vec::new();
        for check in Check::for_kind(entity.kind) {
            if check.is_deprecation() && !self.options.deprecated_checks {
                continue;
            }
            self.run(*check, entity, catalogue, &mut findings);
        }
        findings
    }

    fn run(&self, check: Check, entity: &Entity, catalogue: &RuleCatalogue, out: &mut Vec<Finding>) {
        match check {
            Check::LabelEqualsHousenumber => {
                out.extend(checks::label_equals_housenumber(entity, &self.options));
            }
            Check::LabelEqualsRef => out.extend(checks::label_equals_ref(entity)),
            Check::LabelPadding => out.extend(checks::label_padding(entity)),
            Check::LabelLeadingDigit => {
                out.extend(checks::label_leading_digit(entity, &self.digits));
            }
            Check::DeprecatedTag => out.extend(checks::deprecated_tags(entity, catalogue)),
            Check::DeprecatedKey => out.extend(checks::deprecated_keys(entity, catalogue)),
            Check::HighwayNameShape => {
                out.extend(checks::highway_name_shape(entity, &self.highway, &self.options));
            }
        }
    }
}
