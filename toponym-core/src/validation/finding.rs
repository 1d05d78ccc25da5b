//! Findings raised by validation checks and their severities.

use std::fmt;

use crate::entity::EntityRef;

use super::Check;

/// Severity attached to a finding; maps onto `log` levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Severity {
    /// Informational flag, e.g. an unknown road-type prefix.
    Debug,
    /// Low-impact issue such as a deprecated tag.
    Info,
    /// Likely mistake.
    Warning,
    /// Definite defect.
    Error,
}

impl Severity {
    /// Matching `log` level.
    #[must_use]
    pub const fn level(self) -> log::Level {
        match self {
            Self::Debug => log::Level::Debug,
            Self::Info => log::Level::Info,
            Self::Warning => log::Level::Warn,
            Self::Error => log::Level::Error,
        }
    }
}

/// A data-quality defect detected on one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// Check that raised the finding.
    pub check: Check,
    /// How serious the defect is.
    pub severity: Severity,
    /// Entity carrying the defect.
    pub entity: EntityRef,
    /// Human-readable description.
    pub message: String,
}

impl Finding {
    pub(super) fn new(
        check: Check,
        severity: Severity,
        entity: EntityRef,
        message: impl Into<String>,
    ) -> Self {
        Self {
            check,
            severity,
            entity,
            message: message.into(),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {}",
            self.check.id(),
            self.message,
            self.entity.browse_url()
        )
    }
}
