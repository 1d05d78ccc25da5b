//! Probe and bounded fixpoint over an ordered list of correction rules.

use std::collections::HashSet;

use crate::catalogue::{CorrectionRule, RuleEffect};

/// Default cap on fixpoint passes.
pub const DEFAULT_MAX_PASSES: usize = 16;

/// One rewrite applied during the fixpoint loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteStep {
    /// Index of the rule in catalogue order.
    pub rule: usize,
    /// Value before the rewrite.
    pub before: String,
    /// Value after the rewrite.
    pub after: String,
}

/// Result of running the fixpoint loop to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Convergence {
    /// Final value. Equals the start value when nothing was rewritten.
    pub value: String,
    /// Every rewrite, in application order.
    pub steps: Vec<RewriteStep>,
    /// Index of the search-only rule that ended the loop, if any.
    pub flagged: Option<usize>,
    /// Passes run, including the final unchanged pass.
    pub passes: usize,
}

impl Convergence {
    /// Whether any rule rewrote the value.
    #[must_use]
    pub fn changed(&self) -> bool {
        !self.steps.is_empty()
    }
}

/// The loop failed to reach a fixpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diverged {
    /// Last rule that rewrote the value.
    pub rule: usize,
    /// Passes run before giving up.
    pub passes: usize,
    /// Value at the point of failure.
    pub value: String,
}

/// Whether any rule would flag or change `value`.
///
/// # Examples
/// ```
/// use toponym_core::{CorrectionRule, probe};
///
/// # fn main() -> Result<(), toponym_core::RuleError> {
/// let rules = [CorrectionRule::search_and_replace(r"^Ch\.\s", "Chemin ")?];
/// assert!(probe(&rules, "Ch. Pasteur"));
/// assert!(!probe(&rules, "Chemin Pasteur"));
/// # Ok(())
/// # }
/// ```
#[must_use]
pub fn probe(rules: &[CorrectionRule], value: &str) -> bool {
    rules
        .iter()
        .any(|rule| rule.apply(value) != RuleEffect::Unchanged)
}

/// Apply `rules` in order, pass after pass, until a pass changes nothing.
///
/// Within a pass, each rewriting rule sees the output of the previous one. A
/// search-only rule that matches ends the loop immediately. At most
/// `max_passes` passes are run (at least one).
///
/// # Errors
/// Returns [`Diverged`] when the pass cap is reached or a value repeats at the
/// end of a pass.
pub fn converge(
    rules: &[CorrectionRule],
    start: &str,
    max_passes: usize,
) -> Result<Convergence, Diverged> {
    let mut value = start.to_owned();
    let mut steps = Vec::new();
    let mut seen = HashSet::from([value.clone()]);
    let mut last_rule = 0;

    for passes in 1..=max_passes.max(1) {
        let mut changed = false;
        for (index, rule) in rules.iter().enumerate() {
            match rule.apply(&value) {
                RuleEffect::Unchanged => {}
                RuleEffect::Flagged => {
                    return Ok(Convergence {
                        value,
                        steps,
                        flagged: Some(index),
                        passes,
                    });
                }
                RuleEffect::Rewritten(after) => {
                    steps.push(RewriteStep {
                        rule: index,
                        before: std::mem::replace(&mut value, after.clone()),
                        after,
                    });
                    last_rule = index;
                    changed = true;
                }
            }
        }
        if !changed {
            return Ok(Convergence {
                value,
                steps,
                flagged: None,
                passes,
            });
        }
        if !seen.insert(value.clone()) {
            return Err(Diverged {
                rule: last_rule,
                passes,
                value,
            });
        }
    }

    Err(Diverged {
        rule: last_rule,
        passes: max_passes.max(1),
        value,
    })
}
