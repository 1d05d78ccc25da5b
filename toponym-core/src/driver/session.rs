//! Per-entity processing within one worker.

use log::{debug, info, log, warn};

use crate::catalogue::RuleCatalogue;
use crate::correction::{
    ConvergentCorrector, CorrectionError, CorrectionOutcome, RewriteStep, correction_key,
};
use crate::editor::{EditorCommand, EditorSink};
use crate::entity::{Entity, EntityRef};
use crate::state::RunState;
use crate::validation::{Finding, ValidationRuleSet};

/// Borrowed view of everything a worker needs to process entities.
pub(super) struct Session<'a> {
    pub(super) catalogue: &'a RuleCatalogue,
    pub(super) validation: &'a ValidationRuleSet,
    pub(super) corrector: Option<ConvergentCorrector<'a>>,
    pub(super) sink: &'a dyn EditorSink,
    pub(super) highlight_findings: bool,
}

impl Session<'_> {
    /// Aggregate, validate and correct one accepted entity.
    pub(super) fn process(&self, entity: &Entity, state: &mut RunState) -> Result<(), CorrectionError> {
        state.labels.add(entity);
        for finding in self.validation.check(entity, self.catalogue) {
            self.report(&finding, state);
        }
        let Some(corrector) = &self.corrector else {
            return Ok(());
        };
        let Some(key) = correction_key(entity, self.validation.highway_rules()) else {
            return Ok(());
        };
        let outcome = corrector.correct(entity, key)?;
        self.apply(entity.reference(), key, outcome, corrector, state);
        Ok(())
    }

    fn report(&self, finding: &Finding, state: &mut RunState) {
        state.counters.record_error();
        log!(finding.severity.level(), "{} {finding}", finding.entity);
        if self.highlight_findings {
            self.submit(&EditorCommand::highlight(finding.entity));
        }
    }

    fn apply(
        &self,
        reference: EntityRef,
        key: &str,
        outcome: CorrectionOutcome,
        corrector: &ConvergentCorrector<'_>,
        state: &mut RunState,
    ) {
        let url = reference.browse_url();
        match outcome {
            CorrectionOutcome::Clean => {}
            CorrectionOutcome::Gone => info!("{reference} no longer exists remotely, skipping {key} {url}"),
            CorrectionOutcome::RemoteTagMissing => {
                debug!("{reference} has no remote {key}, skipping correction {url}");
            }
            CorrectionOutcome::Stable { value } => {
                debug!("{reference} {key}={value:?} already fixed remotely {url}");
            }
            CorrectionOutcome::Flagged {
                pattern,
                value,
                steps,
                ..
            } => {
                log_steps(reference, key, &steps, corrector);
                state.counters.record_error();
                warn!("{reference} {key}={value:?} matches {pattern:?}, needs manual fix {url}");
                self.submit(&EditorCommand::highlight(reference));
            }
            CorrectionOutcome::Corrected {
                fetched,
                corrected,
                steps,
                ..
            } => {
                log_steps(reference, key, &steps, corrector);
                state.counters.record_error();
                state.counters.record_correction();
                warn!("{reference} {key}: {fetched:?} -> {corrected:?} {url}");
                self.submit(&EditorCommand::propose(reference, key, &corrected));
            }
        }
    }

    fn submit(&self, command: &EditorCommand) {
        if let Err(err) = self.sink.submit(command) {
            debug!("editor command for {} dropped: {err}", command.object);
        }
    }
}

fn log_steps(
    reference: EntityRef,
    key: &str,
    steps: &[RewriteStep],
    corrector: &ConvergentCorrector<'_>,
) {
    for step in steps {
        info!(
            "{reference} {key}: {:?} -> {:?} by {:?}",
            step.before,
            step.after,
            corrector.pattern(step.rule)
        );
    }
}
