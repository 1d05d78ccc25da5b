//! The stream driver: pulls chunks, fans each one out to a worker pool and
//! folds the per-worker state.
//!
//! Each accepted entity is fed to the label aggregator, then to the checks for
//! its kind, then to the corrector when eligible. Any decoder or correction
//! error aborts the run; editor failures never do.

mod cancel;
mod progress;
mod session;
mod source;

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::info;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use thiserror::Error;

use crate::catalogue::RuleCatalogue;
use crate::classifier::EntityClassifier;
use crate::correction::{ConvergentCorrector, CorrectionError, DEFAULT_MAX_PASSES};
use crate::editor::EditorSink;
use crate::entity::RawEntity;
use crate::labels::LabelAggregator;
use crate::remote::EntityFetcher;
use crate::state::{RunCounters, RunState};
use crate::validation::ValidationRuleSet;

pub use cancel::CancellationToken;
pub use progress::{LogProgress, Progress, ProgressObserver};
pub use source::{ChunkError, ChunkSource};

use session::Session;

/// Fatal run failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// The decoder failed on a chunk.
    #[error("failed to decode chunk {chunk}")]
    Source {
        /// Zero-based index of the failing chunk.
        chunk: usize,
        /// Decoder error.
        source: ChunkError,
    },
    /// A correction failed.
    #[error(transparent)]
    Correction(#[from] CorrectionError),
    /// The worker pool could not be created.
    #[error("failed to build the worker pool")]
    WorkerPool(#[source] ThreadPoolBuildError),
}

/// Engine tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Worker threads per chunk.
    pub workers: usize,
    /// Run the corrector on eligible entities.
    pub corrections_enabled: bool,
    /// Ask the editor to highlight every finding.
    pub highlight_findings: bool,
    /// Cap on fixpoint passes.
    pub max_passes: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            workers: 1,
            corrections_enabled: true,
            highlight_findings: false,
            max_passes: DEFAULT_MAX_PASSES,
        }
    }
}

impl EngineOptions {
    /// Set the worker count (at least one thread is always used).
    #[must_use]
    pub const fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Enable or disable corrections.
    #[must_use]
    pub const fn with_corrections(mut self, enabled: bool) -> Self {
        self.corrections_enabled = enabled;
        self
    }

    /// Enable or disable editor highlights for findings.
    #[must_use]
    pub const fn with_highlight_findings(mut self, enabled: bool) -> Self {
        self.highlight_findings = enabled;
        self
    }

    /// Set the fixpoint pass cap.
    #[must_use]
    pub const fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }
}

/// Outcome of a complete or cancelled run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Final tallies.
    pub counters: RunCounters,
    /// Aggregated labels.
    pub labels: LabelAggregator,
    /// Chunks processed.
    pub chunks: usize,
    /// Wall-clock duration.
    pub elapsed: Duration,
    /// Whether the run stopped early on request.
    pub cancelled: bool,
}

/// Runs validation and correction over a chunk source.
pub struct Engine {
    catalogue: Arc<RuleCatalogue>,
    validation: ValidationRuleSet,
    fetcher: Arc<dyn EntityFetcher>,
    sink: Arc<dyn EditorSink>,
    options: EngineOptions,
}

impl Engine {
    /// Assemble an engine with default options.
    #[must_use]
    pub fn new(
        catalogue: Arc<RuleCatalogue>,
        validation: ValidationRuleSet,
        fetcher: Arc<dyn EntityFetcher>,
        sink: Arc<dyn EditorSink>,
    ) -> Self {
        Self {
            catalogue,
            validation,
            fetcher,
            sink,
            options: EngineOptions::default(),
        }
    }

    /// Replace the engine options.
    #[must_use]
    pub const fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    /// Process every chunk of `source`.
    ///
    /// `cancel` is checked before each chunk; a cancelled run returns the
    /// partial report with [`RunReport::cancelled`] set.
    ///
    /// # Errors
    /// Returns [`RunError`] when the decoder fails, a correction fails or the
    /// worker pool cannot be built.
    pub fn run(
        &self,
        source: &mut dyn ChunkSource,
        observer: &mut dyn ProgressObserver,
        cancel: &CancellationToken,
    ) -> Result<RunReport, RunError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.options.workers.max(1))
            .build()
            .map_err(RunError::WorkerPool)?;
        let started = Instant::now();
        let total_chunks = source.total_chunks();
        let mut state = RunState::default();
        let mut chunks = 0;
        let mut cancelled = false;

        loop {
            if cancel.is_cancelled() {
                info!("run cancelled after {chunks} chunks");
                cancelled = true;
                break;
            }
            let Some(next) = source.next_chunk() else {
                break;
            };
            let entities = next.map_err(|err| RunError::Source {
                chunk: chunks,
                source: err,
            })?;
            state = state.combine(self.process_chunk(&pool, entities)?);
            chunks += 1;
            observer.on_chunk(&Progress {
                chunks_done: chunks,
                total_chunks,
                elapsed: started.elapsed(),
                counters: state.counters,
                labels: state.labels.len(),
            });
        }

        Ok(RunReport {
            counters: state.counters,
            labels: state.labels,
            chunks,
            elapsed: started.elapsed(),
            cancelled,
        })
    }

    fn process_chunk(
        &self,
        pool: &ThreadPool,
        entities: Vec<RawEntity>,
    ) -> Result<RunState, CorrectionError> {
        let classifier = EntityClassifier::new(self.catalogue.exclusions());
        let session = Session {
            catalogue: &self.catalogue,
            validation: &self.validation,
            corrector: self.options.corrections_enabled.then(|| {
                ConvergentCorrector::new(self.catalogue.corrections(), self.fetcher.as_ref())
                    .with_max_passes(self.options.max_passes)
            }),
            sink: self.sink.as_ref(),
            highlight_findings: self.options.highlight_findings,
        };
        pool.install(|| {
            entities
                .into_par_iter()
                .try_fold(RunState::default, |mut state, raw| {
                    if let Some(entity) = classifier.classify(raw, &mut state.counters) {
                        session.process(&entity, &mut state)?;
                    }
                    Ok(state)
                })
                .try_reduce(RunState::default, |left, right| Ok(left.combine(right)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::CorrectionRule;
    use crate::entity::{EntityKind, Tags};
    use crate::test_support::{RecordingProgress, RecordingSink, StubFetcher, VecChunkSource};
    use crate::validation::ValidationOptions;
    use rstest::{fixture, rstest};

    fn way(id: i64, pairs: &[(&str, &str)]) -> RawEntity {
        RawEntity::Way {
            id,
            tags: pairs
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
            node_refs: vec![1, 2],
        }
    }

    #[fixture]
    fn catalogue() -> Arc<RuleCatalogue> {
        let rule = CorrectionRule::search_and_replace(r"^Ch\.\s", "Chemin ").expect("pattern compiles");
        Arc::new(
            RuleCatalogue::builder()
                .correction(rule)
                .exclude(EntityKind::Way, 99)
                .build(),
        )
    }

    fn engine(catalogue: Arc<RuleCatalogue>, fetcher: Arc<StubFetcher>, sink: Arc<RecordingSink>) -> Engine {
        let validation = ValidationRuleSet::new(ValidationOptions::default()).expect("rule set builds");
        Engine::new(catalogue, validation, fetcher, sink)
    }

    #[rstest]
    fn reports_progress_per_chunk(catalogue: Arc<RuleCatalogue>) {
        let engine = engine(catalogue, Arc::default(), Arc::default());
        let mut source = VecChunkSource::new(vec![
            vec![way(1, &[("name", "Rue Haute")])],
            vec![way(2, &[("name", "Rue Basse")]), way(99, &[("name", " Rue")])],
        ]);
        let mut progress = RecordingProgress::default();
        let report = engine
            .run(&mut source, &mut progress, &CancellationToken::new())
            .expect("run succeeds");
        assert_eq!(report.chunks, 2);
        assert_eq!(report.counters.ways, 2);
        assert_eq!(report.counters.errors, 0);
        assert_eq!(progress.snapshots().len(), 2);
        assert_eq!(
            progress.snapshots().last().and_then(Progress::percent),
            Some(100)
        );
    }

    #[rstest]
    fn proposes_correction_for_stale_name(catalogue: Arc<RuleCatalogue>) {
        let fetcher = Arc::new(StubFetcher::default().with_found(
            EntityKind::Way,
            5,
            Tags::from([("name".into(), "Ch. Pasteur".into())]),
        ));
        let sink = Arc::new(RecordingSink::default());
        let engine = engine(catalogue, Arc::clone(&fetcher), Arc::clone(&sink));
        let mut source = VecChunkSource::new(vec![vec![way(
            5,
            &[("highway", "residential"), ("name", "Ch. Pasteur")],
        )]]);
        let report = engine
            .run(&mut source, &mut RecordingProgress::default(), &CancellationToken::new())
            .expect("run succeeds");
        assert_eq!(report.counters.errors, 1);
        assert_eq!(report.counters.corrections, 1);
        let commands = sink.commands();
        assert_eq!(commands.len(), 1);
        assert_eq!(
            commands.first().and_then(|c| c.add_tags.clone()),
            Some(("name".to_owned(), "Chemin Pasteur".to_owned()))
        );
    }

    #[rstest]
    fn cancellation_stops_before_next_chunk(catalogue: Arc<RuleCatalogue>) {
        let engine = engine(catalogue, Arc::default(), Arc::default());
        let mut source = VecChunkSource::new(vec![vec![way(1, &[])], vec![way(2, &[])]]);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let report = engine
            .run(&mut source, &mut RecordingProgress::default(), &cancel)
            .expect("run succeeds");
        assert!(report.cancelled);
        assert_eq!(report.chunks, 0);
    }

    #[rstest]
    fn decoder_error_aborts_with_chunk_index(catalogue: Arc<RuleCatalogue>) {
        let engine = engine(catalogue, Arc::default(), Arc::default());
        let mut source = VecChunkSource::new(vec![vec![way(1, &[])]]).with_failure("truncated blob");
        let err = engine
            .run(&mut source, &mut RecordingProgress::default(), &CancellationToken::new())
            .expect_err("decoder fails");
        assert!(matches!(err, RunError::Source { chunk: 1, .. }));
    }

    #[rstest]
    fn corrections_can_be_disabled(catalogue: Arc<RuleCatalogue>) {
        let fetcher = Arc::new(StubFetcher::default());
        let engine = engine(catalogue, Arc::clone(&fetcher), Arc::default())
            .with_options(EngineOptions::default().with_corrections(false).with_workers(2));
        let mut source = VecChunkSource::new(vec![vec![way(
            5,
            &[("highway", "residential"), ("name", "Ch. Pasteur")],
        )]]);
        let report = engine
            .run(&mut source, &mut RecordingProgress::default(), &CancellationToken::new())
            .expect("run succeeds");
        assert_eq!(report.counters.corrections, 0);
        assert_eq!(fetcher.calls(), 0);
    }
}
