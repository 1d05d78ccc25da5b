//! Core of the Toponym name-validation engine.
//!
//! The crate classifies decoded OpenStreetMap entities, aggregates their
//! labels, runs stateless validation checks and corrects mechanically fixable
//! labels against the live copy of each entity. It performs no I/O itself: the
//! decoder, the remote API and the editor are reached through the
//! [`ChunkSource`], [`EntityFetcher`] and [`EditorSink`] traits.
//!
//! ```
//! use std::sync::Arc;
//! use toponym_core::test_support::{RecordingProgress, StubFetcher, VecChunkSource};
//! use toponym_core::{
//!     CancellationToken, Engine, NullSink, RawEntity, RuleCatalogue, Tags, ValidationOptions,
//!     ValidationRuleSet,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = Engine::new(
//!     Arc::new(RuleCatalogue::builder().build()),
//!     ValidationRuleSet::new(ValidationOptions::default())?,
//!     Arc::new(StubFetcher::default()),
//!     Arc::new(NullSink),
//! );
//! let way = RawEntity::Way {
//!     id: 1,
//!     tags: Tags::from([("name".into(), " Rue Pasteur".into())]),
//!     node_refs: vec![],
//! };
//! let mut source = VecChunkSource::new(vec![vec![way]]);
//! let report = engine.run(&mut source, &mut RecordingProgress::default(), &CancellationToken::new())?;
//! assert_eq!(report.counters.errors, 1);
//! # Ok(())
//! # }
//! ```

pub mod catalogue;
pub mod classifier;
pub mod correction;
pub mod driver;
pub mod editor;
pub mod entity;
pub mod labels;
pub mod remote;
pub mod state;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod validation;

pub use catalogue::{
    CorrectionRule, Exclusions, RuleCatalogue, RuleCatalogueBuilder, RuleEffect, RuleError,
};
pub use classifier::EntityClassifier;
pub use correction::{
    Convergence, ConvergentCorrector, CorrectionError, CorrectionOutcome, DEFAULT_MAX_PASSES,
    Diverged, RewriteStep, converge, correction_key, probe,
};
pub use driver::{
    CancellationToken, ChunkError, ChunkSource, Engine, EngineOptions, LogProgress, Progress,
    ProgressObserver, RunError, RunReport,
};
pub use editor::{EditorCommand, EditorSink, NullSink, SinkError};
pub use entity::{
    Entity, EntityKind, EntityRef, Geometry, Member, ParseEntityError, RawEntity, Tags,
};
pub use labels::{LabelAggregator, LabelRow};
pub use remote::{EntityFetcher, FetchError, FetchOutcome};
pub use state::{RunCounters, RunState};
pub use validation::{
    Check, Finding, HighwayNameRules, HighwayVerdict, ROADWAY_VALUES, Severity,
    ValidationOptions, ValidationRuleSet,
};
