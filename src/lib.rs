//! Facade crate for the toponym name-validation engine.
//!
//! This crate re-exports the core domain types, the rule catalogue, the
//! validation checks, the convergent corrector and the stream driver.

#![forbid(unsafe_code)]

pub use toponym_core::{
    CancellationToken, Check, ChunkError, ChunkSource, Convergence, ConvergentCorrector,
    CorrectionError, CorrectionOutcome, CorrectionRule, DEFAULT_MAX_PASSES, Diverged,
    EditorCommand, EditorSink, Engine, EngineOptions, Entity, EntityClassifier, EntityFetcher,
    EntityKind, EntityRef, Exclusions, FetchError, FetchOutcome, Finding, Geometry,
    LabelAggregator, LabelRow, LogProgress, Member, NullSink, Progress, ProgressObserver,
    RawEntity, RuleCatalogue, RuleCatalogueBuilder, RuleEffect, RuleError, RunCounters,
    RunError, RunReport, RunState, Severity, SinkError, Tags, ValidationOptions,
    ValidationRuleSet, converge, probe,
};
