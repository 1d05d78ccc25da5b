//! Error types emitted by the toponym CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;
use toponym_core::{RuleError, RunError};
use toponym_data::{CatalogueLoadError, ClientBuildError, PbfError, ReportError};

/// Errors emitted by the toponym CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Flag name.
        field: &'static str,
        /// Environment variable name.
        env: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Flag name.
        field: &'static str,
        /// Configured path.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Flag name.
        field: &'static str,
        /// Configured path.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Flag name.
        field: &'static str,
        /// Configured path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The rules directory does not exist.
    #[error("rules directory {path:?} does not exist")]
    MissingRulesDir {
        /// Configured path.
        path: Utf8PathBuf,
    },
    /// The logging subscriber could not be installed.
    #[error("failed to initialise logging: {message}")]
    Logging {
        /// Description of the failure.
        message: String,
    },
    /// The log file could not be created.
    #[error("failed to create log file {path:?}: {source}")]
    CreateLogFile {
        /// Configured path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Loading the rule catalogue failed.
    #[error(transparent)]
    Catalogue(#[from] CatalogueLoadError),
    /// A built-in rule failed to compile.
    #[error("failed to build validation rules: {0}")]
    Rules(#[from] RuleError),
    /// An HTTP adapter could not be constructed.
    #[error("failed to build {adapter} client for {url:?}: {source}")]
    BuildClient {
        /// Adapter being built.
        adapter: &'static str,
        /// Configured base URL.
        url: String,
        /// Underlying error.
        #[source]
        source: ClientBuildError,
    },
    /// Opening the PBF extract failed.
    #[error("failed to read OSM data: {0}")]
    Pbf(#[from] PbfError),
    /// The check run aborted.
    #[error("check run failed: {0}")]
    Run(#[from] RunError),
    /// Writing the label report failed.
    #[error("failed to write label report: {0}")]
    Report(#[from] ReportError),
    /// Serialising the run summary failed.
    #[error("failed to serialise run summary: {0}")]
    SerialiseSummary(#[source] serde_json::Error),
    /// Writing the run summary failed.
    #[error("failed to write run summary: {0}")]
    WriteSummary(#[source] std::io::Error),
}
