//! `check` command: validate an extract and propose corrections.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use toponym_core::{
    CancellationToken, DEFAULT_MAX_PASSES, EditorSink, Engine, EngineOptions, EntityFetcher,
    LogProgress, RunReport, ValidationOptions, ValidationRuleSet,
};
use toponym_data::{
    DEFAULT_EDITOR_URL, DEFAULT_OSM_API_URL, HttpEntityFetcher, HttpEntityFetcherConfig, JosmSink,
    JosmSinkConfig, PbfChunkSource, load_catalogue, write_label_report_file,
};

use crate::{
    ARG_CORRECTIONS, ARG_DEPRECATED_CHECKS, ARG_EDITOR_TIMEOUT_SECS, ARG_EDITOR_URL, ARG_HIGHLIGHT_FINDINGS,
    ARG_HIGHWAY_WHITELIST, ARG_LABELS_OUT, ARG_LOG_FILE, ARG_LOG_LEVEL, ARG_MAX_PASSES,
    ARG_OSM_API_URL, ARG_OSM_PBF, ARG_REQUEST_TIMEOUT_SECS, ARG_RULES_DIR, ARG_WORKERS, CliError,
    ENV_OSM_PBF, logging,
};

const DEFAULT_LABELS_OUT: &str = "names.csv";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// CLI arguments for the `check` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Stream an OpenStreetMap PBF extract, validate every label \
                 against the rules directory and propose corrections for \
                 stale road names. Options can come from CLI flags, \
                 configuration files, or environment variables.",
    about = "Validate labels and propose corrections"
)]
#[ortho_config(prefix = "TOPONYM")]
pub(crate) struct CheckArgs {
    /// Path to the OpenStreetMap PBF file.
    #[arg(long = ARG_OSM_PBF, value_name = "path")]
    #[serde(default)]
    pub(crate) osm_pbf: Option<Utf8PathBuf>,
    /// Directory holding the CSV rule catalogue (default `.`).
    #[arg(long = ARG_RULES_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) rules_dir: Option<Utf8PathBuf>,
    /// Where to write the label report (default `names.csv`).
    #[arg(long = ARG_LABELS_OUT, value_name = "path")]
    #[serde(default)]
    pub(crate) labels_out: Option<Utf8PathBuf>,
    /// Write logs to this file instead of stderr.
    #[arg(long = ARG_LOG_FILE, value_name = "path")]
    #[serde(default)]
    pub(crate) log_file: Option<Utf8PathBuf>,
    /// Log filter directive, e.g. `debug` or `warn,toponym_core=info`.
    #[arg(long = ARG_LOG_LEVEL, value_name = "filter")]
    #[serde(default)]
    pub(crate) log_level: Option<String>,
    /// Base URL of the OpenStreetMap API.
    #[arg(long = ARG_OSM_API_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) osm_api_url: Option<String>,
    /// Base URL of the JOSM remote-control endpoint.
    #[arg(long = ARG_EDITOR_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) editor_url: Option<String>,
    /// Worker threads per chunk (default 1).
    #[arg(long = ARG_WORKERS, value_name = "count")]
    #[serde(default)]
    pub(crate) workers: Option<usize>,
    /// Fetch and correct stale road names (default true).
    #[arg(long = ARG_CORRECTIONS, value_name = "bool")]
    #[serde(default)]
    pub(crate) corrections: Option<bool>,
    /// Reject road names without a known road-type prefix (default false).
    #[arg(long = ARG_HIGHWAY_WHITELIST, value_name = "bool")]
    #[serde(default)]
    pub(crate) highway_whitelist: Option<bool>,
    /// Report deprecated keys and tags (default true).
    #[arg(long = ARG_DEPRECATED_CHECKS, value_name = "bool")]
    #[serde(default)]
    pub(crate) deprecated_checks: Option<bool>,
    /// Highlight every finding in the editor (default false).
    #[arg(long = ARG_HIGHLIGHT_FINDINGS, value_name = "bool")]
    #[serde(default)]
    pub(crate) highlight_findings: Option<bool>,
    /// Cap on correction passes per value (default 16).
    #[arg(long = ARG_MAX_PASSES, value_name = "count")]
    #[serde(default)]
    pub(crate) max_passes: Option<usize>,
    /// HTTP timeout in seconds for the OpenStreetMap API (default 30).
    #[arg(long = ARG_REQUEST_TIMEOUT_SECS, value_name = "seconds")]
    #[serde(default)]
    pub(crate) request_timeout_secs: Option<u64>,
    /// HTTP timeout in seconds for editor commands (default 5).
    #[arg(long = ARG_EDITOR_TIMEOUT_SECS, value_name = "seconds")]
    #[serde(default)]
    pub(crate) editor_timeout_secs: Option<u64>,
}

impl CheckArgs {
    pub(crate) fn into_config(self) -> Result<CheckConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        CheckConfig::try_from(merged)
    }
}

/// Resolved `check` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CheckConfig {
    pub(crate) osm_pbf: Utf8PathBuf,
    pub(crate) rules_dir: Utf8PathBuf,
    pub(crate) labels_out: Utf8PathBuf,
    pub(crate) log_file: Option<Utf8PathBuf>,
    pub(crate) log_level: Option<String>,
    pub(crate) osm_api_url: String,
    pub(crate) editor_url: String,
    pub(crate) request_timeout: Duration,
    pub(crate) editor_timeout: Duration,
    pub(crate) engine: EngineOptions,
    pub(crate) validation: ValidationOptions,
}

impl CheckConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        Self::require_existing(&self.osm_pbf, ARG_OSM_PBF)?;
        if !toponym_fs::dir_exists(&self.rules_dir) {
            return Err(CliError::MissingRulesDir {
                path: self.rules_dir.clone(),
            });
        }
        Ok(())
    }

    fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
        match toponym_fs::file_is_file(path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::SourcePathNotFile {
                field,
                path: path.to_path_buf(),
            }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                Err(CliError::MissingSourceFile {
                    field,
                    path: path.to_path_buf(),
                })
            }
            Err(source) => Err(CliError::InspectSourcePath {
                field,
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

impl TryFrom<CheckArgs> for CheckConfig {
    type Error = CliError;

    fn try_from(args: CheckArgs) -> Result<Self, Self::Error> {
        let osm_pbf = args.osm_pbf.ok_or(CliError::MissingArgument {
            field: ARG_OSM_PBF,
            env: ENV_OSM_PBF,
        })?;

        let engine = EngineOptions::default()
            .with_workers(args.workers.unwrap_or(1))
            .with_corrections(args.corrections.unwrap_or(true))
            .with_highlight_findings(args.highlight_findings.unwrap_or(false))
            .with_max_passes(args.max_passes.unwrap_or(DEFAULT_MAX_PASSES));
        let validation = ValidationOptions::default()
            .with_highway_whitelist(args.highway_whitelist.unwrap_or(false))
            .with_deprecated_checks(args.deprecated_checks.unwrap_or(true));

        Ok(Self {
            osm_pbf,
            rules_dir: args.rules_dir.unwrap_or_else(|| Utf8PathBuf::from(".")),
            labels_out: args
                .labels_out
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_LABELS_OUT)),
            log_file: args.log_file,
            log_level: args.log_level,
            osm_api_url: args
                .osm_api_url
                .unwrap_or_else(|| DEFAULT_OSM_API_URL.to_owned()),
            editor_url: args
                .editor_url
                .unwrap_or_else(|| DEFAULT_EDITOR_URL.to_owned()),
            request_timeout: Duration::from_secs(
                args.request_timeout_secs
                    .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            ),
            editor_timeout: args
                .editor_timeout_secs
                .map_or_else(|| JosmSinkConfig::default().timeout, Duration::from_secs),
            engine,
            validation,
        })
    }
}

/// Remote collaborators handed to the engine.
pub(crate) struct Collaborators {
    pub(crate) fetcher: Arc<dyn EntityFetcher>,
    pub(crate) sink: Arc<dyn EditorSink>,
}

/// Builds the remote collaborators for the current check invocation.
pub(crate) trait CollaboratorBuilder {
    fn build(&self, config: &CheckConfig) -> Result<Collaborators, CliError>;
}

pub(crate) struct HttpCollaboratorBuilder;

impl CollaboratorBuilder for HttpCollaboratorBuilder {
    fn build(&self, config: &CheckConfig) -> Result<Collaborators, CliError> {
        let fetcher = HttpEntityFetcher::with_config(
            HttpEntityFetcherConfig::new(config.osm_api_url.clone())
                .with_timeout(config.request_timeout),
        )
        .map_err(|source| CliError::BuildClient {
            adapter: "OSM API",
            url: config.osm_api_url.clone(),
            source,
        })?;
        let sink = JosmSink::with_config(
            JosmSinkConfig::new(config.editor_url.clone()).with_timeout(config.editor_timeout),
        )
        .map_err(|source| CliError::BuildClient {
            adapter: "editor",
            url: config.editor_url.clone(),
            source,
        })?;
        Ok(Collaborators {
            fetcher: Arc::new(fetcher),
            sink: Arc::new(sink),
        })
    }
}

/// Machine-readable outcome printed to stdout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct RunSummary {
    pub(crate) labels: usize,
    pub(crate) errors: u64,
    pub(crate) nodes: u64,
    pub(crate) ways: u64,
    pub(crate) relations: u64,
    pub(crate) chunks: usize,
    pub(crate) corrections: u64,
    pub(crate) cancelled: bool,
}

impl From<&RunReport> for RunSummary {
    fn from(report: &RunReport) -> Self {
        Self {
            labels: report.labels.len(),
            errors: report.counters.errors,
            nodes: report.counters.nodes,
            ways: report.counters.ways,
            relations: report.counters.relations,
            chunks: report.chunks,
            corrections: report.counters.corrections,
            cancelled: report.cancelled,
        }
    }
}

pub(crate) fn run_check(args: CheckArgs) -> Result<(), CliError> {
    let config = resolve_check_config(args)?;
    logging::init(config.log_level.as_deref(), config.log_file.as_deref())?;
    let mut stdout = std::io::stdout().lock();
    execute_check(&config, &HttpCollaboratorBuilder, &mut stdout)
}

pub(crate) fn run_check_with(
    args: CheckArgs,
    builder: &dyn CollaboratorBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = resolve_check_config(args)?;
    execute_check(&config, builder, writer)
}

fn resolve_check_config(args: CheckArgs) -> Result<CheckConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

fn execute_check(
    config: &CheckConfig,
    builder: &dyn CollaboratorBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let catalogue = load_catalogue(&config.rules_dir)?;
    let validation = ValidationRuleSet::new(config.validation.clone())?;
    let Collaborators { fetcher, sink } = builder.build(config)?;
    let engine = Engine::new(Arc::new(catalogue), validation, fetcher, sink)
        .with_options(config.engine);

    let mut source = PbfChunkSource::open(config.osm_pbf.as_std_path())?;
    let report = engine.run(&mut source, &mut LogProgress, &CancellationToken::new())?;

    let summary = RunSummary::from(&report);
    write_label_report_file(&config.labels_out, &report.labels.into_sorted_rows())?;
    write_summary(writer, &summary)
}

fn write_summary(writer: &mut dyn Write, summary: &RunSummary) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(summary).map_err(CliError::SerialiseSummary)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteSummary)?;
    writer.write_all(b"\n").map_err(CliError::WriteSummary)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<CheckConfig, CliError> {
    let merged = CheckArgs::merge_from_layers(layers).map_err(CliError::from)?;
    CheckConfig::try_from(merged)
}
