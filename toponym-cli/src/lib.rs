//! Command-line interface for the toponym quality-assurance engine.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod check;
mod error;
mod logging;

pub use error::CliError;

use check::CheckArgs;

pub(crate) const ARG_OSM_PBF: &str = "osm-pbf";
pub(crate) const ARG_RULES_DIR: &str = "rules-dir";
pub(crate) const ARG_LABELS_OUT: &str = "labels-out";
pub(crate) const ARG_LOG_FILE: &str = "log-file";
pub(crate) const ARG_LOG_LEVEL: &str = "log-level";
pub(crate) const ARG_OSM_API_URL: &str = "osm-api-url";
pub(crate) const ARG_EDITOR_URL: &str = "editor-url";
pub(crate) const ARG_WORKERS: &str = "workers";
pub(crate) const ARG_CORRECTIONS: &str = "corrections";
pub(crate) const ARG_HIGHWAY_WHITELIST: &str = "highway-whitelist";
pub(crate) const ARG_DEPRECATED_CHECKS: &str = "deprecated-checks";
pub(crate) const ARG_HIGHLIGHT_FINDINGS: &str = "highlight-findings";
pub(crate) const ARG_MAX_PASSES: &str = "max-passes";
pub(crate) const ARG_REQUEST_TIMEOUT_SECS: &str = "request-timeout-secs";
pub(crate) const ARG_EDITOR_TIMEOUT_SECS: &str = "editor-timeout-secs";
pub(crate) const ENV_OSM_PBF: &str = "TOPONYM_CMDS_CHECK_OSM_PBF";

/// Run the toponym CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when arguments or configuration are invalid, or when
/// the check run fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Check(args) => check::run_check(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "toponym",
    about = "Name validation and correction for OpenStreetMap extracts",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate labels in a PBF extract and propose corrections.
    Check(CheckArgs),
}

#[cfg(test)]
mod tests;
