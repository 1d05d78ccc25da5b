//! Logging setup.
//!
//! The library crates log through the `log` facade. A `tracing-subscriber`
//! fmt subscriber is installed with its `log` bridge so those records reach
//! stderr or the configured log file.

use std::sync::Mutex;

use camino::Utf8Path;
use tracing_subscriber::EnvFilter;

use crate::CliError;

const DEFAULT_DIRECTIVE: &str = "info";

/// `--log-level` wins over `RUST_LOG`, which wins over the default.
pub(crate) fn filter(level: Option<&str>) -> Result<EnvFilter, CliError> {
    match level {
        Some(directive) => EnvFilter::try_new(directive).map_err(|err| CliError::Logging {
            message: format!("invalid log level {directive:?}: {err}"),
        }),
        None => Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))),
    }
}

pub(crate) fn init(level: Option<&str>, log_file: Option<&Utf8Path>) -> Result<(), CliError> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter(level)?)
        .with_target(false);
    let installed = match log_file {
        Some(path) => {
            let file =
                toponym_fs::create_utf8_file(path).map_err(|source| CliError::CreateLogFile {
                    path: path.to_path_buf(),
                    source,
                })?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };
    installed.map_err(|err| CliError::Logging {
        message: err.to_string(),
    })
}
