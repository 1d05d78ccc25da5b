//! Loading a [`RuleCatalogue`] from a directory of CSV files.
//!
//! Each file starts with a header row that is skipped. Deprecated keys and
//! tags are required; exclusion lists and corrections are optional.

use camino::{Utf8Path, Utf8PathBuf};
use csv::{ReaderBuilder, StringRecord};
use log::info;
use thiserror::Error;
use toponym_core::{CorrectionRule, EntityKind, RuleCatalogue, RuleCatalogueBuilder, RuleError};
use toponym_fs::{open_optional_file, open_utf8_file};

/// Deprecated keys, one per row.
pub const DEPRECATED_KEYS_FILE: &str = "deprecated_keys.csv";
/// Deprecated `key,value` pairs.
pub const DEPRECATED_TAGS_FILE: &str = "deprecated_tags.csv";
/// `pattern,template` correction rules in evaluation order.
pub const CORRECTIONS_FILE: &str = "corrections.csv";

const EXCLUSION_FILES: [(EntityKind, &str); 3] = [
    (EntityKind::Node, "excluded_nodes.csv"),
    (EntityKind::Way, "excluded_ways.csv"),
    (EntityKind::Relation, "excluded_relations.csv"),
];

/// Errors raised while loading the rules directory.
#[derive(Debug, Error)]
pub enum CatalogueLoadError {
    /// A catalogue file could not be opened.
    #[error("failed to open catalogue file {path}")]
    Open {
        /// File path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A catalogue file is not valid CSV.
    #[error("failed to read catalogue file {path}")]
    Read {
        /// File path.
        path: Utf8PathBuf,
        /// Underlying CSV error.
        #[source]
        source: csv::Error,
    },
    /// A row lacks a required column.
    #[error("{path}:{line}: missing column {column}")]
    MissingColumn {
        /// File path.
        path: Utf8PathBuf,
        /// Line number of the row.
        line: u64,
        /// One-based column number.
        column: usize,
    },
    /// An exclusion row does not hold an integer id.
    #[error("{path}:{line}: invalid entity id {value:?}")]
    InvalidId {
        /// File path.
        path: Utf8PathBuf,
        /// Line number of the row.
        line: u64,
        /// Offending value.
        value: String,
    },
    /// A correction pattern does not compile.
    #[error("{path}:{line}: invalid correction rule")]
    Rule {
        /// File path.
        path: Utf8PathBuf,
        /// Line number of the row.
        line: u64,
        /// Underlying rule error.
        #[source]
        source: RuleError,
    },
}

struct Row<'a> {
    path: &'a Utf8Path,
    line: u64,
    record: StringRecord,
}

impl Row<'_> {
    fn column(&self, index: usize) -> Result<&str, CatalogueLoadError> {
        self.record
            .get(index)
            .ok_or_else(|| CatalogueLoadError::MissingColumn {
                path: self.path.to_path_buf(),
                line: self.line,
                column: index + 1,
            })
    }
}

/// Load the catalogue stored in `dir`.
///
/// In `corrections.csv` a missing or empty second column makes the rule
/// search-only: it reports matches and never rewrites. An empty replacement
/// cannot be written; to delete text, capture the part to keep and use it as
/// the template (`^(.*\S)\s+$,$1` strips trailing whitespace).
///
/// # Errors
/// Returns [`CatalogueLoadError`] naming the file and line of the first
/// problem encountered.
///
/// # Examples
/// ```no_run
/// use camino::Utf8Path;
/// use toponym_data::load_catalogue;
///
/// # fn main() -> Result<(), toponym_data::CatalogueLoadError> {
/// let catalogue = load_catalogue(Utf8Path::new("rules"))?;
/// println!("{} corrections", catalogue.corrections().len());
/// # Ok(())
/// # }
/// ```
pub fn load_catalogue(dir: &Utf8Path) -> Result<RuleCatalogue, CatalogueLoadError> {
    let mut builder = RuleCatalogue::builder();

    let keys_path = dir.join(DEPRECATED_KEYS_FILE);
    for row in read_rows(&keys_path, true)? {
        builder = builder.deprecated_key(row.column(0)?);
    }

    let tags_path = dir.join(DEPRECATED_TAGS_FILE);
    for row in read_rows(&tags_path, true)? {
        builder = builder.deprecated_tag(row.column(0)?, row.column(1)?);
    }

    for (kind, file) in EXCLUSION_FILES {
        builder = load_exclusions(builder, &dir.join(file), kind)?;
    }

    let corrections_path = dir.join(CORRECTIONS_FILE);
    for row in read_rows(&corrections_path, false)? {
        let rule = CorrectionRule::from_parts(row.column(0)?, row.record.get(1)).map_err(
            |source| CatalogueLoadError::Rule {
                path: corrections_path.clone(),
                line: row.line,
                source,
            },
        )?;
        builder = builder.correction(rule);
    }

    let catalogue = builder.build();
    info!(
        "loaded rules from {dir}: {} deprecated keys, {} deprecated tags, {} corrections",
        catalogue.deprecated_key_count(),
        catalogue.deprecated_tag_count(),
        catalogue.corrections().len()
    );
    Ok(catalogue)
}

fn load_exclusions(
    mut builder: RuleCatalogueBuilder,
    path: &Utf8Path,
    kind: EntityKind,
) -> Result<RuleCatalogueBuilder, CatalogueLoadError> {
    for row in read_rows(path, false)? {
        let raw = row.column(0)?.trim();
        let id = raw.parse().map_err(|_| CatalogueLoadError::InvalidId {
            path: path.to_path_buf(),
            line: row.line,
            value: raw.to_owned(),
        })?;
        builder = builder.exclude(kind, id);
    }
    Ok(builder)
}

fn read_rows(path: &Utf8Path, required: bool) -> Result<Vec<Row<'_>>, CatalogueLoadError> {
    let open_error = |source| CatalogueLoadError::Open {
        path: path.to_path_buf(),
        source,
    };
    let file = if required {
        open_utf8_file(path).map_err(open_error)?
    } else {
        match open_optional_file(path).map_err(open_error)? {
            Some(file) => file,
            None => return Ok(Vec::new()),
        }
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);
    reader
        .records()
        .map(|result| {
            let record = result.map_err(|source| CatalogueLoadError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            let line = record.position().map_or(0, csv::Position::line);
            Ok(Row { path, line, record })
        })
        .collect()
}
