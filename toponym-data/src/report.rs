//! CSV label report: one row per distinct label, `label,ref1,ref2,…`.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use csv::WriterBuilder;
use log::info;
use thiserror::Error;
use toponym_core::LabelRow;
use toponym_fs::create_utf8_file;

/// Errors raised while writing the label report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The report file could not be created.
    #[error("failed to create label report {path}")]
    Create {
        /// Report path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// A row could not be written.
    #[error("failed to write label report")]
    Write(#[from] csv::Error),
    /// Buffered output could not be flushed.
    #[error("failed to flush label report")]
    Flush(#[source] io::Error),
}

/// Write `rows` in order to `writer`.
///
/// # Errors
/// Returns [`ReportError`] if a row cannot be written or flushed.
///
/// # Examples
/// ```
/// use toponym_core::{EntityKind, EntityRef, LabelRow};
/// use toponym_data::write_label_report;
///
/// let rows = vec![LabelRow {
///     label: "Rue Pasteur".into(),
///     refs: vec![EntityRef::new(EntityKind::Way, 1), EntityRef::new(EntityKind::Way, 2)],
/// }];
/// let mut out = Vec::new();
/// write_label_report(&mut out, &rows)?;
/// assert_eq!(String::from_utf8(out)?, "Rue Pasteur,way/1,way/2\n");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn write_label_report<W: io::Write>(writer: W, rows: &[LabelRow]) -> Result<(), ReportError> {
    let mut csv = WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(writer);
    for row in rows {
        let refs = row.refs.iter().map(ToString::to_string);
        csv.write_record(std::iter::once(row.label.clone()).chain(refs))?;
    }
    csv.flush().map_err(ReportError::Flush)
}

/// Create `path` (and its parent directory) and write `rows` to it.
///
/// # Errors
/// Returns [`ReportError::Create`] if the file cannot be created, otherwise
/// as [`write_label_report`].
pub fn write_label_report_file(path: &Utf8Path, rows: &[LabelRow]) -> Result<(), ReportError> {
    let file = create_utf8_file(path).map_err(|source| ReportError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    write_label_report(io::BufWriter::new(file), rows)?;
    info!("wrote {} labels to {path}", rows.len());
    Ok(())
}
