//! Writes tables as semicolon-separated CSV or JSON.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use tracing::debug;

use crate::table::Table;

/// Output encoding of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Semicolon-separated values with a header line.
    #[default]
    Csv,
    /// Pretty-printed `{"columns": [...], "rows": [[...]]}`.
    Json,
}

/// Errors raised while writing a table.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// A directory or file could not be written.
    #[error("failed to write {}", path.display())]
    Io {
        /// Target path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// CSV encoding failed.
    #[error("failed to encode CSV")]
    Csv(#[from] csv::Error),
    /// JSON encoding failed.
    #[error("failed to encode JSON")]
    Json(#[from] serde_json::Error),
}

/// Encodes a table as CSV into `out`.
///
/// # Errors
///
/// Returns [`WriteError::Csv`] if a record cannot be written.
pub fn write_csv<W: Write>(table: &Table, out: W) -> Result<(), WriteError> {
    let mut writer = WriterBuilder::new().delimiter(b';').from_writer(out);
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(ToString::to_string))?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Renders a table in the given format.
///
/// # Errors
///
/// Returns [`WriteError::Csv`] or [`WriteError::Json`] if encoding fails.
pub fn render(table: &Table, format: Format) -> Result<String, WriteError> {
    match format {
        Format::Csv => {
            let mut buf = Vec::new();
            write_csv(table, &mut buf)?;
            Ok(String::from_utf8_lossy(&buf).into_owned())
        }
        Format::Json => {
            let mut text = serde_json::to_string_pretty(table)?;
            text.push('\n');
            Ok(text)
        }
    }
}

/// Writes a table to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns an error if the table cannot be encoded, the directory cannot be
/// created or the file cannot be written.
pub fn write_table(path: &Path, table: &Table, format: Format) -> Result<(), WriteError> {
    let content = render(table, format)?;
    write_text(path, &content)?;
    debug!(path = %path.display(), rows = table.rows.len(), "wrote table");
    Ok(())
}

/// Writes a text file, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`WriteError::Io`] if the directory cannot be created or the file
/// cannot be written.
pub fn write_text(path: &Path, content: &str) -> Result<(), WriteError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| WriteError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, content).map_err(|source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    })
}
