//! Loads semicolon-separated convergence logs and results files.
//!
//! A convergence log has one header line naming its columns and one line per
//! optimizer iteration:
//!
//! ```text
//! Algorithm;Iteration;TimeMs;Manhattan;Fitness;BestPathLength
//! ACO;0;0,52;24;0,0312;32
//! ```
//!
//! Columns are matched by name, so their order is free. Numbers may use a
//! decimal comma or a decimal point. Rows with an unparseable or non-finite
//! required value, a negative time or a non-positive Manhattan distance are
//! dropped and counted.
//!
//! A results file has one line per pathfinding attempt, every algorithm
//! writing to the same file:
//!
//! ```text
//! Algorithm;TimeMs;PathLength;Rotations;Success;Step;Manhattan
//! ACO;1007,79;26;4;True;0;24
//! ```
//!
//! The same rules apply; `Success` accepts `true`/`false` in any case and
//! `1`/`0`.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};
use pathstat_model::{AlgorithmFamily, AlgorithmLog, LogRow, ResultRow, ResultsLog};
use tracing::{debug, info};

/// Name of the iteration column.
pub const ITERATION: &str = "Iteration";
/// Name of the elapsed-time column.
pub const TIME_MS: &str = "TimeMs";
/// Name of the Manhattan-distance column.
pub const MANHATTAN: &str = "Manhattan";
/// Name of the fitness column.
pub const FITNESS: &str = "Fitness";
/// Name of the best-path-length column.
pub const BEST_PATH_LENGTH: &str = "BestPathLength";
/// Name of the optional run-identifier column.
pub const RUN_ID: &str = "RunId";
/// Name of the algorithm column of a results file.
pub const ALGORITHM: &str = "Algorithm";
/// Name of the path-length column of a results file.
pub const PATH_LENGTH: &str = "PathLength";
/// Name of the success-flag column of a results file.
pub const SUCCESS: &str = "Success";
/// Name of the optional rotation-count column of a results file.
pub const ROTATIONS: &str = "Rotations";
/// Name of the optional start-step column of a results file.
pub const STEP: &str = "Step";

/// A log as returned by the loader.
pub type LoadedLog = AlgorithmLog;

/// Errors raised while loading a log.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// A required column is absent from the header.
    #[error("missing column `{column}` (available: {})", available.join(", "))]
    MissingColumn {
        /// The missing column.
        column: &'static str,
        /// Headers present in the file.
        available: Vec<String>,
    },
    /// The file could not be opened.
    #[error("failed to open {}", path.display())]
    Io {
        /// Path of the log.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The CSV framing could not be read.
    #[error("malformed CSV at line {}", line.map_or_else(|| "?".to_owned(), |l| l.to_string()))]
    Csv {
        /// Line of the offending record, when known.
        line: Option<u64>,
        /// Underlying error.
        #[source]
        source: csv::Error,
    },
}

/// Loads a log file.
///
/// Every row is labelled `label`, regardless of the file's `Algorithm`
/// column.
///
/// # Errors
///
/// Returns [`LoadError::Io`] if the file cannot be opened, and any error of
/// [`load_reader`].
pub fn load_path(
    path: &Path,
    label: &str,
    family: AlgorithmFamily,
) -> Result<LoadedLog, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), label, "loading log");
    load_reader(file, label, family)
}

/// Loads a log from any reader.
///
/// # Errors
///
/// Returns [`LoadError::MissingColumn`] if a required column is absent and
/// [`LoadError::Csv`] if the header or a record cannot be read.
pub fn load_reader<R: Read>(
    reader: R,
    label: &str,
    family: AlgorithmFamily,
) -> Result<LoadedLog, LoadError> {
    let (rows, dropped) = read_rows(reader, Columns::locate, |columns, record| {
        columns.parse(record, label)
    })?;
    info!(label, rows = rows.len(), dropped, "loaded log");
    Ok(AlgorithmLog {
        algorithm: label.to_owned(),
        family,
        rows,
        dropped,
    })
}

/// Loads a results file.
///
/// # Errors
///
/// Returns [`LoadError::Io`] if the file cannot be opened, and any error of
/// [`load_results_reader`].
pub fn load_results_path(path: &Path) -> Result<ResultsLog, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "loading results");
    load_results_reader(file)
}

/// Loads a results file from any reader.
///
/// # Errors
///
/// Returns [`LoadError::MissingColumn`] if a required column is absent and
/// [`LoadError::Csv`] if the header or a record cannot be read.
pub fn load_results_reader<R: Read>(reader: R) -> Result<ResultsLog, LoadError> {
    let (rows, dropped) = read_rows(reader, ResultColumns::locate, ResultColumns::parse)?;
    info!(rows = rows.len(), dropped, "loaded results");
    Ok(ResultsLog { rows, dropped })
}

/// Reads every record through `parse`, counting the rows it rejects.
fn read_rows<R, C, T, L, P>(reader: R, locate: L, parse: P) -> Result<(Vec<T>, usize), LoadError>
where
    R: Read,
    L: FnOnce(&StringRecord) -> Result<C, LoadError>,
    P: Fn(&C, &StringRecord) -> Option<T>,
{
    let mut reader = ReaderBuilder::new()
        .delimiter(b';')
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|source| LoadError::Csv {
            line: Some(1),
            source,
        })?
        .clone();
    let columns = locate(&headers)?;

    let mut rows = Vec::new();
    let mut dropped = 0usize;
    for result in reader.records() {
        let record = result.map_err(|source| LoadError::Csv {
            line: source.position().map(csv::Position::line),
            source,
        })?;
        match parse(&columns, &record) {
            Some(row) => rows.push(row),
            None => {
                dropped += 1;
                debug!(
                    line = record.position().map(csv::Position::line),
                    "dropped malformed row"
                );
            }
        }
    }
    Ok((rows, dropped))
}

fn find_column(headers: &StringRecord, name: &'static str) -> Result<usize, LoadError> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| LoadError::MissingColumn {
            column: name,
            available: headers.iter().map(str::to_owned).collect(),
        })
}

/// Column positions of a convergence log.
struct Columns {
    iteration: usize,
    time_ms: usize,
    manhattan: usize,
    fitness: usize,
    best_path_length: usize,
    run_id: Option<usize>,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self, LoadError> {
        let find = |name| find_column(headers, name);
        Ok(Self {
            iteration: find(ITERATION)?,
            time_ms: find(TIME_MS)?,
            manhattan: find(MANHATTAN)?,
            fitness: find(FITNESS)?,
            best_path_length: find(BEST_PATH_LENGTH)?,
            run_id: headers.iter().position(|h| h == RUN_ID),
        })
    }

    fn parse(&self, record: &StringRecord, label: &str) -> Option<LogRow> {
        let number = |idx: usize| record.get(idx).and_then(parse_number);
        let manhattan = number(self.manhattan).filter(|&m| m > 0.0)?;
        Some(LogRow {
            algorithm: label.to_owned(),
            iteration: number(self.iteration).and_then(to_count),
            elapsed_ms: number(self.time_ms).filter(|&t| t >= 0.0)?,
            manhattan,
            fitness: number(self.fitness)?,
            best_path_length: number(self.best_path_length)?,
            run_hint: self.run_id.and_then(number).and_then(to_count),
        })
    }
}

/// Column positions of a results file.
struct ResultColumns {
    algorithm: usize,
    path_length: usize,
    success: usize,
    manhattan: usize,
    time_ms: Option<usize>,
    rotations: Option<usize>,
    step: Option<usize>,
}

impl ResultColumns {
    fn locate(headers: &StringRecord) -> Result<Self, LoadError> {
        let optional = |name: &str| headers.iter().position(|h| h == name);
        Ok(Self {
            algorithm: find_column(headers, ALGORITHM)?,
            path_length: find_column(headers, PATH_LENGTH)?,
            success: find_column(headers, SUCCESS)?,
            manhattan: find_column(headers, MANHATTAN)?,
            time_ms: optional(TIME_MS),
            rotations: optional(ROTATIONS),
            step: optional(STEP),
        })
    }

    fn parse(&self, record: &StringRecord) -> Option<ResultRow> {
        let number = |idx: usize| record.get(idx).and_then(parse_number);
        let algorithm = record.get(self.algorithm).filter(|a| !a.is_empty())?;
        Some(ResultRow {
            algorithm: algorithm.to_owned(),
            time_ms: self.time_ms.and_then(number).filter(|&t| t >= 0.0),
            path_length: number(self.path_length).filter(|&p| p >= 0.0)?,
            rotations: self.rotations.and_then(number).and_then(to_count),
            success: record.get(self.success).and_then(parse_flag)?,
            step: self.step.and_then(number).and_then(to_count),
            manhattan: number(self.manhattan).filter(|&m| m > 0.0)?,
        })
    }
}

/// Parses a success flag: `true`/`false` in any case, or `1`/`0`.
#[must_use]
pub fn parse_flag(cell: &str) -> Option<bool> {
    match cell.trim().to_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Parses a finite number written with a decimal comma or point.
#[must_use]
pub fn parse_number(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    cell.replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Converts an integral, non-negative number to a count.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_count(value: f64) -> Option<u64> {
    (value >= 0.0 && value.fract() == 0.0 && value <= u64::MAX as f64).then(|| value as u64)
}
