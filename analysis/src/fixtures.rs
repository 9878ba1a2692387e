//! Row builders shared by the unit tests.

use pathstat_model::{AlgorithmFamily, AlgorithmLog, LogRow, ResultRow};

/// Builds one row of algorithm `TEST`.
pub fn row(iteration: u64, elapsed_ms: f64, manhattan: f64, fitness: f64, best: f64) -> LogRow {
    LogRow {
        algorithm: "TEST".to_owned(),
        iteration: Some(iteration),
        elapsed_ms,
        manhattan,
        fitness,
        best_path_length: best,
        run_hint: None,
    }
}

/// Builds rows that differ only by elapsed time.
pub fn rows_with_times(times: &[f64]) -> Vec<LogRow> {
    times
        .iter()
        .enumerate()
        .map(|(i, &t)| row(i as u64, t, 20.0, 1.0, 30.0))
        .collect()
}

/// Builds a single run from parallel fitness and best-length series, one
/// row per 10 ms.
pub fn run_rows(manhattan: f64, fitness: &[f64], best: &[f64]) -> Vec<LogRow> {
    fitness
        .iter()
        .zip(best)
        .enumerate()
        .map(|(i, (&f, &b))| row(i as u64, i as f64 * 10.0, manhattan, f, b))
        .collect()
}

/// Builds one results-file row.
pub fn result(algorithm: &str, path_length: f64, success: bool, manhattan: f64) -> ResultRow {
    ResultRow {
        algorithm: algorithm.to_owned(),
        time_ms: Some(10.0),
        path_length,
        rotations: Some(0),
        success,
        step: Some(0),
        manhattan,
    }
}

/// Wraps rows into a log with the family resolved from `label`.
pub fn log(label: &str, rows: Vec<LogRow>) -> AlgorithmLog {
    let rows = rows
        .into_iter()
        .map(|r| LogRow {
            algorithm: label.to_owned(),
            ..r
        })
        .collect();
    AlgorithmLog {
        algorithm: label.to_owned(),
        family: AlgorithmFamily::from_label(label),
        rows,
        dropped: 0,
    }
}
