//! Error type for the analysis pipeline.

/// Contract violations detected while computing metrics or rankings.
///
/// Missing goal, optimal or threshold indices are not errors; they are
/// reported as `None` fields of [`RunMetrics`](crate::metrics::RunMetrics).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    /// A run reached the calculator with no rows.
    #[error("run {run_id} has no rows")]
    EmptyRun {
        /// Identifier of the offending run.
        run_id: usize,
    },
    /// A run's Manhattan distance is zero, negative or not finite.
    #[error("run {run_id} has invalid manhattan distance {manhattan}")]
    InvalidManhattan {
        /// Identifier of the offending run.
        run_id: usize,
        /// The Manhattan distance read from the run's first row.
        manhattan: f64,
    },
    /// A relative threshold is not a positive finite number.
    #[error("threshold {0} must be a positive finite number")]
    InvalidThreshold(f64),
    /// A results file names fewer than two algorithms, so nothing can be ranked.
    #[error("ranking needs at least two algorithms, found {found}")]
    TooFewAlgorithms {
        /// Number of distinct algorithm labels in the file.
        found: usize,
    },
}
