//! Convergence analysis for pathfinding optimizer logs.
//!
//! `pathstat-analysis` turns the rows of one [`AlgorithmLog`] into:
//!
//! - runs, split by a pluggable [`RunBoundary`] ([`segment`]),
//! - per-run metrics: goal and optimal times, improvement counts and relative
//!   threshold crossings ([`metrics`]),
//! - per-run final-state summaries and algorithm-level aggregates
//!   ([`summary`]),
//! - convergence curves pooled by instance range ([`curves`]),
//! - diagnostics about the input ([`report`]).
//!
//! [`analyze`] runs the whole pipeline for one algorithm. Results files,
//! which record only the final outcome of each attempt, are compared across
//! algorithms by [`rank_results`] ([`ranking`]).
//!
//! # Entry Point
//!
//! ```
//! use pathstat_analysis::analyze;
//! use pathstat_model::{AlgorithmFamily, AlgorithmLog, AnalysisConfig, LogRow};
//!
//! let row = |iteration: u64, elapsed_ms: f64, best: f64| LogRow {
//!     algorithm: "ACO".to_owned(),
//!     iteration: Some(iteration),
//!     elapsed_ms,
//!     manhattan: 20.0,
//!     fitness: 1.0 / best,
//!     best_path_length: best,
//!     run_hint: None,
//! };
//! let log = AlgorithmLog {
//!     algorithm: "ACO".to_owned(),
//!     family: AlgorithmFamily::Aco,
//!     rows: vec![row(0, 0.0, 30.0), row(1, 10.0, 20.0), row(0, 0.0, 25.0)],
//!     dropped: 0,
//! };
//!
//! let analysis = analyze(&log, &AnalysisConfig::default()).unwrap();
//! assert_eq!(analysis.run_metrics.len(), 2);
//! assert!(analysis.report.all_passed());
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod curves;
pub mod error;
pub mod metrics;
pub mod ranking;
pub mod report;
pub mod segment;
pub mod summary;

#[cfg(test)]
mod fixtures;

pub use curves::{
    build_curves, goal_mark, progress_marks, ConvergenceCurves, CurveSet, MarkKind, ProgressMark,
    RangeCurves,
};
pub use error::AnalysisError;
pub use metrics::{MetricsCalculator, RunMetrics, ThresholdCrossing};
pub use ranking::{
    rank_results, DominanceMatrix, PathStats, RankSummary, ResultsAnalysis, SuccessRate, WinRate,
};
pub use report::{AnalysisReport, Diagnostic, Severity};
pub use segment::{
    boundary_for, segment, ExplicitRunId, InstanceChange, Run, RunBoundary, TimeReversal,
};
pub use summary::{
    compare_algorithms, range_share, summarize_run, summarize_time_metrics, AlgorithmComparison,
    RangeShare, RunSummary, StatSummary, TimeSummary,
};

use pathstat_model::{AlgorithmFamily, AlgorithmLog, AnalysisConfig};
use tracing::{info, warn};

/// Everything computed for one algorithm.
#[derive(Debug)]
pub struct AlgorithmAnalysis {
    /// Algorithm label.
    pub algorithm: String,
    /// Family used for the goal condition.
    pub family: AlgorithmFamily,
    /// Metrics of every run, in run order.
    pub run_metrics: Vec<RunMetrics>,
    /// Final-state summary of every run, in run order.
    pub run_summaries: Vec<RunSummary>,
    /// Convergence curves by instance range.
    pub curves: ConvergenceCurves,
    /// Number of runs per instance range.
    pub range_share: RangeShare,
    /// Diagnostics raised while analyzing.
    pub report: AnalysisReport,
}

/// Analyzes one algorithm's log.
///
/// The family is resolved through [`AnalysisConfig::family_for`], so an
/// explicit `families` entry overrides the family recorded on the log.
///
/// # Errors
///
/// Returns [`AnalysisError`] if a threshold in `config` is invalid or a run
/// violates the calculator's preconditions.
pub fn analyze(
    log: &AlgorithmLog,
    config: &AnalysisConfig,
) -> Result<AlgorithmAnalysis, AnalysisError> {
    let algorithm = log.algorithm.as_str();
    let family = match config.family_for(algorithm) {
        AlgorithmFamily::Other => log.family,
        resolved => resolved,
    };
    let mut report = AnalysisReport::new();

    if log.dropped > 0 {
        report.push(Diagnostic::info(
            algorithm,
            format!("{} row(s) dropped as malformed", log.dropped),
        ));
        if log.rows.is_empty() {
            report.push(Diagnostic::fail(algorithm, "no usable rows"));
        }
    }
    if family == AlgorithmFamily::Other {
        report.push(Diagnostic::warn(
            algorithm,
            "unknown algorithm family; goal times are reported as missing",
        ));
    }

    let boundary = boundary_for(config.boundary);
    let runs = segment(&log.rows, &*boundary);

    for run in &runs {
        let values = run.manhattan_values();
        if values.len() > 1 {
            warn!(
                algorithm,
                run_id = run.run_id,
                distinct = values.len(),
                "run spans several instances"
            );
            report.push(Diagnostic::warn_with_details(
                algorithm,
                format!(
                    "run {} spans {} manhattan distances; metrics use the earliest",
                    run.run_id,
                    values.len()
                ),
                values.iter().map(|v| format!("manhattan = {v}")).collect(),
            ));
        }
    }

    let calculator = MetricsCalculator::new(algorithm, family, &config.goal, &config.thresholds)?;
    let run_metrics = calculator.compute_all(&runs)?;
    let run_summaries = runs
        .iter()
        .filter_map(|run| summarize_run(algorithm, run))
        .collect();
    let curves = build_curves(algorithm, &log.rows, &runs, config);
    let range_share = range_share(algorithm, &runs, &config.ranges);

    info!(
        algorithm,
        family = family.as_str(),
        rows = log.rows.len(),
        runs = runs.len(),
        failures = report.failure_count(),
        "analyzed"
    );

    Ok(AlgorithmAnalysis {
        algorithm: algorithm.to_owned(),
        family,
        run_metrics,
        run_summaries,
        curves,
        range_share,
        report,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::fixtures::{log, row};
    use pathstat_model::BoundaryKind;

    #[test]
    fn analyze_splits_runs_and_summarizes() {
        let rows = vec![
            row(0, 0.0, 20.0, 1.0, 30.0),
            row(1, 10.0, 20.0, 2.0, 25.0),
            row(0, 0.0, 20.0, 1.0, 28.0),
        ];
        let analysis = analyze(&log("ACO", rows), &AnalysisConfig::default()).unwrap();
        assert_eq!(analysis.family, AlgorithmFamily::Aco);
        assert_eq!(analysis.run_metrics.len(), 2);
        assert_eq!(analysis.run_summaries.len(), 2);
        assert_eq!(analysis.run_summaries[0].num_iterations, Some(1));
        assert_eq!(analysis.curves.algorithm, "ACO");
        assert_eq!(analysis.range_share.short, 2);
        assert_eq!(analysis.range_share.total(), 2);
        assert!(analysis.report.all_passed());
        assert!(analysis.report.diagnostics.is_empty());
    }

    #[test]
    fn unknown_family_is_a_warning() {
        let rows = vec![row(0, 0.0, 20.0, 1.0, 30.0)];
        let analysis = analyze(&log("GA", rows), &AnalysisConfig::default()).unwrap();
        assert_eq!(analysis.family, AlgorithmFamily::Other);
        assert_eq!(analysis.report.count(Severity::Warning), 1);
        assert_eq!(analysis.run_metrics[0].time_first_goal, None);
    }

    #[test]
    fn configured_family_overrides_prefix() {
        let mut config = AnalysisConfig::default();
        config
            .families
            .insert("FA".to_owned(), AlgorithmFamily::Firefly);
        let rows = vec![row(0, 0.0, 20.0, 50.0, 30.0)];
        let analysis = analyze(&log("FA", rows), &config).unwrap();
        assert_eq!(analysis.family, AlgorithmFamily::Firefly);
        assert_eq!(analysis.run_metrics[0].time_first_goal, Some(0.0));
    }

    #[test]
    fn mixed_instances_warn_unless_split() {
        let rows = vec![row(0, 0.0, 20.0, 1.0, 30.0), row(1, 10.0, 60.0, 1.0, 90.0)];
        let config = AnalysisConfig::default();
        let analysis = analyze(&log("ACO", rows.clone()), &config).unwrap();
        assert_eq!(analysis.run_metrics.len(), 1);
        let warning = &analysis.report.diagnostics[0];
        assert_eq!(warning.severity, Severity::Warning);
        assert_eq!(warning.details.len(), 2);

        let split = AnalysisConfig {
            boundary: BoundaryKind::InstanceChange,
            ..AnalysisConfig::default()
        };
        let analysis = analyze(&log("ACO", rows), &split).unwrap();
        assert_eq!(analysis.run_metrics.len(), 2);
        assert!(analysis.report.diagnostics.is_empty());
    }

    #[test]
    fn all_rows_dropped_is_a_failure() {
        let mut empty = log("ACO", Vec::new());
        empty.dropped = 3;
        let analysis = analyze(&empty, &AnalysisConfig::default()).unwrap();
        assert!(analysis.run_metrics.is_empty());
        assert_eq!(analysis.report.count(Severity::Info), 1);
        assert_eq!(analysis.report.failure_count(), 1);
    }

    #[test]
    fn invalid_threshold_is_rejected() {
        let config = AnalysisConfig {
            thresholds: vec![1.5, 0.0],
            ..AnalysisConfig::default()
        };
        let rows = vec![row(0, 0.0, 20.0, 1.0, 30.0)];
        let err = analyze(&log("ACO", rows), &config).unwrap_err();
        assert_eq!(err, AnalysisError::InvalidThreshold(0.0));
    }
}
