//! Per-run convergence metrics.
//!
//! For every run the calculator reports when the optimizer first reached a
//! usable solution (the family-specific goal), when it first reached its final
//! fitness, how often the best path improved, and when the optimality ratio
//! first came within a factor `k` of its final value.
//!
//! Indices that do not exist are reported as `None`. Normalized values are
//! derived only from present base values.

use pathstat_model::{AlgorithmFamily, GoalPolicy};
use serde::Serialize;
use tracing::debug;

use crate::error::AnalysisError;
use crate::segment::Run;

/// First row at which the optimality ratio reached `k × final ratio`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdCrossing {
    /// Relative threshold.
    pub k: f64,
    /// Elapsed time of the crossing row.
    pub time_ms: Option<f64>,
    /// Iteration of the crossing row.
    pub iteration: Option<u64>,
}

/// Convergence metrics of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunMetrics {
    /// Algorithm label.
    pub algorithm: String,
    /// Run identifier within the algorithm's log.
    pub run_id: usize,
    /// Manhattan distance of the run's instance.
    pub manhattan: f64,
    /// Number of strict decreases of the best path length.
    pub improvement_count: usize,
    /// Final best path length divided by the Manhattan distance.
    pub final_optimality_ratio: f64,
    /// Elapsed time at which the goal condition first held.
    pub time_first_goal: Option<f64>,
    /// Elapsed time at which the final fitness was first reached.
    pub time_first_optimal: f64,
    /// `time_first_goal / manhattan`.
    pub time_first_goal_norm: Option<f64>,
    /// `time_first_optimal / manhattan`.
    pub time_first_optimal_norm: f64,
    /// Iteration at which the goal condition first held.
    pub iter_first_goal: Option<u64>,
    /// Iteration at which the final fitness was first reached.
    pub iter_first_optimal: Option<u64>,
    /// `iter_first_goal / manhattan`.
    pub iter_first_goal_norm: Option<f64>,
    /// `iter_first_optimal / manhattan`.
    pub iter_first_optimal_norm: Option<f64>,
    /// One crossing per requested threshold, in request order.
    pub thresholds: Vec<ThresholdCrossing>,
}

/// Index of the first row satisfying the family's goal condition.
///
/// | Family | Condition |
/// |--------|-----------|
/// | Firefly | first fitness above `policy.firefly_fitness` |
/// | ACO | first `i >= 1` with `fitness[i] == fitness[i - 1]` |
/// | Camel herd | index 0 |
/// | Other | none |
#[must_use]
pub fn goal_index(family: AlgorithmFamily, fitness: &[f64], policy: &GoalPolicy) -> Option<usize> {
    match family {
        AlgorithmFamily::Firefly => fitness.iter().position(|&f| f > policy.firefly_fitness),
        AlgorithmFamily::Aco => fitness
            .windows(2)
            .position(|pair| pair[1] == pair[0])
            .map(|i| i + 1),
        AlgorithmFamily::CamelHerd => (!fitness.is_empty()).then_some(0),
        AlgorithmFamily::Other => None,
    }
}

/// Index of the first row whose fitness equals the last row's fitness.
///
/// Always `Some` for a non-empty series whose last value is not NaN.
#[must_use]
pub fn optimal_index(fitness: &[f64]) -> Option<usize> {
    let final_fitness = *fitness.last()?;
    fitness.iter().position(|&f| f == final_fitness)
}

/// Number of strictly negative first differences.
#[must_use]
pub fn improvement_count(best_lengths: &[f64]) -> usize {
    best_lengths
        .windows(2)
        .filter(|pair| pair[1] < pair[0])
        .count()
}

/// Index of the first ratio at or below `threshold`.
#[must_use]
pub fn crossing_index(ratios: &[f64], threshold: f64) -> Option<usize> {
    ratios.iter().position(|&r| r <= threshold)
}

/// Divides a present value by the Manhattan distance.
#[must_use]
pub fn normalize(value: Option<f64>, manhattan: f64) -> Option<f64> {
    value.map(|v| v / manhattan)
}

/// Computes [`RunMetrics`] for the runs of one algorithm.
#[derive(Debug, Clone)]
pub struct MetricsCalculator<'a> {
    algorithm: &'a str,
    family: AlgorithmFamily,
    goal: &'a GoalPolicy,
    thresholds: &'a [f64],
}

impl<'a> MetricsCalculator<'a> {
    /// Creates a calculator for one algorithm.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidThreshold`] if any `k` is not a
    /// positive finite number.
    pub fn new(
        algorithm: &'a str,
        family: AlgorithmFamily,
        goal: &'a GoalPolicy,
        thresholds: &'a [f64],
    ) -> Result<Self, AnalysisError> {
        if let Some(&k) = thresholds.iter().find(|k| !(k.is_finite() && **k > 0.0)) {
            return Err(AnalysisError::InvalidThreshold(k));
        }
        Ok(Self {
            algorithm,
            family,
            goal,
            thresholds,
        })
    }

    /// Computes the metrics of one run.
    ///
    /// Rows are first sorted by elapsed time (stable). The Manhattan distance
    /// is taken from the first sorted row and divides every best path length,
    /// even when later rows record another distance.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::EmptyRun`] for a run without rows and
    /// [`AnalysisError::InvalidManhattan`] if the Manhattan distance is not a
    /// positive finite number.
    pub fn compute(&self, run: &Run<'_>) -> Result<RunMetrics, AnalysisError> {
        let rows = run.rows_by_time();
        let manhattan = run.manhattan().ok_or(AnalysisError::EmptyRun {
            run_id: run.run_id,
        })?;
        if !(manhattan.is_finite() && manhattan > 0.0) {
            return Err(AnalysisError::InvalidManhattan {
                run_id: run.run_id,
                manhattan,
            });
        }

        let times: Vec<f64> = rows.iter().map(|r| r.elapsed_ms).collect();
        let iterations: Vec<Option<u64>> = rows.iter().map(|r| r.iteration).collect();
        let fitness: Vec<f64> = rows.iter().map(|r| r.fitness).collect();
        let best: Vec<f64> = rows.iter().map(|r| r.best_path_length).collect();
        let ratios: Vec<f64> = best.iter().map(|b| b / manhattan).collect();

        let last = rows.len() - 1;
        let final_optimality_ratio = ratios[last];

        let goal = goal_index(self.family, &fitness, self.goal);
        let time_first_goal = goal.map(|i| times[i]);
        let iter_first_goal = goal.and_then(|i| iterations[i]);

        // The last row always matches itself unless its fitness is NaN.
        let optimal = optimal_index(&fitness).unwrap_or(last);
        let time_first_optimal = times[optimal];
        let iter_first_optimal = iterations[optimal];

        let thresholds = self
            .thresholds
            .iter()
            .map(|&k| {
                let crossing = crossing_index(&ratios, final_optimality_ratio * k);
                ThresholdCrossing {
                    k,
                    time_ms: crossing.map(|i| times[i]),
                    iteration: crossing.and_then(|i| iterations[i]),
                }
            })
            .collect();

        let metrics = RunMetrics {
            algorithm: self.algorithm.to_owned(),
            run_id: run.run_id,
            manhattan,
            improvement_count: improvement_count(&best),
            final_optimality_ratio,
            time_first_goal,
            time_first_optimal,
            time_first_goal_norm: normalize(time_first_goal, manhattan),
            time_first_optimal_norm: time_first_optimal / manhattan,
            iter_first_goal,
            iter_first_optimal,
            iter_first_goal_norm: normalize(iter_first_goal.map(|i| i as f64), manhattan),
            iter_first_optimal_norm: normalize(iter_first_optimal.map(|i| i as f64), manhattan),
            thresholds,
        };
        debug!(
            algorithm = self.algorithm,
            run_id = run.run_id,
            rows = rows.len(),
            improvements = metrics.improvement_count,
            final_ratio = metrics.final_optimality_ratio,
            "run metrics"
        );
        Ok(metrics)
    }

    /// Computes the metrics of every run, in run order.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by [`MetricsCalculator::compute`].
    pub fn compute_all(&self, runs: &[Run<'_>]) -> Result<Vec<RunMetrics>, AnalysisError> {
        runs.iter().map(|run| self.compute(run)).collect()
    }
}
