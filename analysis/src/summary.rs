//! Aggregation of per-run results into per-algorithm tables.
//!
//! Three tables are produced:
//! - [`TimeSummary`]: mean goal/optimal/threshold times and the share of runs
//!   that reached their final fitness within a timeout;
//! - [`RunSummary`]: final state of each run;
//! - [`AlgorithmComparison`]: mean, sample standard deviation, minimum and
//!   maximum of the run summaries, per algorithm.
//!
//! [`RangeShare`] counts how an algorithm's runs spread over the instance
//! ranges.
//!
//! Means and spreads skip missing values. A statistic over no values is
//! missing.

use std::collections::BTreeMap;

use pathstat_model::{InstanceRange, RangeBreakpoints};
use serde::Serialize;

use crate::metrics::RunMetrics;
use crate::segment::Run;

/// Mean of the present values.
#[must_use]
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Quantile `q` of the present values, interpolating linearly between the
/// two nearest ranks.
#[must_use]
pub fn quantile<I>(values: I, q: f64) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut present: Vec<f64> = values.into_iter().flatten().collect();
    if present.is_empty() {
        return None;
    }
    present.sort_by(f64::total_cmp);
    let pos = q.clamp(0.0, 1.0) * (present.len() - 1) as f64;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let lower = pos.floor() as usize;
    let upper = (lower + 1).min(present.len() - 1);
    let frac = pos - lower as f64;
    Some(present[lower] + (present[upper] - present[lower]) * frac)
}

/// Descriptive statistics of one metric across runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StatSummary {
    /// Arithmetic mean.
    pub mean: Option<f64>,
    /// Sample standard deviation (`n - 1` denominator); missing below two values.
    pub std: Option<f64>,
    /// Smallest value.
    pub min: Option<f64>,
    /// Largest value.
    pub max: Option<f64>,
}

impl StatSummary {
    /// Summarizes the present values.
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let present: Vec<f64> = values.into_iter().flatten().collect();
        let n = present.len();
        let mean = mean(present.iter().copied().map(Some));
        let std = match (mean, n) {
            (Some(m), n) if n >= 2 => {
                let ss: f64 = present.iter().map(|v| (v - m) * (v - m)).sum();
                Some((ss / (n - 1) as f64).sqrt())
            }
            _ => None,
        };
        Self {
            mean,
            std,
            min: present.iter().copied().reduce(f64::min),
            max: present.iter().copied().reduce(f64::max),
        }
    }
}

/// Per-algorithm timing summary of the run metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSummary {
    /// Algorithm label.
    pub algorithm: String,
    /// Number of runs summarized.
    pub runs: usize,
    /// Mean time to the goal condition.
    pub mean_time_first_goal: Option<f64>,
    /// Mean time to the final fitness.
    pub mean_time_first_optimal: Option<f64>,
    /// Mean normalized time to the goal condition.
    pub mean_time_first_goal_norm: Option<f64>,
    /// Mean normalized time to the final fitness.
    pub mean_time_first_optimal_norm: Option<f64>,
    /// Share of runs with `time_first_optimal <= timeout_ms`.
    pub success_rate: f64,
    /// Mean threshold-crossing time per `k`, in first-seen order.
    pub mean_time_k: Vec<(f64, Option<f64>)>,
}

/// Groups run metrics by algorithm (sorted by label) and summarizes their timings.
#[must_use]
pub fn summarize_time_metrics(per_run: &[RunMetrics], timeout_ms: f64) -> Vec<TimeSummary> {
    group_by_algorithm(per_run, |m| m.algorithm.as_str())
        .into_iter()
        .map(|(algorithm, runs)| {
            let mut ks: Vec<f64> = Vec::new();
            for crossing in runs.iter().flat_map(|m| &m.thresholds) {
                if !ks.contains(&crossing.k) {
                    ks.push(crossing.k);
                }
            }
            let mean_time_k = ks
                .iter()
                .map(|&k| {
                    let times = runs.iter().map(|m| {
                        m.thresholds
                            .iter()
                            .find(|c| c.k == k)
                            .and_then(|c| c.time_ms)
                    });
                    (k, mean(times))
                })
                .collect();
            let successes = runs
                .iter()
                .filter(|m| m.time_first_optimal <= timeout_ms)
                .count();

            TimeSummary {
                algorithm: algorithm.to_owned(),
                runs: runs.len(),
                mean_time_first_goal: mean(runs.iter().map(|m| m.time_first_goal)),
                mean_time_first_optimal: mean(runs.iter().map(|m| Some(m.time_first_optimal))),
                mean_time_first_goal_norm: mean(runs.iter().map(|m| m.time_first_goal_norm)),
                mean_time_first_optimal_norm: mean(
                    runs.iter().map(|m| Some(m.time_first_optimal_norm)),
                ),
                success_rate: successes as f64 / runs.len() as f64,
                mean_time_k,
            }
        })
        .collect()
}

/// Final state of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Algorithm label.
    pub algorithm: String,
    /// Run identifier.
    pub run_id: usize,
    /// Elapsed time of the run's last iteration.
    pub convergence_time_ms: f64,
    /// Best path length at the last iteration.
    pub final_best_path_length: f64,
    /// Fitness at the last iteration.
    pub final_fitness: f64,
    /// Highest iteration number in the run.
    pub num_iterations: Option<u64>,
}

/// Summarizes the final state of a run.
///
/// The last iteration is the last row in iteration order (rows without an
/// iteration number sort last, ties keep recorded order). Returns `None` for
/// an empty run.
#[must_use]
pub fn summarize_run(algorithm: &str, run: &Run<'_>) -> Option<RunSummary> {
    let last = run
        .rows
        .iter()
        .enumerate()
        .max_by_key(|(i, row)| (row.iteration.is_none(), row.iteration, *i))
        .map(|(_, row)| row)?;
    Some(RunSummary {
        algorithm: algorithm.to_owned(),
        run_id: run.run_id,
        convergence_time_ms: last.elapsed_ms,
        final_best_path_length: last.best_path_length,
        final_fitness: last.fitness,
        num_iterations: run.rows.iter().filter_map(|row| row.iteration).max(),
    })
}

/// Algorithm-level comparison built from run summaries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlgorithmComparison {
    /// Algorithm label.
    pub algorithm: String,
    /// Number of distinct runs.
    pub runs: usize,
    /// Statistics of [`RunSummary::convergence_time_ms`].
    pub convergence_time_ms: StatSummary,
    /// Statistics of [`RunSummary::final_best_path_length`].
    pub final_best_path_length: StatSummary,
    /// Statistics of [`RunSummary::final_fitness`].
    pub final_fitness: StatSummary,
    /// Statistics of [`RunSummary::num_iterations`].
    pub num_iterations: StatSummary,
}

/// Groups run summaries by algorithm (sorted by label) and compares them.
#[must_use]
pub fn compare_algorithms(summaries: &[RunSummary]) -> Vec<AlgorithmComparison> {
    group_by_algorithm(summaries, |s| s.algorithm.as_str())
        .into_iter()
        .map(|(algorithm, runs)| {
            let mut run_ids: Vec<usize> = runs.iter().map(|s| s.run_id).collect();
            run_ids.sort_unstable();
            run_ids.dedup();
            AlgorithmComparison {
                algorithm: algorithm.to_owned(),
                runs: run_ids.len(),
                convergence_time_ms: StatSummary::from_values(
                    runs.iter().map(|s| Some(s.convergence_time_ms)),
                ),
                final_best_path_length: StatSummary::from_values(
                    runs.iter().map(|s| Some(s.final_best_path_length)),
                ),
                final_fitness: StatSummary::from_values(
                    runs.iter().map(|s| Some(s.final_fitness)),
                ),
                num_iterations: StatSummary::from_values(
                    runs.iter().map(|s| s.num_iterations.map(|n| n as f64)),
                ),
            }
        })
        .collect()
}

/// How one algorithm's runs spread over the instance ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RangeShare {
    /// Algorithm label.
    pub algorithm: String,
    /// Runs on short instances.
    pub short: usize,
    /// Runs on medium instances.
    pub medium: usize,
    /// Runs on long instances.
    pub long: usize,
}

impl RangeShare {
    /// Runs in one range.
    #[must_use]
    pub fn count(&self, range: InstanceRange) -> usize {
        match range {
            InstanceRange::Short => self.short,
            InstanceRange::Medium => self.medium,
            InstanceRange::Long => self.long,
        }
    }

    /// Runs in every range.
    #[must_use]
    pub fn total(&self) -> usize {
        self.short + self.medium + self.long
    }

    /// Share of runs in one range, in percent; missing without runs.
    #[must_use]
    pub fn percent(&self, range: InstanceRange) -> Option<f64> {
        let total = self.total();
        (total > 0).then(|| self.count(range) as f64 / total as f64 * 100.0)
    }
}

/// Counts runs per instance range, classifying each run by its Manhattan
/// distance. Empty runs are skipped.
#[must_use]
pub fn range_share(algorithm: &str, runs: &[Run<'_>], ranges: &RangeBreakpoints) -> RangeShare {
    let mut share = RangeShare {
        algorithm: algorithm.to_owned(),
        ..RangeShare::default()
    };
    for manhattan in runs.iter().filter_map(Run::manhattan) {
        match ranges.classify(manhattan) {
            InstanceRange::Short => share.short += 1,
            InstanceRange::Medium => share.medium += 1,
            InstanceRange::Long => share.long += 1,
        }
    }
    share
}

pub(crate) fn group_by_algorithm<'a, T, F>(items: &'a [T], key: F) -> BTreeMap<&'a str, Vec<&'a T>>
where
    F: Fn(&'a T) -> &'a str,
{
    let mut groups: BTreeMap<&str, Vec<&T>> = BTreeMap::new();
    for item in items {
        groups.entry(key(item)).or_default().push(item);
    }
    groups
}
