//! Column-ordered tables built from analysis results.
//!
//! Column names follow the log conventions (`TimeFirstGoal`, `Time_k1_5`,
//! `mean_TimeFirstOptimal`, …) so exported files can be read next to the
//! logs they came from. Missing values are empty cells in CSV and `null` in
//! JSON.

use std::fmt;

use pathstat_analysis::{
    AlgorithmComparison, CurveSet, DominanceMatrix, PathStats, RangeShare, RankSummary,
    RunMetrics, RunSummary, StatSummary, SuccessRate, TimeSummary, WinRate,
};
use pathstat_model::{threshold_suffix, InstanceRange};
use serde::Serialize;

/// One table cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    /// A label.
    Text(String),
    /// A count or identifier.
    Int(u64),
    /// A measurement.
    Float(f64),
    /// No value.
    Missing,
}

impl Cell {
    fn float(value: Option<f64>) -> Self {
        value.map_or(Cell::Missing, Cell::Float)
    }

    fn int(value: Option<u64>) -> Self {
        value.map_or(Cell::Missing, Cell::Int)
    }

    fn count(value: usize) -> Self {
        Cell::Int(value as u64)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Int(n) => write!(f, "{n}"),
            Cell::Float(x) => write!(f, "{x}"),
            Cell::Missing => Ok(()),
        }
    }
}

/// A table with named columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    /// Column names.
    pub columns: Vec<String>,
    /// Rows, each with one cell per column.
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Creates an empty table with the given columns.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a row. Short rows are padded with missing cells.
    pub fn push(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::Missing);
        self.rows.push(row);
    }

    /// Index of a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at `row` in the named column.
    #[must_use]
    pub fn get(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.column(column)?;
        self.rows.get(row)?.get(idx)
    }
}

/// Per-run metrics, one row per run.
///
/// Threshold columns follow `ks`; a `k` a run has no crossing for is missing.
#[must_use]
pub fn metrics_table(metrics: &[RunMetrics], ks: &[f64]) -> Table {
    let mut columns: Vec<String> = [
        "Algorithm",
        "RunId",
        "Manhattan",
        "ImprovementCount",
        "OptRatio_final",
        "TimeFirstGoal",
        "TimeFirstOptimal",
        "TimeFirstGoalNorm",
        "TimeFirstOptimalNorm",
        "IterFirstGoal",
        "IterFirstOptimal",
        "IterFirstGoalNorm",
        "IterFirstOptimalNorm",
    ]
    .iter()
    .map(|c| (*c).to_owned())
    .collect();
    columns.extend(ks.iter().map(|&k| format!("Time_{}", threshold_suffix(k))));
    columns.extend(ks.iter().map(|&k| format!("Iter_{}", threshold_suffix(k))));

    let mut table = Table::new(columns);
    for m in metrics {
        let crossing = |k: f64| m.thresholds.iter().find(|t| t.k == k);
        let mut row = vec![
            Cell::Text(m.algorithm.clone()),
            Cell::count(m.run_id),
            Cell::Float(m.manhattan),
            Cell::count(m.improvement_count),
            Cell::Float(m.final_optimality_ratio),
            Cell::float(m.time_first_goal),
            Cell::Float(m.time_first_optimal),
            Cell::float(m.time_first_goal_norm),
            Cell::Float(m.time_first_optimal_norm),
            Cell::int(m.iter_first_goal),
            Cell::int(m.iter_first_optimal),
            Cell::float(m.iter_first_goal_norm),
            Cell::float(m.iter_first_optimal_norm),
        ];
        row.extend(
            ks.iter()
                .map(|&k| Cell::float(crossing(k).and_then(|t| t.time_ms))),
        );
        row.extend(
            ks.iter()
                .map(|&k| Cell::int(crossing(k).and_then(|t| t.iteration))),
        );
        table.push(row);
    }
    table
}

/// Per-algorithm time summary, one row per algorithm.
#[must_use]
pub fn time_summary_table(summaries: &[TimeSummary], ks: &[f64]) -> Table {
    let mut columns: Vec<String> = [
        "Algorithm",
        "Runs",
        "mean_TimeFirstGoal",
        "mean_TimeFirstOptimal",
        "mean_TimeFirstGoalNorm",
        "mean_TimeFirstOptimalNorm",
        "SuccessRate_opt_le_timeout",
    ]
    .iter()
    .map(|c| (*c).to_owned())
    .collect();
    columns.extend(ks.iter().map(|&k| format!("mean_Time_{}", threshold_suffix(k))));

    let mut table = Table::new(columns);
    for s in summaries {
        let mut row = vec![
            Cell::Text(s.algorithm.clone()),
            Cell::count(s.runs),
            Cell::float(s.mean_time_first_goal),
            Cell::float(s.mean_time_first_optimal),
            Cell::float(s.mean_time_first_goal_norm),
            Cell::float(s.mean_time_first_optimal_norm),
            Cell::Float(s.success_rate),
        ];
        row.extend(ks.iter().map(|&k| {
            Cell::float(
                s.mean_time_k
                    .iter()
                    .find(|(sk, _)| *sk == k)
                    .and_then(|(_, t)| *t),
            )
        }));
        table.push(row);
    }
    table
}

/// Final state of every run.
#[must_use]
pub fn run_summary_table(summaries: &[RunSummary]) -> Table {
    let mut table = Table::new([
        "Algorithm",
        "RunId",
        "ConvergenceTimeMs",
        "FinalBestPathLength",
        "FinalFitness",
        "NumIterations",
    ]);
    for s in summaries {
        table.push(vec![
            Cell::Text(s.algorithm.clone()),
            Cell::count(s.run_id),
            Cell::Float(s.convergence_time_ms),
            Cell::Float(s.final_best_path_length),
            Cell::Float(s.final_fitness),
            Cell::int(s.num_iterations),
        ]);
    }
    table
}

const COMPARED_METRICS: [&str; 4] = [
    "ConvergenceTimeMs",
    "FinalBestPathLength",
    "FinalFitness",
    "NumIterations",
];

/// Algorithm comparison: run count plus mean, std, min and max of every run
/// summary metric, rounded to three decimals.
#[must_use]
pub fn comparison_table(comparisons: &[AlgorithmComparison]) -> Table {
    let mut columns = vec!["Algorithm".to_owned(), "Runs".to_owned()];
    for metric in COMPARED_METRICS {
        for stat in ["mean", "std", "min", "max"] {
            columns.push(format!("{metric}_{stat}"));
        }
    }

    let mut table = Table::new(columns);
    for c in comparisons {
        let mut row = vec![Cell::Text(c.algorithm.clone()), Cell::count(c.runs)];
        for stats in [
            &c.convergence_time_ms,
            &c.final_best_path_length,
            &c.final_fitness,
            &c.num_iterations,
        ] {
            row.extend(stat_cells(stats));
        }
        table.push(row);
    }
    table
}

fn stat_cells(stats: &StatSummary) -> [Cell; 4] {
    [stats.mean, stats.std, stats.min, stats.max].map(|v| Cell::float(v.map(round3)))
}

/// Rounds to three decimals.
#[must_use]
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Mean and median optimality ratio over the grid.
#[must_use]
pub fn opt_ratio_table(grid: &[f64], curves: &CurveSet) -> Table {
    curve_table(grid, &curves.opt_ratio_mean, &curves.opt_ratio_median)
}

/// Mean and median improvement percentage over the grid.
#[must_use]
pub fn improvement_table(grid: &[f64], curves: &CurveSet) -> Table {
    curve_table(grid, &curves.improvement_mean, &curves.improvement_median)
}

fn curve_table(grid: &[f64], mean: &[Option<f64>], median: &[Option<f64>]) -> Table {
    let mut table = Table::new(["TimeMs", "Mean", "Median"]);
    for (i, &t) in grid.iter().enumerate() {
        table.push(vec![
            Cell::Float(t),
            Cell::float(mean.get(i).copied().flatten()),
            Cell::float(median.get(i).copied().flatten()),
        ]);
    }
    table
}

/// Runs per instance range, as counts and as percentages of each
/// algorithm's runs.
#[must_use]
pub fn range_share_table(shares: &[RangeShare]) -> Table {
    let mut columns = vec!["Algorithm".to_owned(), "Runs".to_owned()];
    for range in InstanceRange::ALL {
        columns.push(format!("Runs_{}", range.as_str()));
        columns.push(format!("Pct_{}", range.as_str()));
    }

    let mut table = Table::new(columns);
    for share in shares {
        let mut row = vec![Cell::Text(share.algorithm.clone()), Cell::count(share.total())];
        for range in InstanceRange::ALL {
            row.push(Cell::count(share.count(range)));
            row.push(Cell::float(share.percent(range).map(round2)));
        }
        table.push(row);
    }
    table
}

/// Success rate per algorithm, in percent.
#[must_use]
pub fn success_table(rates: &[SuccessRate]) -> Table {
    let mut table = Table::new(["Algorithm", "Attempts", "Successes", "SuccessRate"]);
    for rate in rates {
        table.push(vec![
            Cell::Text(rate.algorithm.clone()),
            Cell::count(rate.attempts),
            Cell::count(rate.successes),
            Cell::Float(round2(rate.rate_percent)),
        ]);
    }
    table
}

/// Path-length statistics over solved attempts, rounded to three decimals.
#[must_use]
pub fn path_stats_table(stats: &[PathStats]) -> Table {
    let mut table = Table::new([
        "Algorithm",
        "Solved",
        "PathLength_mean",
        "PathLength_std",
        "PathLength_median",
        "PathLength_q25",
        "PathLength_q75",
        "PathLength_min",
        "PathLength_max",
        "Optimality_mean",
        "Excess_mean",
        "ExcessPct_mean",
        "SumOfCosts",
    ]);
    for s in stats {
        let [mean, std, min, max] = stat_cells(&s.path_length);
        table.push(vec![
            Cell::Text(s.algorithm.clone()),
            Cell::count(s.solved),
            mean,
            std,
            Cell::float(s.median.map(round3)),
            Cell::float(s.q25.map(round3)),
            Cell::float(s.q75.map(round3)),
            min,
            max,
            Cell::float(s.mean_optimality.map(round3)),
            Cell::float(s.mean_excess.map(round3)),
            Cell::float(s.mean_excess_percent.map(round3)),
            Cell::float(s.sum_of_costs),
        ]);
    }
    table
}

/// Weighted win count and win rate, best first.
#[must_use]
pub fn win_rate_table(wins: &[WinRate]) -> Table {
    let mut table = Table::new(["Algorithm", "WinCountWeighted", "WinRate"]);
    for w in wins {
        table.push(vec![
            Cell::Text(w.algorithm.clone()),
            Cell::Float(round3(w.wins)),
            Cell::Float(round3(w.win_rate)),
        ]);
    }
    table
}

/// Mean and standard deviation of the per-instance rank (1 = best).
#[must_use]
pub fn rank_table(ranks: &[RankSummary]) -> Table {
    let mut table = Table::new(["Algorithm", "mean_rank", "std_rank"]);
    for r in ranks {
        table.push(vec![
            Cell::Text(r.algorithm.clone()),
            Cell::float(r.mean_rank.map(round3)),
            Cell::float(r.std_rank.map(round3)),
        ]);
    }
    table
}

/// Dominance counts: the row algorithm beat the column algorithm this many
/// times.
#[must_use]
pub fn dominance_count_table(matrix: &DominanceMatrix) -> Table {
    dominance_table(matrix, |i, j| {
        Cell::int(
            matrix
                .counts
                .get(i)
                .and_then(|row| row.get(j))
                .map(|&c| c as u64),
        )
    })
}

/// Dominance shares: the fraction of instances in which the row algorithm
/// beat the column algorithm.
#[must_use]
pub fn dominance_share_table(matrix: &DominanceMatrix) -> Table {
    dominance_table(matrix, |i, j| Cell::float(matrix.share(i, j).map(round3)))
}

fn dominance_table<F>(matrix: &DominanceMatrix, cell: F) -> Table
where
    F: Fn(usize, usize) -> Cell,
{
    let mut columns = vec!["Algorithm".to_owned()];
    columns.extend(matrix.algorithms.iter().cloned());

    let mut table = Table::new(columns);
    for (i, algorithm) in matrix.algorithms.iter().enumerate() {
        let mut row = vec![Cell::Text(algorithm.clone())];
        row.extend((0..matrix.algorithms.len()).map(|j| cell(i, j)));
        table.push(row);
    }
    table
}

/// Rounds to two decimals.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
