//! Cross-algorithm comparison of final pathfinding outcomes.
//!
//! A results file holds one row per attempt. Every algorithm solves the same
//! sequence of problem instances, so the file splits into consecutive blocks
//! of one row per algorithm. A block that does not name every algorithm
//! exactly once is discarded.
//!
//! Attempts are compared by [`ResultRow::cost`]: a failed attempt ranks behind
//! every solved one, and two failures tie.

use std::collections::{BTreeMap, BTreeSet};

use pathstat_model::{ResultRow, ResultsLog};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::AnalysisError;
use crate::report::{AnalysisReport, Diagnostic};
use crate::summary::{group_by_algorithm, mean, quantile, StatSummary};

/// Path lengths closer than this share a win.
pub const TIE_EPSILON: f64 = 1e-9;

/// Label used for diagnostics about the results file as a whole.
const RESULTS_SCOPE: &str = "results";

/// One problem instance: a block with exactly one row per algorithm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Instance<'a> {
    /// Zero-based position of the block in the file.
    pub id: usize,
    /// The block's rows in recorded order.
    pub rows: &'a [ResultRow],
}

/// Outcome of splitting a results file into instances.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceSplit<'a> {
    /// Algorithm labels, sorted.
    pub algorithms: Vec<String>,
    /// Complete instances, in file order.
    pub instances: Vec<Instance<'a>>,
    /// Ids of the blocks discarded as incomplete.
    pub discarded: Vec<usize>,
}

/// Splits the rows into blocks of one row per algorithm.
///
/// # Errors
///
/// Returns [`AnalysisError::TooFewAlgorithms`] if the rows name fewer than
/// two algorithms.
pub fn split_instances(rows: &[ResultRow]) -> Result<InstanceSplit<'_>, AnalysisError> {
    let algorithms: BTreeSet<&str> = rows.iter().map(|r| r.algorithm.as_str()).collect();
    let n = algorithms.len();
    if n < 2 {
        return Err(AnalysisError::TooFewAlgorithms { found: n });
    }

    let mut instances = Vec::new();
    let mut discarded = Vec::new();
    for (id, block) in rows.chunks(n).enumerate() {
        let labels: BTreeSet<&str> = block.iter().map(|r| r.algorithm.as_str()).collect();
        if block.len() == n && labels.len() == n {
            instances.push(Instance { id, rows: block });
        } else {
            discarded.push(id);
        }
    }
    debug!(
        algorithms = n,
        instances = instances.len(),
        discarded = discarded.len(),
        "split results"
    );
    Ok(InstanceSplit {
        algorithms: algorithms.into_iter().map(str::to_owned).collect(),
        instances,
        discarded,
    })
}

/// Share of attempts flagged successful.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuccessRate {
    /// Algorithm label.
    pub algorithm: String,
    /// Number of attempts.
    pub attempts: usize,
    /// Number of attempts with `Success` set.
    pub successes: usize,
    /// `successes / attempts × 100`.
    pub rate_percent: f64,
}

/// Success rate per algorithm over every attempt, sorted by label.
#[must_use]
pub fn success_rates(rows: &[ResultRow]) -> Vec<SuccessRate> {
    group_by_algorithm(rows, |r| r.algorithm.as_str())
        .into_iter()
        .map(|(algorithm, attempts)| {
            let successes = attempts.iter().filter(|r| r.success).count();
            SuccessRate {
                algorithm: algorithm.to_owned(),
                attempts: attempts.len(),
                successes,
                rate_percent: successes as f64 / attempts.len() as f64 * 100.0,
            }
        })
        .collect()
}

/// Path quality of one algorithm's solved attempts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathStats {
    /// Algorithm label.
    pub algorithm: String,
    /// Number of solved attempts.
    pub solved: usize,
    /// Mean, spread and extremes of the path length.
    pub path_length: StatSummary,
    /// First quartile of the path length.
    pub q25: Option<f64>,
    /// Median path length.
    pub median: Option<f64>,
    /// Third quartile of the path length.
    pub q75: Option<f64>,
    /// Mean of `path_length / manhattan`.
    pub mean_optimality: Option<f64>,
    /// Mean of `path_length - manhattan`, in steps.
    pub mean_excess: Option<f64>,
    /// Mean of `(path_length - manhattan) / manhattan × 100`.
    pub mean_excess_percent: Option<f64>,
    /// Sum of path lengths over the instances every algorithm solved.
    pub sum_of_costs: Option<f64>,
}

/// Path statistics per algorithm, sorted by label.
///
/// Everything but the sum of costs is computed over all solved attempts; the
/// sum of costs only counts `instances` in which every attempt was solved, so
/// algorithms are summed over the same instances.
#[must_use]
pub fn path_stats(rows: &[ResultRow], instances: &[Instance<'_>]) -> Vec<PathStats> {
    let mut sum_of_costs: BTreeMap<&str, f64> = BTreeMap::new();
    for instance in instances {
        if instance.rows.iter().all(ResultRow::is_solved) {
            for row in instance.rows {
                *sum_of_costs.entry(row.algorithm.as_str()).or_default() += row.path_length;
            }
        }
    }

    group_by_algorithm(rows, |r| r.algorithm.as_str())
        .into_iter()
        .map(|(algorithm, attempts)| {
            let solved: Vec<&ResultRow> =
                attempts.into_iter().filter(|r| r.is_solved()).collect();
            let lengths = || solved.iter().map(|r| Some(r.path_length));
            PathStats {
                algorithm: algorithm.to_owned(),
                solved: solved.len(),
                path_length: StatSummary::from_values(lengths()),
                q25: quantile(lengths(), 0.25),
                median: quantile(lengths(), 0.5),
                q75: quantile(lengths(), 0.75),
                mean_optimality: mean(solved.iter().map(|r| Some(r.path_length / r.manhattan))),
                mean_excess: mean(solved.iter().map(|r| Some(r.path_length - r.manhattan))),
                mean_excess_percent: mean(
                    solved
                        .iter()
                        .map(|r| Some((r.path_length - r.manhattan) / r.manhattan * 100.0)),
                ),
                sum_of_costs: sum_of_costs.get(algorithm).copied(),
            }
        })
        .collect()
}

/// Weighted wins of one algorithm.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WinRate {
    /// Algorithm label.
    pub algorithm: String,
    /// Wins, each shared equally between tied winners.
    pub wins: f64,
    /// `wins / instances`.
    pub win_rate: f64,
}

/// Win rate per algorithm, best first (ties by label).
///
/// The shortest solved path of an instance wins; paths within
/// [`TIE_EPSILON`] of it share the point. An instance nobody solved has no
/// winner but still counts in the denominator.
#[must_use]
pub fn win_rates(algorithms: &[String], instances: &[Instance<'_>]) -> Vec<WinRate> {
    let mut wins: BTreeMap<&str, f64> = algorithms.iter().map(|a| (a.as_str(), 0.0)).collect();
    for instance in instances {
        let best = instance
            .rows
            .iter()
            .map(ResultRow::cost)
            .fold(f64::INFINITY, f64::min);
        if best.is_infinite() {
            continue;
        }
        let winners: Vec<&ResultRow> = instance
            .rows
            .iter()
            .filter(|r| r.cost() <= best + TIE_EPSILON)
            .collect();
        let share = 1.0 / winners.len() as f64;
        for winner in winners {
            *wins.entry(winner.algorithm.as_str()).or_default() += share;
        }
    }

    let total = instances.len() as f64;
    let mut rates: Vec<WinRate> = wins
        .into_iter()
        .map(|(algorithm, wins)| WinRate {
            algorithm: algorithm.to_owned(),
            wins,
            win_rate: if instances.is_empty() { 0.0 } else { wins / total },
        })
        .collect();
    rates.sort_by(|a, b| {
        b.win_rate
            .total_cmp(&a.win_rate)
            .then_with(|| a.algorithm.cmp(&b.algorithm))
    });
    rates
}

/// One-based ranks of `costs`, ascending; equal costs share the mean of the
/// ranks they span.
///
/// ```
/// use pathstat_analysis::ranking::average_ranks_of;
///
/// assert_eq!(average_ranks_of(&[30.0, 20.0, 30.0]), vec![2.5, 1.0, 2.5]);
/// ```
#[must_use]
pub fn average_ranks_of(costs: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..costs.len()).collect();
    order.sort_by(|&a, &b| costs[a].total_cmp(&costs[b]));

    let mut ranks = vec![0.0; costs.len()];
    let mut start = 0usize;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && costs[order[end]] == costs[order[start]] {
            end += 1;
        }
        // Positions start..end hold ranks start + 1 ..= end.
        let rank = (start + 1 + end) as f64 / 2.0;
        for &i in &order[start..end] {
            ranks[i] = rank;
        }
        start = end;
    }
    ranks
}

/// Rank statistics of one algorithm across instances.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankSummary {
    /// Algorithm label.
    pub algorithm: String,
    /// Mean rank (1 = best).
    pub mean_rank: Option<f64>,
    /// Sample standard deviation of the rank.
    pub std_rank: Option<f64>,
}

/// Mean and spread of each algorithm's per-instance rank, sorted by label.
#[must_use]
pub fn average_ranks(instances: &[Instance<'_>]) -> Vec<RankSummary> {
    let mut ranks: BTreeMap<&str, Vec<Option<f64>>> = BTreeMap::new();
    for instance in instances {
        let costs: Vec<f64> = instance.rows.iter().map(ResultRow::cost).collect();
        for (row, rank) in instance.rows.iter().zip(average_ranks_of(&costs)) {
            ranks.entry(row.algorithm.as_str()).or_default().push(Some(rank));
        }
    }
    ranks
        .into_iter()
        .map(|(algorithm, values)| {
            let stats = StatSummary::from_values(values);
            RankSummary {
                algorithm: algorithm.to_owned(),
                mean_rank: stats.mean,
                std_rank: stats.std,
            }
        })
        .collect()
}

/// Pairwise dominance: how often the row algorithm beat the column algorithm.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DominanceMatrix {
    /// Algorithm labels, sorted; rows and columns follow this order.
    pub algorithms: Vec<String>,
    /// `counts[a][b]`: instances in which `a` had a strictly lower cost than `b`.
    pub counts: Vec<Vec<usize>>,
    /// Number of instances compared.
    pub instances: usize,
}

impl DominanceMatrix {
    /// Instances in which `a` beat `b`.
    #[must_use]
    pub fn count(&self, a: &str, b: &str) -> Option<usize> {
        let i = self.algorithms.iter().position(|x| x == a)?;
        let j = self.algorithms.iter().position(|x| x == b)?;
        Some(self.counts[i][j])
    }

    /// Share of instances in which the `i`-th algorithm beat the `j`-th.
    #[must_use]
    pub fn share(&self, i: usize, j: usize) -> Option<f64> {
        let count = *self.counts.get(i)?.get(j)?;
        (self.instances > 0).then(|| count as f64 / self.instances as f64)
    }
}

/// Builds the dominance matrix over complete instances.
#[must_use]
pub fn dominance(algorithms: &[String], instances: &[Instance<'_>]) -> DominanceMatrix {
    let n = algorithms.len();
    let mut counts = vec![vec![0usize; n]; n];
    for instance in instances {
        let costs: Vec<(usize, f64)> = instance
            .rows
            .iter()
            .filter_map(|r| {
                algorithms
                    .iter()
                    .position(|a| *a == r.algorithm)
                    .map(|i| (i, r.cost()))
            })
            .collect();
        for &(a, cost_a) in &costs {
            for &(b, cost_b) in &costs {
                if a != b && cost_a < cost_b {
                    counts[a][b] += 1;
                }
            }
        }
    }
    DominanceMatrix {
        algorithms: algorithms.to_vec(),
        counts,
        instances: instances.len(),
    }
}

/// Everything computed from one results file.
#[derive(Debug, Clone, Serialize)]
pub struct ResultsAnalysis {
    /// Algorithm labels, sorted.
    pub algorithms: Vec<String>,
    /// Number of complete instances.
    pub instances: usize,
    /// Success rate per algorithm.
    pub success: Vec<SuccessRate>,
    /// Path statistics per algorithm.
    pub paths: Vec<PathStats>,
    /// Win rate per algorithm, best first.
    pub wins: Vec<WinRate>,
    /// Rank statistics per algorithm.
    pub ranks: Vec<RankSummary>,
    /// Pairwise dominance.
    pub dominance: DominanceMatrix,
    /// Diagnostics raised while ranking.
    pub report: AnalysisReport,
}

/// Runs every results-file comparison.
///
/// # Errors
///
/// Returns [`AnalysisError::TooFewAlgorithms`] if the file names fewer than
/// two algorithms.
pub fn rank_results(results: &ResultsLog) -> Result<ResultsAnalysis, AnalysisError> {
    let split = split_instances(&results.rows)?;
    let mut report = AnalysisReport::new();

    if results.dropped > 0 {
        report.push(Diagnostic::info(
            RESULTS_SCOPE,
            format!("{} row(s) dropped as malformed", results.dropped),
        ));
    }
    if !split.discarded.is_empty() {
        warn!(
            discarded = split.discarded.len(),
            "instances without a full set of algorithms"
        );
        report.push(Diagnostic::warn_with_details(
            RESULTS_SCOPE,
            format!(
                "{} instance(s) without one row per algorithm were left out of the rankings",
                split.discarded.len()
            ),
            split
                .discarded
                .iter()
                .map(|id| format!("instance {id}"))
                .collect(),
        ));
    }
    if split.instances.is_empty() {
        report.push(Diagnostic::fail(RESULTS_SCOPE, "no complete instance to rank"));
    }
    let success = success_rates(&results.rows);
    for rate in &success {
        if rate.successes == 0 {
            report.push(Diagnostic::warn(&rate.algorithm, "no successful attempt"));
        }
    }

    let analysis = ResultsAnalysis {
        success,
        paths: path_stats(&results.rows, &split.instances),
        wins: win_rates(&split.algorithms, &split.instances),
        ranks: average_ranks(&split.instances),
        dominance: dominance(&split.algorithms, &split.instances),
        instances: split.instances.len(),
        algorithms: split.algorithms,
        report,
    };
    info!(
        algorithms = analysis.algorithms.len(),
        instances = analysis.instances,
        failures = analysis.report.failure_count(),
        "ranked results"
    );
    Ok(analysis)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::fixtures::result;
    use crate::report::Severity;

    /// Three algorithms over three instances.
    ///
    /// | instance | ACO | CHA | FA |
    /// |----------|-----|-----|----|
    /// | 0 | 22 | 20 | 20 |
    /// | 1 | 30 | 34 | failed |
    /// | 2 | failed | failed | failed |
    fn rows() -> Vec<ResultRow> {
        vec![
            result("ACO", 22.0, true, 20.0),
            result("CHA", 20.0, true, 20.0),
            result("FA", 20.0, true, 20.0),
            result("ACO", 30.0, true, 25.0),
            result("CHA", 34.0, true, 25.0),
            result("FA", 0.0, false, 25.0),
            result("ACO", 0.0, false, 40.0),
            result("CHA", 0.0, false, 40.0),
            result("FA", 0.0, false, 40.0),
        ]
    }

    #[test]
    fn split_keeps_complete_blocks_only() {
        let mut rows = rows();
        // Block 1 now names ACO twice; the trailing block is short.
        rows[4].algorithm = "ACO".to_owned();
        rows.push(result("ACO", 10.0, true, 10.0));
        let split = split_instances(&rows).unwrap();
        assert_eq!(split.algorithms, vec!["ACO", "CHA", "FA"]);
        let ids: Vec<usize> = split.instances.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![0, 2]);
        assert_eq!(split.discarded, vec![1, 3]);
    }

    #[test]
    fn single_algorithm_cannot_be_ranked() {
        let rows = vec![result("ACO", 20.0, true, 20.0)];
        assert_eq!(
            split_instances(&rows).unwrap_err(),
            AnalysisError::TooFewAlgorithms { found: 1 }
        );
    }

    #[test]
    fn success_rate_counts_every_attempt() {
        let rates = success_rates(&rows());
        assert_eq!(rates[0].algorithm, "ACO");
        assert_eq!(rates[0].attempts, 3);
        assert_eq!(rates[0].successes, 2);
        assert!((rates[0].rate_percent - 200.0 / 3.0).abs() < 1e-12);
        assert!((rates[2].rate_percent - 100.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn path_stats_cover_solved_attempts() {
        let rows = rows();
        let split = split_instances(&rows).unwrap();
        let stats = path_stats(&rows, &split.instances);

        let aco = &stats[0];
        assert_eq!(aco.solved, 2);
        assert_eq!(aco.path_length.mean, Some(26.0));
        assert_eq!(aco.path_length.min, Some(22.0));
        assert_eq!(aco.median, Some(26.0));
        assert_eq!(aco.q25, Some(24.0));
        // Excess: 2 and 5 steps, 10 % and 20 %.
        assert_eq!(aco.mean_excess, Some(3.5));
        assert!((aco.mean_excess_percent.unwrap() - 15.0).abs() < 1e-12);
        assert!((aco.mean_optimality.unwrap() - 1.15).abs() < 1e-12);
        // Only instance 0 was solved by everyone.
        assert_eq!(aco.sum_of_costs, Some(22.0));

        let fa = &stats[2];
        assert_eq!(fa.solved, 1);
        assert_eq!(fa.path_length.std, None);
        assert_eq!(fa.sum_of_costs, Some(20.0));
    }

    #[test]
    fn ties_share_a_win() {
        let rows = rows();
        let split = split_instances(&rows).unwrap();
        let wins = win_rates(&split.algorithms, &split.instances);

        // Instance 0: CHA and FA tie; instance 1: ACO; instance 2: nobody.
        assert_eq!(wins[0].algorithm, "ACO");
        assert_eq!(wins[0].wins, 1.0);
        assert!((wins[0].win_rate - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(wins[1].algorithm, "CHA");
        assert_eq!(wins[1].wins, 0.5);
        assert_eq!(wins[2].algorithm, "FA");
        assert!((wins[2].win_rate - 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn average_ranks_split_ties() {
        assert_eq!(average_ranks_of(&[5.0, 5.0, 5.0]), vec![2.0, 2.0, 2.0]);
        assert_eq!(
            average_ranks_of(&[f64::INFINITY, 3.0, f64::INFINITY, 1.0]),
            vec![3.5, 2.0, 3.5, 1.0]
        );
        assert!(average_ranks_of(&[]).is_empty());
    }

    #[test]
    fn rank_summary_per_algorithm() {
        let rows = rows();
        let split = split_instances(&rows).unwrap();
        let ranks = average_ranks(&split.instances);
        // ACO: 3, 1, 2; CHA: 1.5, 2, 2; FA: 1.5, 3, 2.
        assert_eq!(ranks[0].mean_rank, Some(2.0));
        assert_eq!(ranks[0].std_rank, Some(1.0));
        assert!((ranks[1].mean_rank.unwrap() - 5.5 / 3.0).abs() < 1e-12);
        assert!((ranks[2].mean_rank.unwrap() - 6.5 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn dominance_counts_strict_wins() {
        let rows = rows();
        let split = split_instances(&rows).unwrap();
        let matrix = dominance(&split.algorithms, &split.instances);

        assert_eq!(matrix.instances, 3);
        assert_eq!(matrix.count("CHA", "ACO"), Some(1));
        assert_eq!(matrix.count("ACO", "CHA"), Some(1));
        assert_eq!(matrix.count("ACO", "FA"), Some(1));
        assert_eq!(matrix.count("FA", "CHA"), Some(0));
        assert_eq!(matrix.count("FA", "FA"), Some(0));
        assert_eq!(matrix.count("PSO", "FA"), None);
        assert!((matrix.share(1, 2).unwrap() - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn rank_results_reports_gaps() {
        let mut rows = rows();
        rows.truncate(8);
        let results = ResultsLog { rows, dropped: 2 };
        let analysis = rank_results(&results).unwrap();

        assert_eq!(analysis.instances, 2);
        assert_eq!(analysis.report.count(Severity::Info), 1);
        let warning = &analysis.report.diagnostics[1];
        assert_eq!(warning.severity, Severity::Warning);
        assert_eq!(warning.details, vec!["instance 2"]);
        assert!(analysis.report.all_passed());
        assert_eq!(analysis.wins[0].algorithm, "ACO");
    }

    #[test]
    fn nothing_complete_is_a_failure() {
        let rows = vec![
            result("ACO", 20.0, true, 20.0),
            result("ACO", 22.0, true, 20.0),
            result("CHA", 0.0, false, 20.0),
        ];
        let analysis = rank_results(&ResultsLog { rows, dropped: 0 }).unwrap();
        assert_eq!(analysis.instances, 0);
        assert_eq!(analysis.report.failure_count(), 1);
        assert_eq!(analysis.report.count(Severity::Warning), 2);
        assert!(analysis.wins.iter().all(|w| w.win_rate == 0.0));
    }
}
