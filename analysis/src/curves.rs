//! Convergence curves on a common time grid.
//!
//! Each run's optimality ratio is forward-filled onto a shared grid, turned
//! into an improvement percentage relative to its first known value, and
//! pooled with the other runs of the same instance range. Pooled curves hold
//! the grid-wise mean and median over runs, ignoring grid points a run had
//! not reached yet.

use pathstat_model::{
    AnalysisConfig, GridConfig, InstanceRange, LogRow, RangeBreakpoints, MAX_GRID_POINTS,
};
use serde::Serialize;

use crate::metrics::RunMetrics;
use crate::segment::Run;
use crate::summary::mean;

/// Slack added to the grid horizon so that a final point landing exactly on
/// it survives floating-point accumulation.
const GRID_TOLERANCE_MS: f64 = 0.1;

/// Builds the grid `0, dt, 2·dt, …` up to `min(max_time_ms, latest elapsed time)`.
///
/// An empty log yields an empty grid. The grid never holds more than
/// [`MAX_GRID_POINTS`] points.
#[must_use]
pub fn time_grid(rows: &[LogRow], grid: &GridConfig) -> Vec<f64> {
    let Some(latest) = rows.iter().map(|r| r.elapsed_ms).reduce(f64::max) else {
        return Vec::new();
    };
    let horizon = grid.max_time_ms.min(latest) + GRID_TOLERANCE_MS;
    (0u32..)
        .map(|i| f64::from(i) * grid.dt_ms)
        .take_while(|&t| t < horizon)
        .take(MAX_GRID_POINTS)
        .collect()
}

/// Forward-fills a run's optimality ratio onto the grid.
///
/// Each grid point takes the ratio of the last row recorded at or before it;
/// points before the run's first row are missing. `rows` must be sorted by
/// elapsed time.
#[must_use]
pub fn resample(rows: &[&LogRow], grid: &[f64]) -> Vec<Option<f64>> {
    let Some(manhattan) = rows.first().map(|r| r.manhattan) else {
        return vec![None; grid.len()];
    };
    let mut next = 0usize;
    let mut current = None;
    grid.iter()
        .map(|&t| {
            while next < rows.len() && rows[next].elapsed_ms <= t {
                current = Some(rows[next].best_path_length / manhattan);
                next += 1;
            }
            current
        })
        .collect()
}

/// Improvement in percent relative to the first present value:
/// `(first − r) / first × 100`.
///
/// Returns `None` if the series has no present value.
#[must_use]
pub fn improvement_percent(series: &[Option<f64>]) -> Option<Vec<Option<f64>>> {
    let first = series.iter().flatten().next().copied()?;
    Some(
        series
            .iter()
            .map(|v| v.map(|r| (first - r) / first * 100.0))
            .collect(),
    )
}

/// Median of the present values.
#[must_use]
pub fn median<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut present: Vec<f64> = values.into_iter().flatten().collect();
    if present.is_empty() {
        return None;
    }
    present.sort_by(f64::total_cmp);
    let mid = present.len() / 2;
    if present.len() % 2 == 1 {
        Some(present[mid])
    } else {
        Some((present[mid - 1] + present[mid]) / 2.0)
    }
}

/// Grid-wise mean and median curves of one instance range.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CurveSet {
    /// Mean optimality ratio per grid point.
    pub opt_ratio_mean: Vec<Option<f64>>,
    /// Median optimality ratio per grid point.
    pub opt_ratio_median: Vec<Option<f64>>,
    /// Mean improvement percentage per grid point.
    pub improvement_mean: Vec<Option<f64>>,
    /// Median improvement percentage per grid point.
    pub improvement_median: Vec<Option<f64>>,
}

/// Pooled curves of the runs falling into one instance range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeCurves {
    /// Instance range.
    pub range: InstanceRange,
    /// Number of runs pooled.
    pub runs: usize,
    /// Pooled curves; `None` when no run fell into the range.
    pub curves: Option<CurveSet>,
}

/// Convergence curves of one algorithm.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvergenceCurves {
    /// Algorithm label.
    pub algorithm: String,
    /// Shared time grid, in milliseconds.
    pub grid: Vec<f64>,
    /// One entry per range, in [`InstanceRange::ALL`] order.
    pub ranges: Vec<RangeCurves>,
}

impl ConvergenceCurves {
    /// Curves of one range.
    #[must_use]
    pub fn range(&self, range: InstanceRange) -> Option<&RangeCurves> {
        self.ranges.iter().find(|r| r.range == range)
    }
}

/// Builds the convergence curves of one algorithm.
///
/// The grid spans the whole log; runs are classified by the Manhattan
/// distance of their earliest row.
#[must_use]
pub fn build_curves(
    algorithm: &str,
    rows: &[LogRow],
    runs: &[Run<'_>],
    config: &AnalysisConfig,
) -> ConvergenceCurves {
    let grid = time_grid(rows, &config.grid);

    let mut opt: Vec<(InstanceRange, Vec<Option<f64>>)> = Vec::new();
    let mut imp: Vec<(InstanceRange, Vec<Option<f64>>)> = Vec::new();
    for run in runs {
        let Some(manhattan) = run.manhattan() else {
            continue;
        };
        let range = config.ranges.classify(manhattan);
        let sorted = run.rows_by_time();
        let series = resample(&sorted, &grid);
        let Some(improvement) = improvement_percent(&series) else {
            continue;
        };
        opt.push((range, series));
        imp.push((range, improvement));
    }

    let ranges = InstanceRange::ALL
        .iter()
        .map(|&range| {
            let opt_in: Vec<&Vec<Option<f64>>> =
                opt.iter().filter(|(r, _)| *r == range).map(|(_, s)| s).collect();
            let imp_in: Vec<&Vec<Option<f64>>> =
                imp.iter().filter(|(r, _)| *r == range).map(|(_, s)| s).collect();
            let curves = (!opt_in.is_empty()).then(|| CurveSet {
                opt_ratio_mean: pointwise(&opt_in, grid.len(), |v| mean(v)),
                opt_ratio_median: pointwise(&opt_in, grid.len(), |v| median(v)),
                improvement_mean: pointwise(&imp_in, grid.len(), |v| mean(v)),
                improvement_median: pointwise(&imp_in, grid.len(), |v| median(v)),
            });
            RangeCurves {
                range,
                runs: opt_in.len(),
                curves,
            }
        })
        .collect();

    ConvergenceCurves {
        algorithm: algorithm.to_owned(),
        grid,
        ranges,
    }
}

fn pointwise<F>(series: &[&Vec<Option<f64>>], len: usize, stat: F) -> Vec<Option<f64>>
where
    F: Fn(Vec<Option<f64>>) -> Option<f64>,
{
    (0..len)
        .map(|i| stat(series.iter().map(|s| s[i]).collect()))
        .collect()
}

/// What a [`ProgressMark`] marks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarkKind {
    /// Mean time to the goal condition of the range's runs.
    Goal,
    /// Fraction of the way from the starting ratio to the best ratio.
    Progress(f64),
}

/// A point on a mean convergence curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressMark {
    /// What the point marks.
    pub kind: MarkKind,
    /// Grid time of the point.
    pub time_ms: f64,
    /// Mean optimality ratio at that time.
    pub opt_ratio: f64,
}

/// Relative and absolute tolerance for "reached the best ratio".
const BEST_RTOL: f64 = 1e-4;
const BEST_ATOL: f64 = 1e-6;

/// Marks progress levels on a mean optimality-ratio curve.
///
/// Only the span between the first and last present points is considered.
/// For a level `p < 1` the mark is the first point with
/// `ratio <= start − p·(start − best)`; for `p = 1` it is the first point
/// within tolerance of the best ratio. Nothing is marked unless the curve
/// improved (`start > best`).
#[must_use]
pub fn progress_marks(grid: &[f64], mean_curve: &[Option<f64>], levels: &[f64]) -> Vec<ProgressMark> {
    let Some((first, last)) = present_span(mean_curve) else {
        return Vec::new();
    };
    let span = &mean_curve[first..=last];
    let times = &grid[first..=last];
    let start = span[0].unwrap_or(f64::NAN);
    let best = span.iter().flatten().copied().fold(f64::INFINITY, f64::min);
    if start.is_nan() || start <= best {
        return Vec::new();
    }

    let reached_best = span
        .iter()
        .position(|v| v.is_some_and(|r| (r - best).abs() <= BEST_ATOL + BEST_RTOL * best.abs()))
        .unwrap_or(span.len() - 1);

    levels
        .iter()
        .filter_map(|&level| {
            let idx = if level < 1.0 {
                let target = start - level * (start - best);
                span.iter().position(|v| v.is_some_and(|r| r <= target))?
            } else {
                reached_best
            };
            Some(ProgressMark {
                kind: MarkKind::Progress(level),
                time_ms: times[idx],
                opt_ratio: span[idx]?,
            })
        })
        .collect()
}

/// Marks the mean goal time of the runs in `range` on its mean curve.
///
/// The mark sits on the grid point nearest to the mean goal time. Returns
/// `None` when no run in the range reached its goal or the curve is empty.
#[must_use]
pub fn goal_mark(
    grid: &[f64],
    mean_curve: &[Option<f64>],
    per_run: &[RunMetrics],
    ranges: &RangeBreakpoints,
    range: InstanceRange,
) -> Option<ProgressMark> {
    let goal_time = mean(
        per_run
            .iter()
            .filter(|m| ranges.classify(m.manhattan) == range)
            .map(|m| m.time_first_goal),
    )?;
    let (first, last) = present_span(mean_curve)?;
    let idx = (first..=last).min_by(|&a, &b| {
        (grid[a] - goal_time)
            .abs()
            .total_cmp(&(grid[b] - goal_time).abs())
    })?;
    Some(ProgressMark {
        kind: MarkKind::Goal,
        time_ms: grid[idx],
        opt_ratio: mean_curve[idx]?,
    })
}

fn present_span(curve: &[Option<f64>]) -> Option<(usize, usize)> {
    let first = curve.iter().position(Option::is_some)?;
    let last = curve.iter().rposition(Option::is_some)?;
    Some((first, last))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::fixtures::row;
    use crate::segment::{segment, TimeReversal};

    fn grid_config(dt_ms: f64, max_time_ms: f64) -> GridConfig {
        GridConfig { dt_ms, max_time_ms }
    }

    #[test]
    fn grid_stops_at_latest_time_inclusive() {
        let rows = vec![row(0, 0.0, 10.0, 1.0, 10.0), row(1, 100.0, 10.0, 1.0, 10.0)];
        let grid = time_grid(&rows, &grid_config(50.0, 1000.0));
        assert_eq!(grid, vec![0.0, 50.0, 100.0]);
    }

    #[test]
    fn grid_is_capped_by_max_time() {
        let rows = vec![row(0, 0.0, 10.0, 1.0, 10.0), row(1, 5000.0, 10.0, 1.0, 10.0)];
        let grid = time_grid(&rows, &grid_config(250.0, 1000.0));
        assert_eq!(grid, vec![0.0, 250.0, 500.0, 750.0, 1000.0]);
        assert!(time_grid(&[], &grid_config(50.0, 1000.0)).is_empty());
    }

    #[test]
    fn dense_grid_is_bounded() {
        let rows = vec![row(0, 0.0, 10.0, 1.0, 10.0), row(1, 1000.0, 10.0, 1.0, 10.0)];
        let grid = time_grid(&rows, &grid_config(1e-9, 1000.0));
        assert_eq!(grid.len(), MAX_GRID_POINTS);
    }

    #[test]
    fn resample_forward_fills() {
        let rows = [row(0, 5.0, 10.0, 1.0, 30.0), row(1, 20.0, 10.0, 1.0, 20.0)];
        let refs: Vec<&LogRow> = rows.iter().collect();
        let series = resample(&refs, &[0.0, 10.0, 20.0, 30.0]);
        assert_eq!(series, vec![None, Some(3.0), Some(2.0), Some(2.0)]);
    }

    #[test]
    fn improvement_is_relative_to_first_present_value() {
        let series = [None, Some(4.0), Some(3.0), Some(2.0)];
        let imp = improvement_percent(&series).unwrap();
        assert_eq!(imp, vec![None, Some(0.0), Some(25.0), Some(50.0)]);
        assert!(improvement_percent(&[None, None]).is_none());
    }

    #[test]
    fn median_handles_even_and_odd_counts() {
        assert_eq!(median([Some(3.0), Some(1.0), Some(2.0)]), Some(2.0));
        assert_eq!(median([Some(4.0), None, Some(1.0), Some(2.0), Some(3.0)]), Some(2.5));
        assert_eq!(median([None]), None);
    }

    #[test]
    fn curves_pool_runs_by_range() {
        // Two short runs (manhattan 10) and one long run (manhattan 100).
        let rows = vec![
            row(0, 0.0, 10.0, 1.0, 20.0),
            row(1, 50.0, 10.0, 1.0, 10.0),
            row(0, 0.0, 10.0, 1.0, 30.0),
            row(1, 50.0, 10.0, 1.0, 20.0),
            row(0, 0.0, 100.0, 1.0, 150.0),
        ];
        let runs = segment(&rows, &TimeReversal);
        assert_eq!(runs.len(), 3);

        let config = AnalysisConfig {
            grid: grid_config(50.0, 1000.0),
            ..AnalysisConfig::default()
        };
        let curves = build_curves("ACO", &rows, &runs, &config);
        assert_eq!(curves.grid, vec![0.0, 50.0]);

        let short = curves.range(InstanceRange::Short).unwrap();
        assert_eq!(short.runs, 2);
        let set = short.curves.as_ref().unwrap();
        assert_eq!(set.opt_ratio_mean, vec![Some(2.5), Some(1.5)]);
        assert_eq!(set.opt_ratio_median, vec![Some(2.5), Some(1.5)]);
        // Improvements: run 0 → 0%, 50%; run 1 → 0%, 33.3%.
        let imp = set.improvement_mean[1].unwrap();
        assert!((imp - (50.0 + 100.0 / 3.0) / 2.0).abs() < 1e-9);

        let medium = curves.range(InstanceRange::Medium).unwrap();
        assert_eq!(medium.runs, 0);
        assert!(medium.curves.is_none());

        let long = curves.range(InstanceRange::Long).unwrap();
        assert_eq!(long.curves.as_ref().unwrap().opt_ratio_mean, vec![Some(1.5), Some(1.5)]);
    }

    #[test]
    fn progress_marks_follow_levels() {
        let grid = [0.0, 10.0, 20.0, 30.0, 40.0];
        let curve = [None, Some(3.0), Some(2.0), Some(1.5), Some(1.0)];
        let marks = progress_marks(&grid, &curve, &[0.25, 0.5, 1.0]);
        let times: Vec<f64> = marks.iter().map(|m| m.time_ms).collect();
        // Targets: 2.5, 2.0, best 1.0.
        assert_eq!(times, vec![20.0, 20.0, 40.0]);
        assert_eq!(marks[2].kind, MarkKind::Progress(1.0));
        assert_eq!(marks[2].opt_ratio, 1.0);
    }

    #[test]
    fn flat_curve_has_no_progress_marks() {
        let grid = [0.0, 10.0];
        assert!(progress_marks(&grid, &[Some(1.0), Some(1.0)], &[0.5]).is_empty());
        assert!(progress_marks(&grid, &[None, None], &[0.5]).is_empty());
    }

    #[test]
    fn goal_mark_uses_nearest_grid_point() {
        let grid = [0.0, 50.0, 100.0];
        let curve = [Some(2.0), Some(1.5), Some(1.2)];
        let mut metrics = Vec::new();
        for goal in [Some(40.0), Some(80.0), None] {
            metrics.push(RunMetrics {
                algorithm: "ACO".to_owned(),
                run_id: metrics.len(),
                manhattan: 10.0,
                improvement_count: 0,
                final_optimality_ratio: 1.2,
                time_first_goal: goal,
                time_first_optimal: 100.0,
                time_first_goal_norm: None,
                time_first_optimal_norm: 10.0,
                iter_first_goal: None,
                iter_first_optimal: None,
                iter_first_goal_norm: None,
                iter_first_optimal_norm: None,
                thresholds: Vec::new(),
            });
        }
        let ranges = RangeBreakpoints::default();
        let mark = goal_mark(&grid, &curve, &metrics, &ranges, InstanceRange::Short).unwrap();
        assert_eq!(mark.kind, MarkKind::Goal);
        assert_eq!(mark.time_ms, 50.0);
        assert_eq!(mark.opt_ratio, 1.5);
        assert!(goal_mark(&grid, &curve, &metrics, &ranges, InstanceRange::Long).is_none());
    }
}
