//! Run segmentation.
//!
//! A convergence log concatenates many independent optimizer runs. The
//! segmenter walks the rows in recorded order (never re-sorted) and asks a
//! [`RunBoundary`] predicate, for every consecutive pair, whether the second
//! row opens a new run. The first row always belongs to run 0.

use pathstat_model::{BoundaryKind, LogRow};
use tracing::debug;

/// Decides whether `current` opens a new run given the row recorded before it.
///
/// Any `Fn(&LogRow, &LogRow) -> bool` closure is a boundary predicate.
pub trait RunBoundary {
    /// Returns true if `current` is the first row of a new run.
    fn starts_new_run(&self, previous: &LogRow, current: &LogRow) -> bool;
}

impl<F> RunBoundary for F
where
    F: Fn(&LogRow, &LogRow) -> bool,
{
    fn starts_new_run(&self, previous: &LogRow, current: &LogRow) -> bool {
        self(previous, current)
    }
}

/// A run starts wherever elapsed time strictly decreases.
///
/// Assumes the logger resets elapsed time to roughly zero at the start of
/// every run. Equal consecutive times stay in the same run.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeReversal;

impl RunBoundary for TimeReversal {
    fn starts_new_run(&self, previous: &LogRow, current: &LogRow) -> bool {
        current.elapsed_ms < previous.elapsed_ms
    }
}

/// Time reversal, or a change of Manhattan distance between consecutive rows.
///
/// Splits back-to-back runs on different instances even when the timer
/// failed to reset.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstanceChange;

impl RunBoundary for InstanceChange {
    fn starts_new_run(&self, previous: &LogRow, current: &LogRow) -> bool {
        TimeReversal.starts_new_run(previous, current) || current.manhattan != previous.manhattan
    }
}

/// A run starts wherever the explicit `RunId` column changes.
///
/// Pairs where either row lacks a run id fall back to [`TimeReversal`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ExplicitRunId;

impl RunBoundary for ExplicitRunId {
    fn starts_new_run(&self, previous: &LogRow, current: &LogRow) -> bool {
        match (previous.run_hint, current.run_hint) {
            (Some(prev), Some(cur)) => prev != cur,
            _ => TimeReversal.starts_new_run(previous, current),
        }
    }
}

/// Returns the boundary predicate selected by a configuration value.
#[must_use]
pub fn boundary_for(kind: BoundaryKind) -> Box<dyn RunBoundary> {
    match kind {
        BoundaryKind::TimeReversal => Box::new(TimeReversal),
        BoundaryKind::InstanceChange => Box::new(InstanceChange),
        BoundaryKind::ExplicitRunId => Box::new(ExplicitRunId),
    }
}

/// A maximal contiguous block of rows sharing one run id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Run<'a> {
    /// Zero-based run identifier, in order of appearance.
    pub run_id: usize,
    /// The run's rows in recorded order.
    pub rows: &'a [LogRow],
}

impl Run<'_> {
    /// Manhattan distance of the run, taken from its earliest row by elapsed
    /// time (the first recorded one on ties).
    #[must_use]
    pub fn manhattan(&self) -> Option<f64> {
        self.rows
            .iter()
            .min_by(|a, b| a.elapsed_ms.total_cmp(&b.elapsed_ms))
            .map(|row| row.manhattan)
    }

    /// Distinct Manhattan distances found in the run, in order of appearance.
    ///
    /// More than one value means the run mixes problem instances.
    #[must_use]
    pub fn manhattan_values(&self) -> Vec<f64> {
        let mut values: Vec<f64> = Vec::new();
        for row in self.rows {
            if !values.contains(&row.manhattan) {
                values.push(row.manhattan);
            }
        }
        values
    }

    /// The run's rows sorted by elapsed time, ties kept in recorded order.
    #[must_use]
    pub fn rows_by_time(&self) -> Vec<&LogRow> {
        let mut rows: Vec<&LogRow> = self.rows.iter().collect();
        rows.sort_by(|a, b| a.elapsed_ms.total_cmp(&b.elapsed_ms));
        rows
    }
}

/// Assigns a run id to every row, aligned with the input order.
///
/// An empty input yields an empty column.
#[must_use]
pub fn assign_run_ids<B>(rows: &[LogRow], boundary: &B) -> Vec<usize>
where
    B: RunBoundary + ?Sized,
{
    let mut ids = Vec::with_capacity(rows.len());
    let mut run_id = 0usize;
    for (i, row) in rows.iter().enumerate() {
        if i > 0 && boundary.starts_new_run(&rows[i - 1], row) {
            run_id += 1;
        }
        ids.push(run_id);
    }
    ids
}

/// Splits rows into consecutive runs.
///
/// Every row lands in exactly one run; runs are returned in order and their
/// ids are `0, 1, 2, …`.
#[must_use]
pub fn segment<'a, B>(rows: &'a [LogRow], boundary: &B) -> Vec<Run<'a>>
where
    B: RunBoundary + ?Sized,
{
    let mut runs = Vec::new();
    let mut start = 0usize;
    for i in 1..rows.len() {
        if boundary.starts_new_run(&rows[i - 1], &rows[i]) {
            debug!(
                run_id = runs.len(),
                first_row = start,
                rows = i - start,
                "run boundary"
            );
            runs.push(Run {
                run_id: runs.len(),
                rows: &rows[start..i],
            });
            start = i;
        }
    }
    if start < rows.len() {
        runs.push(Run {
            run_id: runs.len(),
            rows: &rows[start..],
        });
    }
    runs
}
