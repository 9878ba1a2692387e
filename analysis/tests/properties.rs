//! Property-based tests for run segmentation and per-run metrics.
//!
//! Logs are generated as sequences of (elapsed time, best length, fitness)
//! rows over a single instance; the properties hold for any such log.

use pathstat_analysis::segment::assign_run_ids;
use pathstat_analysis::{segment, MetricsCalculator, TimeReversal};
use pathstat_model::{AlgorithmFamily, GoalPolicy, LogRow};
use proptest::prelude::*;

fn row(iteration: u64, elapsed_ms: f64, best: f64, fitness: f64) -> LogRow {
    LogRow {
        algorithm: "ACO".to_owned(),
        iteration: Some(iteration),
        elapsed_ms,
        manhattan: 20.0,
        fitness,
        best_path_length: best,
        run_hint: None,
    }
}

fn arb_rows() -> impl Strategy<Value = Vec<LogRow>> {
    prop::collection::vec((0u32..500, 20u32..200, 0u32..5), 0..60).prop_map(|cells| {
        cells
            .into_iter()
            .enumerate()
            .map(|(i, (t, best, fit))| {
                row(i as u64, f64::from(t), f64::from(best), f64::from(fit))
            })
            .collect()
    })
}

fn arb_monotone_rows() -> impl Strategy<Value = Vec<LogRow>> {
    prop::collection::vec((0u32..50, 20u32..200, 0u32..5), 1..60).prop_map(|cells| {
        let mut elapsed = 0.0;
        cells
            .into_iter()
            .enumerate()
            .map(|(i, (step, best, fit))| {
                elapsed += f64::from(step);
                row(i as u64, elapsed, f64::from(best), f64::from(fit))
            })
            .collect()
    })
}

// =============================================================================
// Segmentation
// =============================================================================

proptest! {
    /// Segmenting twice yields the same ids.
    #[test]
    fn prop_segmentation_is_deterministic(rows in arb_rows()) {
        prop_assert_eq!(assign_run_ids(&rows, &TimeReversal), assign_run_ids(&rows, &TimeReversal));
    }

    /// Ids start at 0 and grow by at most one per row.
    #[test]
    fn prop_ids_start_at_zero_and_step_by_one(rows in arb_rows()) {
        let ids = assign_run_ids(&rows, &TimeReversal);
        prop_assert_eq!(ids.len(), rows.len());
        if let Some(&first) = ids.first() {
            prop_assert_eq!(first, 0);
        }
        for pair in ids.windows(2) {
            prop_assert!(pair[1] == pair[0] || pair[1] == pair[0] + 1);
        }
    }

    /// The id grows exactly where elapsed time goes backwards.
    #[test]
    fn prop_new_run_iff_time_decreases(rows in arb_rows()) {
        let ids = assign_run_ids(&rows, &TimeReversal);
        for i in 1..rows.len() {
            let reversed = rows[i].elapsed_ms < rows[i - 1].elapsed_ms;
            prop_assert_eq!(ids[i] != ids[i - 1], reversed);
        }
    }

    /// Non-decreasing time is a single run.
    #[test]
    fn prop_monotone_log_is_one_run(rows in arb_monotone_rows()) {
        let runs = segment(&rows, &TimeReversal);
        prop_assert_eq!(runs.len(), 1);
        prop_assert_eq!(runs[0].rows.len(), rows.len());
    }

    /// Runs partition the rows in order.
    #[test]
    fn prop_runs_partition_rows(rows in arb_rows()) {
        let runs = segment(&rows, &TimeReversal);
        let total: usize = runs.iter().map(|r| r.rows.len()).sum();
        prop_assert_eq!(total, rows.len());
        for (i, run) in runs.iter().enumerate() {
            prop_assert_eq!(run.run_id, i);
            prop_assert!(!run.rows.is_empty());
        }
    }
}

// =============================================================================
// Metrics
// =============================================================================

proptest! {
    /// Every run has an optimal time, and a larger k is crossed no later.
    #[test]
    fn prop_optimal_present_and_k_monotone(rows in arb_rows()) {
        let policy = GoalPolicy::default();
        let ks = [1.1, 1.2, 1.5];
        let calc = MetricsCalculator::new("ACO", AlgorithmFamily::Aco, &policy, &ks).unwrap();
        let runs = segment(&rows, &TimeReversal);
        for metrics in calc.compute_all(&runs).unwrap() {
            prop_assert!(metrics.time_first_optimal.is_finite());
            prop_assert!(metrics.iter_first_optimal.is_some());

            // Every k >= 1 is crossed, at the latest by the final row.
            let times: Vec<f64> = metrics.thresholds.iter().map(|t| t.time_ms.unwrap()).collect();
            prop_assert!(times[0] >= times[1]);
            prop_assert!(times[1] >= times[2]);
        }
    }

    /// Normalized values are the base values divided by the Manhattan distance.
    #[test]
    fn prop_normalization_is_consistent(rows in arb_rows()) {
        let policy = GoalPolicy::default();
        let calc = MetricsCalculator::new("ACO", AlgorithmFamily::Aco, &policy, &[1.5]).unwrap();
        let runs = segment(&rows, &TimeReversal);
        for metrics in calc.compute_all(&runs).unwrap() {
            prop_assert_eq!(
                metrics.time_first_optimal_norm,
                metrics.time_first_optimal / metrics.manhattan
            );
            prop_assert_eq!(
                metrics.time_first_goal_norm,
                metrics.time_first_goal.map(|t| t / metrics.manhattan)
            );
            prop_assert_eq!(metrics.time_first_goal.is_some(), metrics.iter_first_goal.is_some());
        }
    }
}
