//! File-level tests: load logs from disk, analyze them and write the tables.

use std::fs;

use pathstat_analysis::{analyze, summarize_time_metrics};
use pathstat_model::{AlgorithmFamily, AnalysisConfig};
use pathstat_tables::{
    load_path, metrics_table, render, time_summary_table, write_table, Cell, Format, LoadError,
};

const LOG: &str = "\
Algorithm;Iteration;TimeMs;Manhattan;Fitness;BestPathLength
ACO;0;0,0;20;0,02;50
ACO;1;10,0;20;0,025;40
ACO;2;20,0;20;0,025;40
ACO;0;0,0;20;0,02;50
ACO;1;10,0;20;0,02;50
ACO;2;bad;20;0,02;50
";

#[test]
fn load_analyze_and_write() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("aco.csv");
    fs::write(&log_path, LOG).unwrap();

    let log = load_path(&log_path, "ACO", AlgorithmFamily::Aco).unwrap();
    assert_eq!(log.rows.len(), 5);
    assert_eq!(log.dropped, 1);

    let config = AnalysisConfig::default();
    let analysis = analyze(&log, &config).unwrap();
    assert_eq!(analysis.run_metrics.len(), 2);
    // First run: fitness repeats at iteration 2.
    assert_eq!(analysis.run_metrics[0].time_first_goal, Some(20.0));
    assert_eq!(analysis.run_metrics[0].time_first_optimal, 10.0);
    assert_eq!(analysis.run_metrics[0].improvement_count, 1);
    // Second run: fitness repeats at iteration 1 and never changes.
    assert_eq!(analysis.run_metrics[1].time_first_goal, Some(10.0));
    assert_eq!(analysis.run_metrics[1].time_first_optimal, 0.0);

    let table = metrics_table(&analysis.run_metrics, &config.thresholds);
    let out = dir.path().join("out").join("metrics.csv");
    write_table(&out, &table, Format::Csv).unwrap();
    let written = fs::read_to_string(&out).unwrap();
    let mut lines = written.lines();
    assert!(lines.next().unwrap().starts_with("Algorithm;RunId;Manhattan;"));
    assert_eq!(lines.count(), 2);

    let summaries = summarize_time_metrics(&analysis.run_metrics, config.timeout_ms);
    let summary = time_summary_table(&summaries, &config.thresholds);
    assert_eq!(summary.get(0, "mean_TimeFirstGoal"), Some(&Cell::Float(15.0)));
    assert_eq!(summary.get(0, "SuccessRate_opt_le_timeout"), Some(&Cell::Float(1.0)));
}

#[test]
fn json_output_matches_render() {
    let dir = tempfile::tempdir().unwrap();
    let mut table = pathstat_tables::Table::new(["TimeMs", "Mean"]);
    table.push(vec![Cell::Float(0.0), Cell::Missing]);

    let out = dir.path().join("curve.json");
    write_table(&out, &table, Format::Json).unwrap();
    assert_eq!(
        fs::read_to_string(&out).unwrap(),
        render(&table, Format::Json).unwrap()
    );
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_path(&dir.path().join("absent.csv"), "ACO", AlgorithmFamily::Aco).unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }));
}
