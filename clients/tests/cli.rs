//! End-to-end runs of the client binaries on small logs.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const ACO_LOG: &str = "\
Algorithm;Iteration;TimeMs;Manhattan;Fitness;BestPathLength
ACO;0;0,0;20;0,02;50
ACO;1;10,0;20;0,025;40
ACO;2;20,0;20;0,025;40
ACO;0;0,0;20;0,02;50
ACO;1;bad;20;0,02;50
";

fn run(exe: &str, dir: &Path, args: &[&str]) -> Output {
    let output = Command::new(exe)
        .current_dir(dir)
        .args(args)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "{exe} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    output
}

#[test]
fn json_metrics_on_stdout_stay_parseable() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("aco.csv"), ACO_LOG).unwrap();

    let output = run(
        env!("CARGO_BIN_EXE_pathstat-metrics"),
        dir.path(),
        &["--log", "ACO=aco.csv", "--format", "json"],
    );

    let stdout = String::from_utf8(output.stdout).unwrap();
    let document: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(document["metrics"]["rows"].as_array().unwrap().len(), 2);
    assert!(document["time_summary"]["columns"].is_array());

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Time summary"));
    assert!(stderr.contains("[INFO] ACO: 1 row(s) dropped as malformed"));
    assert!(stderr.contains("Summary: 1 notes, 0 warnings, 0 failures"));
}

#[test]
fn csv_metrics_keep_the_report_on_stdout() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("aco.csv"), ACO_LOG).unwrap();

    let output = run(
        env!("CARGO_BIN_EXE_pathstat-metrics"),
        dir.path(),
        &["--log", "ACO=aco.csv"],
    );

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("Algorithm;RunId;"));
    assert!(stdout.contains("Time summary"));
    assert!(stdout.contains("Summary: 1 notes, 0 warnings, 0 failures"));
}

const RESULTS: &str = "\
Algorithm;TimeMs;PathLength;Rotations;Success;Step;Manhattan
ACO;12,50;22;2;True;0;20
Camel;3,10;20;1;True;0;20
ACO;15,00;30;4;True;1;25
Camel;4,20;0;0;False;1;25
";

#[test]
fn rank_writes_every_table() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("results.csv"), RESULTS).unwrap();

    let output = run(
        env!("CARGO_BIN_EXE_pathstat-rank"),
        dir.path(),
        &["--results", "results.csv", "--out-dir", "tables"],
    );
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Wrote 6 table(s) over 2 instance(s)"));

    let wins = fs::read_to_string(dir.path().join("tables/win_rate.csv")).unwrap();
    assert_eq!(wins, "Algorithm;WinCountWeighted;WinRate\nACO;1;0.5\nCamel;1;0.5\n");
    let dominance = fs::read_to_string(dir.path().join("tables/dominance_counts.csv")).unwrap();
    assert_eq!(dominance, "Algorithm;ACO;Camel\nACO;0;1\nCamel;1;0\n");
    assert!(dir.path().join("tables/path_stats.csv").exists());
}

#[test]
fn rank_json_on_stdout_stays_parseable() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("results.csv"), RESULTS).unwrap();

    let output = run(
        env!("CARGO_BIN_EXE_pathstat-rank"),
        dir.path(),
        &["--results", "results.csv", "--format", "json"],
    );
    let stdout = String::from_utf8(output.stdout).unwrap();
    let document: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(document["success"]["rows"][1][3], 50.0);
    assert!(document["report"]["diagnostics"].as_array().unwrap().is_empty());

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Summary: 0 notes, 0 warnings, 0 failures"));
}

#[test]
fn curves_write_one_table_pair_per_populated_range() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("aco.csv"), ACO_LOG).unwrap();

    run(
        env!("CARGO_BIN_EXE_pathstat-curves"),
        dir.path(),
        &["--log", "ACO=aco.csv", "--out-dir", "curves"],
    );
    assert!(dir.path().join("curves/ACO_short_opt.csv").exists());
    assert!(dir.path().join("curves/ACO_short_imp.csv").exists());
    assert!(!dir.path().join("curves/ACO_long_opt.csv").exists());
}
