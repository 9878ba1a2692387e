//! `pathstat-metrics`: Per-run convergence metrics for one or more optimizer logs.
//!
//! **Outputs:**
//! - the per-run metrics table (CSV or JSON) to `--out`, or stdout
//! - the per-algorithm time summary and the diagnostics report on stdout,
//!   or on stderr when a JSON document is written to stdout
//!
//! **Usage:**
//! ```
//! pathstat-metrics --log ACO=aco.csv --log CHA=cha.csv [--k 1.5 --k 1.1]
//!                  [--config analysis.toml] [--out metrics.csv] [--format csv|json]
//! ```
//!
//! Exits non-zero if any log produced a failure diagnostic.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use pathstat_analysis::{summarize_time_metrics, RunMetrics};
use pathstat_clients::{
    analyze_logs, init_tracing, load_config, merged_report, write_report, LogSpec,
};
use pathstat_tables::{metrics_table, render, time_summary_table, write_text, Format};
use serde_json::Map;

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

/// Compute per-run convergence metrics.
#[derive(Parser)]
#[command(name = "pathstat-metrics", about = "Compute per-run convergence metrics")]
struct Args {
    /// Log to analyze, as LABEL=PATH (repeatable).
    #[arg(long = "log", required = true)]
    logs: Vec<LogSpec>,

    /// Relative threshold k (repeatable); replaces the configured thresholds.
    #[arg(long = "k")]
    ks: Vec<f64>,

    /// TOML analysis configuration.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output file for the metrics table (default: stdout).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value = "csv")]
    format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = load_config(args.config.as_deref(), &args.ks)?;
    let analyses = analyze_logs(&args.logs, &config)?;

    let per_run: Vec<RunMetrics> = analyses
        .iter()
        .flat_map(|a| a.run_metrics.iter().cloned())
        .collect();
    let metrics = metrics_table(&per_run, &config.thresholds);
    let summaries = summarize_time_metrics(&per_run, config.timeout_ms);
    let summary = time_summary_table(&summaries, &config.thresholds);

    let content = match args.format {
        OutputFormat::Csv => render(&metrics, Format::Csv)?,
        OutputFormat::Json => {
            let reports: Vec<_> = analyses.iter().map(|a| &a.report).collect();
            let mut document = Map::new();
            document.insert("metrics".to_owned(), serde_json::to_value(&metrics)?);
            document.insert("time_summary".to_owned(), serde_json::to_value(&summary)?);
            document.insert("reports".to_owned(), serde_json::to_value(&reports)?);
            let mut text = serde_json::to_string_pretty(&document)?;
            text.push('\n');
            text
        }
    };
    // A JSON document on stdout must stay parseable on its own.
    let json_on_stdout = matches!(args.format, OutputFormat::Json) && args.out.is_none();
    let mut human: Box<dyn Write> = if json_on_stdout {
        Box::new(io::stderr().lock())
    } else {
        Box::new(io::stdout().lock())
    };

    match &args.out {
        Some(path) => {
            write_text(path, &content)
                .with_context(|| format!("Failed to write metrics: {}", path.display()))?;
            writeln!(human, "Wrote {} run(s) to {}", per_run.len(), path.display())?;
        }
        None => print!("{content}"),
    }

    writeln!(human)?;
    writeln!(human, "Time summary")?;
    writeln!(human, "============")?;
    write!(human, "{}", render(&summary, Format::Csv)?)?;
    writeln!(human)?;

    let failed = write_report(&mut human, &merged_report(&analyses))?;
    human.flush()?;
    if failed > 0 {
        eprintln!("Analysis FAILED: {failed} log(s) could not be analyzed as intended.");
        process::exit(1);
    }
    Ok(())
}
