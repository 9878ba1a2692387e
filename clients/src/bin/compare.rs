//! `pathstat-compare`: Compares algorithms by the final state of their runs.
//!
//! For every algorithm: number of runs, and mean, standard deviation, minimum
//! and maximum of convergence time, final best path length, final fitness
//! and iteration count, rounded to three decimals.
//!
//! With `--ranges-out`, also writes how each algorithm's runs spread over
//! the short, medium and long instance ranges.
//!
//! **Usage:**
//! ```
//! pathstat-compare --log ACO=aco.csv --log CHA=cha.csv [--out comparison.csv]
//!                  [--runs-out runs.csv] [--ranges-out ranges.csv]
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use pathstat_analysis::{compare_algorithms, RangeShare, RunSummary};
use pathstat_clients::{analyze_logs, init_tracing, load_config, print_report, LogSpec};
use pathstat_tables::{
    comparison_table, range_share_table, render, run_summary_table, write_table, Format,
};

/// Compare algorithms by their final run states.
#[derive(Parser)]
#[command(name = "pathstat-compare", about = "Compare algorithms by their final run states")]
struct Args {
    /// Log to analyze, as LABEL=PATH (repeatable).
    #[arg(long = "log", required = true)]
    logs: Vec<LogSpec>,

    /// TOML analysis configuration.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output file for the comparison table (default: stdout).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Also write the per-run summary table to this file.
    #[arg(long)]
    runs_out: Option<PathBuf>,

    /// Also write the runs-per-instance-range table to this file.
    #[arg(long)]
    ranges_out: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = load_config(args.config.as_deref(), &[])?;
    let analyses = analyze_logs(&args.logs, &config)?;

    let runs: Vec<RunSummary> = analyses
        .iter()
        .flat_map(|a| a.run_summaries.iter().cloned())
        .collect();
    let comparison = comparison_table(&compare_algorithms(&runs));

    match &args.out {
        Some(path) => {
            write_table(path, &comparison, Format::Csv)
                .with_context(|| format!("Failed to write comparison: {}", path.display()))?;
            println!("Wrote {} algorithm(s) to {}", comparison.rows.len(), path.display());
        }
        None => print!("{}", render(&comparison, Format::Csv)?),
    }
    if let Some(path) = &args.runs_out {
        write_table(path, &run_summary_table(&runs), Format::Csv)
            .with_context(|| format!("Failed to write run summaries: {}", path.display()))?;
        println!("Wrote {} run(s) to {}", runs.len(), path.display());
    }
    if let Some(path) = &args.ranges_out {
        let shares: Vec<RangeShare> = analyses.iter().map(|a| a.range_share.clone()).collect();
        write_table(path, &range_share_table(&shares), Format::Csv)
            .with_context(|| format!("Failed to write range shares: {}", path.display()))?;
        println!("Wrote {} algorithm(s) to {}", shares.len(), path.display());
    }

    println!();
    print_report(&analyses)?;
    Ok(())
}
