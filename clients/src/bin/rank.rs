//! `pathstat-rank`: Compares algorithms on a shared results file.
//!
//! **Outputs**, written to `--out-dir` or printed to stdout:
//! - `success.csv`: success rate per algorithm
//! - `path_stats.csv`: path length, optimality and excess over solved attempts
//! - `win_rate.csv`: weighted wins per instance, ties shared
//! - `ranks.csv`: mean per-instance rank, ties averaged
//! - `dominance_counts.csv` / `dominance_share.csv`: pairwise dominance
//!
//! The diagnostics report follows on stdout, or on stderr when a JSON
//! document is printed.
//!
//! **Usage:**
//! ```
//! pathstat-rank --results AlgorithmResults.csv [--out-dir tables/] [--format csv|json]
//! ```
//!
//! Exits non-zero if the file holds no complete instance.

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
use pathstat_analysis::rank_results;
use pathstat_clients::{init_tracing, write_report};
use pathstat_tables::{
    dominance_count_table, dominance_share_table, load_results_path, path_stats_table,
    rank_table, render, success_table, win_rate_table, write_table, Format, Table,
};
use serde_json::Map;

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

/// Rank algorithms on a shared results file.
#[derive(Parser)]
#[command(name = "pathstat-rank", about = "Rank algorithms on a shared results file")]
struct Args {
    /// Results file with one row per attempt.
    #[arg(long)]
    results: PathBuf,

    /// Output directory for the tables (default: stdout).
    #[arg(long)]
    out_dir: Option<PathBuf>,

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

    let results = load_results_path(&args.results)
        .with_context(|| format!("Failed to load results: {}", args.results.display()))?;
    let analysis = rank_results(&results).context("Failed to rank results")?;

    let tables: [(&str, Table); 6] = [
        ("success", success_table(&analysis.success)),
        ("path_stats", path_stats_table(&analysis.paths)),
        ("win_rate", win_rate_table(&analysis.wins)),
        ("ranks", rank_table(&analysis.ranks)),
        ("dominance_counts", dominance_count_table(&analysis.dominance)),
        ("dominance_share", dominance_share_table(&analysis.dominance)),
    ];
    let (format, extension) = match args.format {
        OutputFormat::Csv => (Format::Csv, "csv"),
        OutputFormat::Json => (Format::Json, "json"),
    };

    let json_on_stdout = matches!(args.format, OutputFormat::Json) && args.out_dir.is_none();
    let mut human: Box<dyn Write> = if json_on_stdout {
        Box::new(io::stderr().lock())
    } else {
        Box::new(io::stdout().lock())
    };

    match &args.out_dir {
        Some(dir) => {
            for (name, table) in &tables {
                let path = dir.join(format!("{name}.{extension}"));
                write_table(&path, table, format)
                    .with_context(|| format!("Failed to write table: {}", path.display()))?;
            }
            writeln!(
                human,
                "Wrote {} table(s) over {} instance(s) to {}",
                tables.len(),
                analysis.instances,
                dir.display()
            )?;
        }
        None if json_on_stdout => {
            let mut document = Map::new();
            for (name, table) in &tables {
                document.insert((*name).to_owned(), serde_json::to_value(table)?);
            }
            document.insert("report".to_owned(), serde_json::to_value(&analysis.report)?);
            let mut text = serde_json::to_string_pretty(&document)?;
            text.push('\n');
            print!("{text}");
        }
        None => {
            for (name, table) in &tables {
                writeln!(human, "{name}")?;
                writeln!(human, "{}", "=".repeat(name.len()))?;
                write!(human, "{}", render(table, Format::Csv)?)?;
                writeln!(human)?;
            }
        }
    }

    let failed = write_report(&mut human, &analysis.report)?;
    human.flush()?;
    if failed > 0 {
        eprintln!("Ranking FAILED: the results file could not be ranked as intended.");
        process::exit(1);
    }
    Ok(())
}
