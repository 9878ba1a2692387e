//! `pathstat-curves`: Convergence curves by instance range.
//!
//! **Outputs**, per algorithm and range with at least one run:
//! - `<out-dir>/<label>_<range>_opt.csv`: mean and median optimality ratio
//! - `<out-dir>/<label>_<range>_imp.csv`: mean and median improvement (%)
//!
//! Goal and progress marks of each mean optimality-ratio curve are printed
//! to stdout.
//!
//! **Usage:**
//! ```
//! pathstat-curves --log ACO=aco.csv --log CHA=cha.csv --out-dir curves/ [--config analysis.toml]
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
use pathstat_analysis::{goal_mark, progress_marks, MarkKind};
use pathstat_model::InstanceRange;
use pathstat_clients::{analyze_logs, init_tracing, load_config, print_report, LogSpec};
use pathstat_tables::{improvement_table, opt_ratio_table, write_table, Format};

/// Build convergence curves by instance range.
#[derive(Parser)]
#[command(name = "pathstat-curves", about = "Build convergence curves by instance range")]
struct Args {
    /// Log to analyze, as LABEL=PATH (repeatable).
    #[arg(long = "log", required = true)]
    logs: Vec<LogSpec>,

    /// Output directory for the curve tables.
    #[arg(long)]
    out_dir: PathBuf,

    /// TOML analysis configuration.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = load_config(args.config.as_deref(), &[])?;
    let analyses = analyze_logs(&args.logs, &config)?;

    let mut written = 0usize;
    for analysis in &analyses {
        let curves = &analysis.curves;
        for range in InstanceRange::ALL.iter().filter_map(|&r| curves.range(r)) {
            let Some(set) = &range.curves else {
                println!("{} {}: no runs", analysis.algorithm, range.range.as_str());
                continue;
            };
            let stem = format!("{}_{}", analysis.algorithm, range.range.as_str());
            for (suffix, table) in [
                ("opt", opt_ratio_table(&curves.grid, set)),
                ("imp", improvement_table(&curves.grid, set)),
            ] {
                let path = args.out_dir.join(format!("{stem}_{suffix}.csv"));
                write_table(&path, &table, Format::Csv)
                    .with_context(|| format!("Failed to write curve: {}", path.display()))?;
                written += 1;
            }

            println!(
                "{} {} ({} run(s)):",
                analysis.algorithm,
                range.range.as_str(),
                range.runs
            );
            let goal = goal_mark(
                &curves.grid,
                &set.opt_ratio_mean,
                &analysis.run_metrics,
                &config.ranges,
                range.range,
            );
            let marks = progress_marks(&curves.grid, &set.opt_ratio_mean, &config.progress_levels);
            for mark in goal.iter().chain(&marks) {
                let label = match mark.kind {
                    MarkKind::Goal => "goal".to_owned(),
                    MarkKind::Progress(level) => format!("{:.0}%", level * 100.0),
                };
                println!(
                    "  {label:>5} at {:>7.1} ms  ratio {:.4}",
                    mark.time_ms, mark.opt_ratio
                );
            }
        }
    }

    println!("Wrote {written} curve table(s) to {}", args.out_dir.display());
    println!();
    print_report(&analyses)?;
    Ok(())
}
