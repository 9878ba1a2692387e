//! Shared plumbing for the pathstat client binaries: log arguments,
//! configuration, tracing setup and the printed diagnostics report.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use pathstat_analysis::{analyze, AlgorithmAnalysis, AnalysisReport, Severity};
use pathstat_model::AnalysisConfig;
use pathstat_tables::load_path;
use tracing_subscriber::EnvFilter;

/// One `--log` argument: `LABEL=PATH`, or a bare `PATH` labelled by its file
/// stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSpec {
    /// Algorithm label.
    pub label: String,
    /// Path of the log file.
    pub path: PathBuf,
}

impl FromStr for LogSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some((label, path)) = s.split_once('=') {
            if label.is_empty() || path.is_empty() {
                return Err(format!("expected LABEL=PATH, got `{s}`"));
            }
            return Ok(Self {
                label: label.to_owned(),
                path: PathBuf::from(path),
            });
        }
        let path = PathBuf::from(s);
        let label = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .filter(|stem| !stem.is_empty())
            .ok_or_else(|| format!("cannot derive a label from `{s}`; use LABEL=PATH"))?
            .to_owned();
        Ok(Self { label, path })
    }
}

/// Installs the stderr tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `verbosity` selects the level
/// (0 = warn, 1 = info, 2 = debug, 3+ = trace).
pub fn init_tracing(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        })
    });
    // A subscriber may already be installed when running under a test harness.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Loads the analysis configuration, applying `--k` overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the resulting
/// configuration is invalid.
pub fn load_config(path: Option<&Path>, ks: &[f64]) -> Result<AnalysisConfig> {
    let mut config = match path {
        Some(path) => AnalysisConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    if !ks.is_empty() {
        config.thresholds = ks.to_vec();
    }
    config.validate().context("Invalid analysis configuration")?;
    Ok(config)
}

/// Loads and analyzes every log, in argument order.
///
/// # Errors
///
/// Returns an error if a log cannot be loaded or analyzed.
pub fn analyze_logs(logs: &[LogSpec], config: &AnalysisConfig) -> Result<Vec<AlgorithmAnalysis>> {
    logs.iter()
        .map(|arg| {
            let family = config.family_for(&arg.label);
            let log = load_path(&arg.path, &arg.label, family)
                .with_context(|| format!("Failed to load log: {}", arg.path.display()))?;
            analyze(&log, config).with_context(|| format!("Failed to analyze {}", arg.label))
        })
        .collect()
}

/// Collects the diagnostics of every analysis into one report, in log order.
#[must_use]
pub fn merged_report(analyses: &[AlgorithmAnalysis]) -> AnalysisReport {
    let mut report = AnalysisReport::new();
    for analysis in analyses {
        report.extend(analysis.report.clone());
    }
    report
}

/// Writes every diagnostic and a summary line; returns the failure count.
///
/// # Errors
///
/// Returns an error if `out` cannot be written.
pub fn write_report<W: Write>(out: &mut W, report: &AnalysisReport) -> io::Result<usize> {
    for diagnostic in &report.diagnostics {
        writeln!(
            out,
            "[{}] {}: {}",
            diagnostic.severity.tag(),
            diagnostic.algorithm,
            diagnostic.message
        )?;
        for detail in &diagnostic.details {
            writeln!(out, "       {detail}")?;
        }
    }

    let failed = report.failure_count();
    writeln!(
        out,
        "Summary: {} notes, {} warnings, {failed} failures",
        report.count(Severity::Info),
        report.count(Severity::Warning)
    )?;
    Ok(failed)
}

/// Prints the merged report of `analyses` to stdout; returns the failure
/// count.
///
/// # Errors
///
/// Returns an error if stdout cannot be written.
pub fn print_report(analyses: &[AlgorithmAnalysis]) -> Result<usize> {
    let failed = write_report(&mut io::stdout().lock(), &merged_report(analyses))?;
    Ok(failed)
}
