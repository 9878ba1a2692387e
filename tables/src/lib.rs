//! Input and output tables for pathstat.
//!
//! - [`loader`] reads semicolon-separated convergence logs into
//!   [`AlgorithmLog`](pathstat_model::AlgorithmLog)s and results files into
//!   [`ResultsLog`](pathstat_model::ResultsLog)s, dropping malformed rows.
//! - [`table`] lays analysis results out as column-ordered [`Table`]s.
//! - [`writer`] encodes tables as CSV or JSON and writes them to disk.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod loader;
pub mod table;
pub mod writer;

pub use loader::{
    load_path, load_reader, load_results_path, load_results_reader, LoadError, LoadedLog,
};
pub use table::{
    comparison_table, dominance_count_table, dominance_share_table, improvement_table,
    metrics_table, opt_ratio_table, path_stats_table, range_share_table, rank_table,
    run_summary_table, success_table, time_summary_table, win_rate_table, Cell, Table,
};
pub use writer::{render, write_csv, write_table, write_text, Format, WriteError};
