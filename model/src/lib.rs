//! Data model for pathstat, the convergence-log analysis toolkit.
//!
//! The `pathstat-model` crate defines the values every other crate in the
//! workspace exchanges: one [`LogRow`] per optimizer iteration grouped into an
//! [`AlgorithmLog`] per input file, the closed
//! [`AlgorithmFamily`] set that decides goal conditions, the
//! [`InstanceRange`] buckets, the [`ResultRow`]s of a results file, and the
//! [`AnalysisConfig`] holding every tunable constant.
//!
//! # Entry Point
//!
//! ```
//! use pathstat_model::{AlgorithmFamily, AnalysisConfig};
//!
//! let config = AnalysisConfig::default();
//! assert_eq!(config.family_for("CHA"), AlgorithmFamily::CamelHerd);
//! assert_eq!(pathstat_model::threshold_suffix(1.5), "k1_5");
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod config;
pub mod model;

pub use config::{
    AnalysisConfig, BoundaryKind, ConfigError, GoalPolicy, GridConfig, RangeBreakpoints,
    MAX_GRID_POINTS,
};
pub use model::{
    threshold_suffix, AlgorithmFamily, AlgorithmLog, InstanceRange, LogRow, ResultRow, ResultsLog,
};
