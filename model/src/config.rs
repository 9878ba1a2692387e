//! Analysis configuration.
//!
//! Every literal the analysis depends on (goal fitness level, range
//! breakpoints, success timeout, curve grid) is a named field here. All
//! fields have defaults, so an empty TOML document is a valid configuration.
//!
//! ```
//! use pathstat_model::AnalysisConfig;
//!
//! let config = AnalysisConfig::from_toml_str(
//!     r#"
//!     thresholds = [1.8, 1.5, 1.1]
//!     timeout_ms = 2000.0
//!
//!     [families]
//!     FA = "firefly"
//!     "#,
//! )
//! .expect("valid configuration");
//! assert_eq!(config.thresholds, vec![1.8, 1.5, 1.1]);
//! assert_eq!(config.goal.firefly_fitness, 40.0);
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::model::{AlgorithmFamily, InstanceRange};

/// Largest number of points a curve grid may hold.
pub const MAX_GRID_POINTS: usize = 100_000;

/// Errors raised while loading or validating an [`AnalysisConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration {}", path.display())]
    Io {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The configuration document is not valid TOML for this schema.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// A relative threshold is not a positive finite number.
    #[error("threshold {0} must be a positive finite number")]
    InvalidThreshold(f64),
    /// The curve grid step or horizon is not positive.
    #[error("time grid needs positive dt_ms and max_time_ms, got dt_ms={dt_ms}, max_time_ms={max_time_ms}")]
    InvalidGrid {
        /// Grid step in milliseconds.
        dt_ms: f64,
        /// Grid horizon in milliseconds.
        max_time_ms: f64,
    },
    /// The curve grid step is too small for its horizon.
    #[error("time grid with dt_ms={dt_ms} over max_time_ms={max_time_ms} exceeds {MAX_GRID_POINTS} points")]
    GridTooDense {
        /// Grid step in milliseconds.
        dt_ms: f64,
        /// Grid horizon in milliseconds.
        max_time_ms: f64,
    },
    /// Range breakpoints are not ordered `0 < short_max < medium_max`.
    #[error("range breakpoints must satisfy 0 < short_max < medium_max, got {short_max} and {medium_max}")]
    InvalidRanges {
        /// Upper bound of the short range.
        short_max: f64,
        /// Upper bound of the medium range.
        medium_max: f64,
    },
    /// A progress level lies outside `(0, 1]`.
    #[error("progress level {0} must lie in (0, 1]")]
    InvalidProgressLevel(f64),
    /// The success timeout is negative or not finite.
    #[error("timeout_ms {0} must be a non-negative finite number")]
    InvalidTimeout(f64),
}

/// Goal-condition parameters for the families that need one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GoalPolicy {
    /// Firefly goal: first iteration whose fitness exceeds this value.
    pub firefly_fitness: f64,
}

impl Default for GoalPolicy {
    fn default() -> Self {
        Self {
            firefly_fitness: 40.0,
        }
    }
}

/// Manhattan breakpoints between short, medium and long instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RangeBreakpoints {
    /// Largest Manhattan distance classified as short.
    pub short_max: f64,
    /// Largest Manhattan distance classified as medium.
    pub medium_max: f64,
}

impl Default for RangeBreakpoints {
    fn default() -> Self {
        Self {
            short_max: 40.0,
            medium_max: 80.0,
        }
    }
}

impl RangeBreakpoints {
    /// Classifies an instance by its Manhattan distance.
    #[must_use]
    pub fn classify(&self, manhattan: f64) -> InstanceRange {
        if manhattan <= self.short_max {
            InstanceRange::Short
        } else if manhattan <= self.medium_max {
            InstanceRange::Medium
        } else {
            InstanceRange::Long
        }
    }
}

/// Common time grid used to resample convergence curves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    /// Grid step in milliseconds.
    pub dt_ms: f64,
    /// Upper bound of the grid in milliseconds.
    pub max_time_ms: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            dt_ms: 50.0,
            max_time_ms: 1000.0,
        }
    }
}

/// Which rule splits a flat log into runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoundaryKind {
    /// A run starts wherever elapsed time decreases.
    #[default]
    TimeReversal,
    /// Time reversal, or a change of Manhattan distance between rows.
    InstanceChange,
    /// A change of the explicit `RunId` column.
    ExplicitRunId,
}

/// Complete analysis configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Relative thresholds `k`; each yields a `Time_k`/`Iter_k` column pair.
    pub thresholds: Vec<f64>,
    /// Goal-condition parameters.
    pub goal: GoalPolicy,
    /// Instance range breakpoints.
    pub ranges: RangeBreakpoints,
    /// Runs reaching their final fitness within this many milliseconds count as successes.
    pub timeout_ms: f64,
    /// Convergence curve grid.
    pub grid: GridConfig,
    /// Progress levels marked on mean convergence curves.
    pub progress_levels: Vec<f64>,
    /// Run boundary rule.
    pub boundary: BoundaryKind,
    /// Explicit family per algorithm label, overriding prefix matching.
    pub families: BTreeMap<String, AlgorithmFamily>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            thresholds: vec![1.5, 1.2, 1.1],
            goal: GoalPolicy::default(),
            ranges: RangeBreakpoints::default(),
            timeout_ms: 1000.0,
            grid: GridConfig::default(),
            progress_levels: vec![0.25, 0.5, 0.75, 0.95, 0.99, 1.0],
            boundary: BoundaryKind::default(),
            families: BTreeMap::new(),
        }
    }
}

impl AnalysisConfig {
    /// Parses and validates a TOML configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys, or a
    /// validation error from [`AnalysisConfig::validate`].
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: AnalysisConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise the
    /// errors of [`AnalysisConfig::from_toml_str`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Checks every field against its domain.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for &k in &self.thresholds {
            if !(k.is_finite() && k > 0.0) {
                return Err(ConfigError::InvalidThreshold(k));
            }
        }
        let grid = &self.grid;
        if !(grid.dt_ms > 0.0 && grid.max_time_ms > 0.0) {
            return Err(ConfigError::InvalidGrid {
                dt_ms: grid.dt_ms,
                max_time_ms: grid.max_time_ms,
            });
        }
        #[allow(clippy::cast_precision_loss)]
        let max_points = MAX_GRID_POINTS as f64;
        if grid.max_time_ms / grid.dt_ms >= max_points {
            return Err(ConfigError::GridTooDense {
                dt_ms: grid.dt_ms,
                max_time_ms: grid.max_time_ms,
            });
        }
        let ranges = &self.ranges;
        if !(ranges.short_max > 0.0 && ranges.short_max < ranges.medium_max) {
            return Err(ConfigError::InvalidRanges {
                short_max: ranges.short_max,
                medium_max: ranges.medium_max,
            });
        }
        for &level in &self.progress_levels {
            if !(level > 0.0 && level <= 1.0) {
                return Err(ConfigError::InvalidProgressLevel(level));
            }
        }
        if !(self.timeout_ms.is_finite() && self.timeout_ms >= 0.0) {
            return Err(ConfigError::InvalidTimeout(self.timeout_ms));
        }
        Ok(())
    }

    /// Resolves the family of an algorithm label: explicit mapping first,
    /// then case-insensitive prefix matching.
    #[must_use]
    pub fn family_for(&self, label: &str) -> AlgorithmFamily {
        self.families
            .get(label)
            .copied()
            .unwrap_or_else(|| AlgorithmFamily::from_label(label))
    }
}
