//! Core data model types.
//!
//! A convergence log is a flat sequence of [`LogRow`]s, one per optimizer
//! iteration, possibly holding many independent runs back to back. Rows are
//! read once and never mutated; derived values live in new structures.

use serde::{Deserialize, Serialize};

/// One optimizer iteration record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRow {
    /// Algorithm label supplied by the caller, never read from the row itself.
    pub algorithm: String,
    /// Iteration number, `None` when the source cell was not a non-negative integer.
    pub iteration: Option<u64>,
    /// Elapsed time since the run's start, in milliseconds.
    pub elapsed_ms: f64,
    /// Manhattan reference distance of the problem instance.
    pub manhattan: f64,
    /// Quality score reported at this iteration.
    pub fitness: f64,
    /// Best-known path length at this iteration.
    pub best_path_length: f64,
    /// Explicit run identifier, present only when the log carries a `RunId` column.
    pub run_hint: Option<u64>,
}

/// All usable rows of one algorithm's convergence log, in recorded order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmLog {
    /// Algorithm label supplied by the caller.
    pub algorithm: String,
    /// Family resolved once for the whole log.
    pub family: AlgorithmFamily,
    /// Rows that survived numeric validation.
    pub rows: Vec<LogRow>,
    /// Number of rows discarded for missing or non-numeric core fields.
    pub dropped: usize,
}

/// Final outcome of one pathfinding attempt, as recorded in a results file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    /// Algorithm label from the file's `Algorithm` column.
    pub algorithm: String,
    /// Wall-clock duration of the attempt in milliseconds.
    pub time_ms: Option<f64>,
    /// Number of steps of the returned path; zero for a failed attempt.
    pub path_length: f64,
    /// Number of turns along the returned path.
    pub rotations: Option<u64>,
    /// Whether a path to the goal was found.
    pub success: bool,
    /// Simulation step at which the attempt started.
    pub step: Option<u64>,
    /// Manhattan distance between start and goal.
    pub manhattan: f64,
}

impl ResultRow {
    /// A path length that ranks the attempt: the path length of a success,
    /// positive infinity for a failure or an empty path.
    #[must_use]
    pub fn cost(&self) -> f64 {
        if self.is_solved() {
            self.path_length
        } else {
            f64::INFINITY
        }
    }

    /// True for a successful attempt with a non-empty path.
    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.success && self.path_length > 0.0
    }
}

/// All usable rows of a results file, in recorded order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultsLog {
    /// Rows that survived validation.
    pub rows: Vec<ResultRow>,
    /// Number of rows discarded for missing or malformed fields.
    pub dropped: usize,
}

/// Closed set of algorithm families with a distinct goal condition.
///
/// The family is resolved once, when a log is loaded, and carried alongside
/// its rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlgorithmFamily {
    /// Firefly algorithm: goal is the first fitness above a fixed level.
    Firefly,
    /// Ant colony optimization: goal is the first repeated fitness value.
    Aco,
    /// Camel herd algorithm: goal holds from the first iteration.
    CamelHerd,
    /// Any other family; no goal condition is defined.
    Other,
}

impl AlgorithmFamily {
    /// Resolves a family from an algorithm label by case-insensitive prefix.
    ///
    /// ```
    /// use pathstat_model::AlgorithmFamily;
    ///
    /// assert_eq!(AlgorithmFamily::from_label("ACO"), AlgorithmFamily::Aco);
    /// assert_eq!(AlgorithmFamily::from_label("Camel-v2"), AlgorithmFamily::CamelHerd);
    /// assert_eq!(AlgorithmFamily::from_label("PSO"), AlgorithmFamily::Other);
    /// ```
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let lower = label.to_lowercase();
        if lower.starts_with("firefly") {
            AlgorithmFamily::Firefly
        } else if lower.starts_with("aco") {
            AlgorithmFamily::Aco
        } else if lower.starts_with("cha") || lower.starts_with("camel") {
            AlgorithmFamily::CamelHerd
        } else {
            AlgorithmFamily::Other
        }
    }

    /// Returns the string used in configuration files.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AlgorithmFamily::Firefly => "firefly",
            AlgorithmFamily::Aco => "aco",
            AlgorithmFamily::CamelHerd => "camel-herd",
            AlgorithmFamily::Other => "other",
        }
    }
}

/// Instance-size bucket, classified by Manhattan distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstanceRange {
    /// Short routes: `manhattan <= short_max`.
    Short,
    /// Medium routes: `short_max < manhattan <= medium_max`.
    Medium,
    /// Long routes: `manhattan > medium_max`.
    Long,
}

impl InstanceRange {
    /// All ranges in ascending order.
    pub const ALL: [InstanceRange; 3] =
        [InstanceRange::Short, InstanceRange::Medium, InstanceRange::Long];

    /// Returns the lowercase name used in file names and table cells.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            InstanceRange::Short => "short",
            InstanceRange::Medium => "medium",
            InstanceRange::Long => "long",
        }
    }
}

/// Renders a relative threshold as a column suffix: `1.5` becomes `k1_5`.
///
/// Whole numbers keep one fractional digit (`2.0` becomes `k2_0`) so that the
/// suffix always shows which threshold produced the column.
#[must_use]
pub fn threshold_suffix(k: f64) -> String {
    let text = if k.is_finite() && k.fract() == 0.0 {
        format!("{k:.1}")
    } else {
        format!("{k}")
    };
    format!("k{}", text.replace('.', "_"))
}
