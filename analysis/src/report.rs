//! Analysis report types: diagnostics, severity levels, and report aggregation.

use serde::Serialize;

/// Severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational; nothing to act on.
    Info,
    /// Metrics were computed but may be misleading.
    Warning,
    /// The input could not be analyzed as intended.
    Failure,
}

impl Severity {
    /// Returns the fixed-width tag used in printed reports.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARN",
            Severity::Failure => "FAIL",
        }
    }
}

/// A single finding about one algorithm's log.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    /// Algorithm label the finding refers to.
    pub algorithm: String,
    /// Human-readable message.
    pub message: String,
    /// Severity of the finding.
    pub severity: Severity,
    /// Optional additional detail lines.
    pub details: Vec<String>,
}

impl Diagnostic {
    /// Creates an informational diagnostic.
    pub fn info(algorithm: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            algorithm: algorithm.into(),
            message: message.into(),
            severity: Severity::Info,
            details: Vec::new(),
        }
    }

    /// Creates a warning.
    pub fn warn(algorithm: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            algorithm: algorithm.into(),
            message: message.into(),
            severity: Severity::Warning,
            details: Vec::new(),
        }
    }

    /// Creates a warning with additional detail lines.
    pub fn warn_with_details(
        algorithm: impl Into<String>,
        message: impl Into<String>,
        details: Vec<String>,
    ) -> Self {
        Self {
            algorithm: algorithm.into(),
            message: message.into(),
            severity: Severity::Warning,
            details,
        }
    }

    /// Creates a failure.
    pub fn fail(algorithm: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            algorithm: algorithm.into(),
            message: message.into(),
            severity: Severity::Failure,
            details: Vec::new(),
        }
    }

    /// Returns true if this diagnostic is a failure.
    pub fn is_failure(&self) -> bool {
        self.severity == Severity::Failure
    }
}

/// Aggregated diagnostics of an analysis.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisReport {
    /// All findings, in the order they were raised.
    pub diagnostics: Vec<Diagnostic>,
}

impl AnalysisReport {
    /// Creates a new empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a diagnostic to this report.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Extends this report with the diagnostics of another report.
    pub fn extend(&mut self, other: AnalysisReport) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// Returns the number of diagnostics with the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    /// Returns the number of failures.
    pub fn failure_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_failure()).count()
    }

    /// Returns true if no diagnostic is a failure.
    pub fn all_passed(&self) -> bool {
        self.failure_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_by_severity() {
        let mut report = AnalysisReport::new();
        report.push(Diagnostic::info("ACO", "3 rows dropped"));
        report.push(Diagnostic::warn("ACO", "mixed instances"));
        assert!(report.all_passed());

        let mut other = AnalysisReport::new();
        other.push(Diagnostic::fail("FA", "no usable rows"));
        report.extend(other);

        assert_eq!(report.count(Severity::Info), 1);
        assert_eq!(report.count(Severity::Warning), 1);
        assert_eq!(report.failure_count(), 1);
        assert!(!report.all_passed());
        assert!(report.diagnostics[2].is_failure());
    }
}
