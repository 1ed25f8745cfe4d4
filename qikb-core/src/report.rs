//! Build diagnostics and the end-of-run report.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Info,
    Warning,
    Error,
}

/// A problem found during the run that did not abort it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Stable machine-readable code, e.g. `discovery.missing_root`
    pub code: String,
    pub severity: DiagnosticSeverity,
    pub message: String,
    /// Source path (or root) the diagnostic refers to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
}

impl Diagnostic {
    pub fn warning(code: &str, message: impl Into<String>, source_path: Option<String>) -> Self {
        Self {
            code: code.to_string(),
            severity: DiagnosticSeverity::Warning,
            message: message.into(),
            source_path,
        }
    }

    pub fn error(code: &str, message: impl Into<String>, source_path: Option<String>) -> Self {
        Self {
            code: code.to_string(),
            severity: DiagnosticSeverity::Error,
            message: message.into(),
            source_path,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            DiagnosticSeverity::Info => "info",
            DiagnosticSeverity::Warning => "warning",
            DiagnosticSeverity::Error => "error",
        };
        write!(f, "{} {}", severity, self.code)?;
        if let Some(path) = &self.source_path {
            write!(f, " ({})", path)?;
        }
        write!(f, ": {}", self.message)
    }
}

/// A document left out of the output, with the reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedDocument {
    pub source_path: String,
    /// Stage that failed: `read`, `decode`, `frontmatter`, `collision`, `render` or `write`
    pub stage: String,
    pub reason: String,
}

/// Counts and reasons gathered over one build run
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    /// Files captured by discovery
    pub discovered: usize,
    /// Documents read and parsed successfully
    pub parsed: usize,
    /// Artifacts written by emitters
    pub written: usize,
    pub skipped: Vec<SkippedDocument>,
    pub diagnostics: Vec<Diagnostic>,
}

impl BuildReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a recoverable problem and log it
    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            DiagnosticSeverity::Error => tracing::error!("{}", diagnostic),
            DiagnosticSeverity::Warning => tracing::warn!("{}", diagnostic),
            DiagnosticSeverity::Info => tracing::info!("{}", diagnostic),
        }
        self.diagnostics.push(diagnostic);
    }

    /// Record a document that will not appear in the output and log it.
    ///
    /// A document is listed once; later skips of the same source only log.
    pub fn skip(&mut self, source_path: impl Into<String>, stage: &str, reason: impl Into<String>) {
        let skipped = SkippedDocument {
            source_path: source_path.into(),
            stage: stage.to_string(),
            reason: reason.into(),
        };
        if self.skipped.iter().any(|s| s.source_path == skipped.source_path) {
            tracing::debug!(
                "Already skipped {} ({}): {}",
                skipped.source_path,
                skipped.stage,
                skipped.reason
            );
            return;
        }
        tracing::warn!(
            "Skipping {} ({}): {}",
            skipped.source_path,
            skipped.stage,
            skipped.reason
        );
        self.skipped.push(skipped);
    }

    pub fn warnings(&self) -> usize {
        self.count(DiagnosticSeverity::Warning)
    }

    pub fn errors(&self) -> usize {
        self.count(DiagnosticSeverity::Error)
    }

    fn count(&self, severity: DiagnosticSeverity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    /// Diagnostics with the given code
    pub fn with_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.diagnostics.iter().filter(move |d| d.code == code)
    }

    /// One-line summary for the end of a run
    pub fn summary(&self) -> String {
        format!(
            "{} discovered, {} parsed, {} written, {} skipped, {} warnings, {} errors",
            self.discovered,
            self.parsed,
            self.written,
            self.skipped.len(),
            self.warnings(),
            self.errors()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_summary() {
        let mut report = BuildReport::new();
        report.discovered = 3;
        report.parsed = 2;
        report.push(Diagnostic::warning(
            "discovery.missing_root",
            "Content root not found",
            Some("missing".into()),
        ));
        report.push(Diagnostic::error("collision.slug", "taken", None));
        report.skip("bad.md", "frontmatter", "Invalid YAML");

        assert_eq!(report.warnings(), 1);
        assert_eq!(report.errors(), 1);
        assert_eq!(report.with_code("collision.slug").count(), 1);
        assert_eq!(
            report.summary(),
            "3 discovered, 2 parsed, 0 written, 1 skipped, 1 warnings, 1 errors"
        );
    }

    #[test]
    fn test_skip_lists_each_source_once() {
        let mut report = BuildReport::new();
        report.skip("kb/page.md", "collision", "slug taken");
        report.skip("kb/page.md", "collision", "path taken");
        report.skip("kb/other.md", "write", "denied");

        assert_eq!(report.skipped.len(), 2);
        assert_eq!(report.skipped[0].reason, "slug taken");
        assert!(report.summary().contains("2 skipped"));
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::warning("discovery.missing_root", "not found", Some("kb/x".into()));
        assert_eq!(
            diag.to_string(),
            "warning discovery.missing_root (kb/x): not found"
        );
    }
}
