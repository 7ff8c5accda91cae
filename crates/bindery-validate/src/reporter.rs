//! Validation Report Generation
//!
//! Generates reports in multiple formats:
//! - JSON for tooling that consumes diagnostics
//! - Human-readable for terminal output
//! - CI summary for build annotations

use crate::Severity;
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Validation report containing all diagnostics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Summary statistics
    pub summary: ValidationSummary,
    /// Diagnostics in the order they were found
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    /// Diagnostics of one kind
    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.kind == kind)
    }

    /// Whether no error-level diagnostic was found
    pub fn passed(&self) -> bool {
        self.summary.passed
    }
}

/// Summary of validation results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationSummary {
    /// Total number of diagnostics
    pub total_diagnostics: usize,
    /// Number of error-level diagnostics
    pub error_count: usize,
    /// Number of warning-level diagnostics
    pub warning_count: usize,
    /// Number of info-level diagnostics
    pub info_count: usize,
    /// Diagnostics per kind name
    pub by_kind: BTreeMap<String, usize>,
    /// Whether validation passed (no error-level diagnostics)
    pub passed: bool,
}

/// Report generator
pub struct Reporter;

impl Reporter {
    /// Build a report from collected diagnostics
    pub fn create_report(diagnostics: Vec<Diagnostic>) -> ValidationReport {
        let count = |severity: Severity| diagnostics.iter().filter(|d| d.severity == severity).count();
        let mut by_kind = BTreeMap::new();
        for diagnostic in &diagnostics {
            *by_kind.entry(diagnostic.kind.to_string()).or_insert(0) += 1;
        }
        let summary = ValidationSummary {
            total_diagnostics: diagnostics.len(),
            error_count: count(Severity::Error),
            warning_count: count(Severity::Warning),
            info_count: count(Severity::Info),
            passed: count(Severity::Error) == 0,
            by_kind,
        };
        ValidationReport {
            summary,
            diagnostics,
        }
    }

    /// Generate JSON report
    pub fn to_json(report: &ValidationReport) -> String {
        serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
    }

    /// Generate human-readable report
    pub fn to_human_readable(report: &ValidationReport) -> String {
        let mut output = String::new();

        output.push_str("=== Binding Graph Validation Report ===\n\n");

        output.push_str("--- Summary ---\n");
        output.push_str(&format!(
            "Total Diagnostics: {}\n",
            report.summary.total_diagnostics
        ));
        output.push_str(&format!("  Errors:   {}\n", report.summary.error_count));
        output.push_str(&format!("  Warnings: {}\n", report.summary.warning_count));
        output.push_str(&format!("  Info:     {}\n", report.summary.info_count));
        for (kind, count) in &report.summary.by_kind {
            output.push_str(&format!("  {kind}: {count}\n"));
        }
        output.push('\n');

        let status = if report.summary.passed {
            "PASSED"
        } else {
            "FAILED"
        };
        output.push_str(&format!("Status: {status}\n\n"));

        for kind in DiagnosticKind::ALL {
            let found: Vec<&Diagnostic> = report.of_kind(kind).collect();
            if found.is_empty() {
                continue;
            }
            output.push_str(&format!("--- {kind} ({}) ---\n", kind.id()));
            for d in found {
                let component = d
                    .component
                    .as_deref()
                    .map(|c| format!(" in {c}"))
                    .unwrap_or_default();
                output.push_str(&format!("  [{}]{component} {}\n", d.severity, d.message));
            }
            if let Some(suggestion) = kind.suggestion() {
                output.push_str(&format!("  Suggestion: {suggestion}\n"));
            }
            output.push('\n');
        }

        output
    }

    /// Generate CI summary (Markdown with error annotations)
    pub fn to_ci_summary(report: &ValidationReport) -> String {
        let mut output = String::new();

        output.push_str("## Binding Graph Validation\n\n");

        if report.summary.passed {
            output.push_str("**Status:** :white_check_mark: PASSED\n\n");
        } else {
            output.push_str("**Status:** :x: FAILED\n\n");
        }

        output.push_str("| Kind | Count |\n");
        output.push_str("|------|-------|\n");
        for (kind, count) in &report.summary.by_kind {
            output.push_str(&format!("| {kind} | {count} |\n"));
        }
        output.push_str(&format!(
            "| **Total** | **{}** |\n",
            report.summary.total_diagnostics
        ));
        output.push('\n');

        for d in report.diagnostics.iter().filter(|d| d.is_error()) {
            let file = d
                .location
                .as_ref()
                .and_then(|l| l.file.as_ref())
                .map(|f| format!(" file={}", f.display()))
                .unwrap_or_default();
            let line = d
                .location
                .as_ref()
                .and_then(|l| l.line)
                .map(|l| format!(",line={l}"))
                .unwrap_or_default();
            output.push_str(&format!(
                "::error{file}{line}::{} {}\n",
                d.id(),
                d.headline()
            ));
        }

        output
    }

    /// Count error-level diagnostics
    pub fn count_errors(report: &ValidationReport) -> usize {
        report.summary.error_count
    }

    /// Count warning-level diagnostics
    pub fn count_warnings(report: &ValidationReport) -> usize {
        report.summary.warning_count
    }
}
