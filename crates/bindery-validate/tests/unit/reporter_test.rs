//! Unit tests for diagnostics and report rendering

use bindery_domain::SourceLocation;
use bindery_validate::{
    Diagnostic, DiagnosticCategory, DiagnosticKind, Reporter, Severity,
};
use std::collections::HashSet;

fn cycle_diagnostic() -> Diagnostic {
    Diagnostic::error(
        DiagnosticKind::DependencyCycle,
        "Found a dependency cycle:\n    test.A is injected at\n        test.B.<init>(a)",
    )
    .in_component(
        "test.C",
        &SourceLocation::element("test.C").at("src/test/C.java", 7),
    )
}

#[test]
fn test_kind_ids_are_unique() {
    let ids: HashSet<&str> = DiagnosticKind::ALL.iter().map(|k| k.id()).collect();
    assert_eq!(ids.len(), DiagnosticKind::ALL.len());
    assert_eq!(DiagnosticKind::MissingBinding.id(), "BIND001");
    assert_eq!(
        DiagnosticKind::RawTypeInjection.category(),
        DiagnosticCategory::MembersInjection
    );
}

#[test]
fn test_diagnostic_display_and_headline() {
    let diagnostic = cycle_diagnostic();
    assert_eq!(diagnostic.headline(), "Found a dependency cycle:");
    assert!(diagnostic.to_string().starts_with("[DependencyCycle] Found a dependency cycle:\n"));
    assert!(diagnostic.is_error());
}

#[test]
fn test_ci_summary_annotates_location() {
    let report = Reporter::create_report(vec![cycle_diagnostic()]);
    let ci = Reporter::to_ci_summary(&report);

    assert!(ci.contains("**Status:** :x: FAILED"));
    assert!(ci.contains("::error file=src/test/C.java,line=7::BIND005 Found a dependency cycle:\n"));
}

#[test]
fn test_warnings_only_report_passes() {
    let report = Reporter::create_report(vec![Diagnostic::new(
        DiagnosticKind::NullabilityViolation,
        Severity::Warning,
        "test.A is not nullable",
    )]);

    assert!(report.passed());
    assert_eq!(Reporter::count_errors(&report), 0);
    assert_eq!(Reporter::count_warnings(&report), 1);
    assert_eq!(report.summary.by_kind.get("Nullable"), Some(&1));

    let human = Reporter::to_human_readable(&report);
    assert!(human.contains("Status: PASSED"));
    assert!(human.contains("  [WARNING] test.A is not nullable"));
    assert!(!Reporter::to_ci_summary(&report).contains("::error"));
}

#[test]
fn test_empty_report() {
    let report = Reporter::create_report(Vec::new());
    assert!(report.passed());
    assert_eq!(report.summary.total_diagnostics, 0);

    let json: serde_json::Value = serde_json::from_str(&Reporter::to_json(&report)).unwrap();
    assert_eq!(json["diagnostics"], serde_json::json!([]));
}
