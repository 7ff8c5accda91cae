//! Nullability scenarios

use crate::test_utils::{catalog_of, injectable, messages, single_component, validate, validate_with};
use bindery_domain::{
    Binding, ComponentDependency, ComponentDescriptor, ComponentTree, EntryPoint, ModuleDescriptor,
    Parameter, TypeDeclaration,
};
use bindery_validate::{DiagnosticKind, Severity, ValidationConfig};

fn nullable_string_component() -> ComponentTree {
    single_component(
        ComponentDescriptor::new("test.TestComponent")
            .with_module(
                ModuleDescriptor::new("test.TestModule")
                    .with_binding(Binding::provides("provideString", "java.lang.String").nullable()),
            )
            .with_entry_point(EntryPoint::provision("getA", "test.A")),
    )
}

#[test]
fn test_nullable_binding_into_non_null_parameter() {
    let catalog = catalog_of(vec![injectable("test.A", &[("s", "java.lang.String")])]);

    let report = validate(&nullable_string_component(), &catalog);
    let found = messages(&report, DiagnosticKind::NullabilityViolation);

    assert_eq!(
        found,
        vec![
            "java.lang.String is not nullable, but is being provided by \
             @Provides @Nullable java.lang.String test.TestModule.provideString()\n\
             \x20   java.lang.String is injected at\n\
             \x20       test.A.<init>(s)\n\
             \x20   test.A is provided at\n\
             \x20       test.TestComponent.getA()"
                .to_string()
        ]
    );
    assert!(!report.passed());
}

#[test]
fn test_warning_severity_passes_validation() {
    let catalog = catalog_of(vec![injectable("test.A", &[("s", "java.lang.String")])]);
    let config = ValidationConfig::default().with_nullable_validation(Severity::Warning);

    let report = validate_with(&nullable_string_component(), &catalog, config);

    assert_eq!(report.summary.warning_count, 1);
    assert_eq!(report.diagnostics[0].severity, Severity::Warning);
    assert!(report.passed());
}

#[test]
fn test_nullable_parameter_accepts_nullable_binding() {
    let catalog = catalog_of(vec![TypeDeclaration::class("test.A").with_inject_constructor(vec![
        Parameter::new("s", "java.lang.String").nullable(),
    ])]);
    let report = validate(&nullable_string_component(), &catalog);
    assert!(report.diagnostics.is_empty());
}

#[test]
fn test_nullable_component_dependency_method() {
    let tree = single_component(
        ComponentDescriptor::new("test.TestComponent")
            .with_dependency(
                ComponentDependency::new("test.Upstream")
                    .with_nullable_provision("string", "java.lang.String"),
            )
            .with_entry_point(EntryPoint::provision("getA", "test.A")),
    );
    let catalog = catalog_of(vec![injectable("test.A", &[("s", "java.lang.String")])]);

    let report = validate(&tree, &catalog);
    let found = messages(&report, DiagnosticKind::NullabilityViolation);
    assert_eq!(found.len(), 1);
    assert!(found[0].starts_with(
        "java.lang.String is not nullable, but is being provided by @Nullable java.lang.String test.Upstream.string()"
    ));
}

fn optional_string_component() -> ComponentTree {
    single_component(
        ComponentDescriptor::new("test.TestComponent")
            .with_module(
                ModuleDescriptor::new("test.TestModule")
                    .with_binding(Binding::provides("provideString", "java.lang.String").nullable())
                    .with_binding(Binding::optional_of(
                        "optionalString",
                        "com.google.common.base.Optional",
                        "java.lang.String",
                    )),
            )
            .with_entry_point(EntryPoint::provision("a", "test.A")),
    )
}

#[test]
fn test_nullable_binding_behind_optional_instance() {
    let catalog = catalog_of(vec![injectable(
        "test.A",
        &[("optional", "com.google.common.base.Optional<java.lang.String>")],
    )]);

    let report = validate(&optional_string_component(), &catalog);
    let found = messages(&report, DiagnosticKind::NullabilityViolation);

    assert_eq!(
        found,
        vec![
            "java.lang.String is not nullable, but is being provided by \
             @Provides @Nullable java.lang.String test.TestModule.provideString()\n\
             \x20   com.google.common.base.Optional<java.lang.String> is injected at\n\
             \x20       test.A.<init>(optional)\n\
             \x20   test.A is provided at\n\
             \x20       test.TestComponent.a()"
                .to_string()
        ]
    );
    assert!(!report.passed());
}

#[test]
fn test_deferred_optional_values_accept_nullable_binding() {
    for optional in [
        "com.google.common.base.Optional<javax.inject.Provider<java.lang.String>>",
        "com.google.common.base.Optional<dagger.Lazy<java.lang.String>>",
        "com.google.common.base.Optional<javax.inject.Provider<dagger.Lazy<java.lang.String>>>",
    ] {
        let catalog = catalog_of(vec![injectable("test.A", &[("optional", optional)])]);
        let report = validate(&optional_string_component(), &catalog);
        assert!(report.diagnostics.is_empty(), "{optional}: {:?}", report.diagnostics);
    }
}
