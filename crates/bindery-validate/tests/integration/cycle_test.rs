//! Dependency cycle and component dependency cycle scenarios

use crate::test_utils::{catalog_of, injectable, messages, only_message, single_component, validate, validate_with};
use bindery_domain::{
    Binding, ComponentDependency, ComponentDescriptor, ComponentTree, EntryPoint, ModuleDescriptor,
    TypeCatalog,
};
use bindery_validate::{CyclePolicy, DiagnosticKind, ValidationConfig};

fn abc_component() -> ComponentTree {
    single_component(
        ComponentDescriptor::new("test.TestComponent")
            .with_entry_point(EntryPoint::provision("getA", "test.A")),
    )
}

#[test]
fn test_constructor_cycle_through_provider_is_reported() {
    let catalog = catalog_of(vec![
        injectable("test.A", &[("b", "test.B")]),
        injectable("test.B", &[("c", "test.C")]),
        injectable("test.C", &[("a", "javax.inject.Provider<test.A>")]),
    ]);

    let report = validate(&abc_component(), &catalog);
    let message = only_message(&report, DiagnosticKind::DependencyCycle);

    assert_eq!(
        message,
        "Found a dependency cycle:\n\
         \x20   javax.inject.Provider<test.A> is injected at\n\
         \x20       test.C.<init>(a)\n\
         \x20   test.C is injected at\n\
         \x20       test.B.<init>(c)\n\
         \x20   test.B is injected at\n\
         \x20       test.A.<init>(b)\n\
         \x20   test.A is provided at\n\
         \x20       test.TestComponent.getA()"
    );
}

#[test]
fn test_constructor_cycle_is_reported() {
    let tree = single_component(
        ComponentDescriptor::new("test.Outer.CComponent")
            .with_entry_point(EntryPoint::provision("getC", "test.Outer.C")),
    );
    let catalog = catalog_of(vec![
        injectable("test.Outer.A", &[("cParam", "test.Outer.C")]),
        injectable("test.Outer.B", &[("aParam", "test.Outer.A")]),
        injectable("test.Outer.C", &[("bParam", "test.Outer.B")]),
    ]);

    let report = validate(&tree, &catalog);
    let message = only_message(&report, DiagnosticKind::DependencyCycle);

    assert_eq!(
        message,
        "Found a dependency cycle:\n\
         \x20   test.Outer.C is injected at\n\
         \x20       test.Outer.A.<init>(cParam)\n\
         \x20   test.Outer.A is injected at\n\
         \x20       test.Outer.B.<init>(aParam)\n\
         \x20   test.Outer.B is injected at\n\
         \x20       test.Outer.C.<init>(bParam)\n\
         \x20   test.Outer.C is provided at\n\
         \x20       test.Outer.CComponent.getC()"
    );
}

#[test]
fn test_any_deferred_edge_policy_accepts_provider_cycle() {
    let catalog = catalog_of(vec![
        injectable("test.A", &[("b", "test.B")]),
        injectable("test.B", &[("c", "test.C")]),
        injectable("test.C", &[("a", "javax.inject.Provider<test.A>")]),
    ]);
    let config = ValidationConfig::default().with_cycle_policy(CyclePolicy::AnyDeferredEdge);

    let report = validate_with(&abc_component(), &catalog, config);
    assert!(report.passed());
    assert!(report.diagnostics.is_empty());
}

#[test]
fn test_instance_cycle_is_reported_under_every_policy() {
    let catalog = catalog_of(vec![
        injectable("test.A", &[("b", "test.B")]),
        injectable("test.B", &[("a", "test.A")]),
    ]);
    for policy in [CyclePolicy::Strict, CyclePolicy::AnyDeferredEdge] {
        let config = ValidationConfig::default().with_cycle_policy(policy);
        let report = validate_with(&abc_component(), &catalog, config);
        assert_eq!(messages(&report, DiagnosticKind::DependencyCycle).len(), 1);
    }
}

#[test]
fn test_self_provider_does_not_mask_longer_cycle() {
    // A asks for Provider<A> (allowed) and for B, which asks for A (not allowed)
    let catalog = catalog_of(vec![
        injectable(
            "test.A",
            &[("self", "javax.inject.Provider<test.A>"), ("b", "test.B")],
        ),
        injectable("test.B", &[("a", "test.A")]),
    ]);

    let report = validate(&abc_component(), &catalog);
    let message = only_message(&report, DiagnosticKind::DependencyCycle);

    assert!(message.contains("    test.A is injected at\n        test.B.<init>(a)"));
    assert!(message.contains("    test.B is injected at\n        test.A.<init>(b)"));
    assert!(!message.contains("test.A.<init>(self)"));
}

#[test]
fn test_long_cycle_masked_by_self_providers() {
    let tree = single_component(
        ComponentDescriptor::new("test.Cycles.C")
            .with_entry_point(EntryPoint::provision("a", "test.Cycles.A")),
    );
    let catalog = catalog_of(vec![
        injectable(
            "test.Cycles.A",
            &[("aProvider", "javax.inject.Provider<test.Cycles.A>"), ("b", "test.Cycles.B")],
        ),
        injectable(
            "test.Cycles.B",
            &[("bProvider", "javax.inject.Provider<test.Cycles.B>"), ("a", "test.Cycles.A")],
        ),
    ]);

    let report = validate(&tree, &catalog);
    let message = only_message(&report, DiagnosticKind::DependencyCycle);

    assert_eq!(
        message,
        "Found a dependency cycle:\n\
         \x20   test.Cycles.A is injected at\n\
         \x20       test.Cycles.B.<init>(a)\n\
         \x20   test.Cycles.B is injected at\n\
         \x20       test.Cycles.A.<init>(b)\n\
         \x20   test.Cycles.A is provided at\n\
         \x20       test.Cycles.C.a()"
    );
}

#[test]
fn test_lazy_self_reference_is_allowed() {
    let catalog = catalog_of(vec![injectable("test.A", &[("self", "dagger.Lazy<test.A>")])]);
    let report = validate(&abc_component(), &catalog);
    assert!(report.diagnostics.is_empty());
}

#[test]
fn test_cycle_reported_once_for_multiple_entry_points() {
    let tree = single_component(
        ComponentDescriptor::new("test.TestComponent")
            .with_entry_point(EntryPoint::provision("getA", "test.A"))
            .with_entry_point(EntryPoint::provision("getB", "test.B")),
    );
    let catalog = catalog_of(vec![
        injectable("test.A", &[("b", "test.B")]),
        injectable("test.B", &[("a", "test.A")]),
    ]);

    let report = validate(&tree, &catalog);
    assert_eq!(messages(&report, DiagnosticKind::DependencyCycle).len(), 1);
}

#[test]
fn test_module_cycle_in_child_reached_from_grandchild() {
    let mut tree = ComponentTree::new();
    let parent = tree.add_root(ComponentDescriptor::new("test.Parent"));
    let child = tree
        .add_child(
            parent,
            ComponentDescriptor::new("test.Child").with_module(
                ModuleDescriptor::new("test.CycleModule")
                    .with_binding(
                        Binding::provides("object", "java.lang.Object")
                            .with_parameter("string", "java.lang.String"),
                    )
                    .with_binding(
                        Binding::provides("string", "java.lang.String")
                            .with_parameter("object", "java.lang.Object"),
                    ),
            ),
        )
        .unwrap();
    tree.add_child(
        child,
        ComponentDescriptor::new("test.Grandchild")
            .with_entry_point(EntryPoint::provision("entry", "java.lang.String")),
    )
    .unwrap();

    let report = validate(&tree, &TypeCatalog::new());
    let message = only_message(&report, DiagnosticKind::DependencyCycle);

    assert_eq!(
        message,
        "Found a dependency cycle:\n\
         \x20   java.lang.String is injected at\n\
         \x20       test.CycleModule.object(string)\n\
         \x20   java.lang.Object is injected at\n\
         \x20       test.CycleModule.string(object)\n\
         \x20   java.lang.String is provided at\n\
         \x20       test.Grandchild.entry() [test.Parent → test.Child → test.Grandchild]"
    );
}

#[test]
fn test_cycle_through_child_set_contribution() {
    let mut tree = ComponentTree::new();
    let parent = tree.add_root(ComponentDescriptor::new("test.Parent").with_module(
        ModuleDescriptor::new("test.PM")
            .with_binding(Binding::provides("x", "test.X").with_parameter("ys", "java.util.Set<test.Y>")),
    ));
    tree.add_child(
        parent,
        ComponentDescriptor::new("test.Child")
            .with_module(
                ModuleDescriptor::new("test.CM")
                    .with_binding(Binding::provides("y", "test.Y").with_parameter("x", "test.X").into_set()),
            )
            .with_entry_point(EntryPoint::provision("x", "test.X")),
    )
    .unwrap();

    let report = validate(&tree, &TypeCatalog::new());
    let message = only_message(&report, DiagnosticKind::DependencyCycle);

    assert_eq!(
        message,
        "Found a dependency cycle:\n\
         \x20   test.X is injected at\n\
         \x20       test.CM.y(x)\n\
         \x20   java.util.Set<test.Y> is injected at\n\
         \x20       test.PM.x(ys)\n\
         \x20   test.X is provided at\n\
         \x20       test.Child.x() [test.Parent → test.Child]"
    );
}

#[test]
fn test_implicit_cycle_shared_by_parent_and_child_is_reported_once() {
    let mut tree = ComponentTree::new();
    let parent = tree.add_root(
        ComponentDescriptor::new("test.Parent").with_entry_point(EntryPoint::provision("a", "test.A")),
    );
    tree.add_child(
        parent,
        ComponentDescriptor::new("test.Child").with_entry_point(EntryPoint::provision("a", "test.A")),
    )
    .unwrap();
    let catalog = catalog_of(vec![
        injectable("test.A", &[("b", "test.B")]),
        injectable("test.B", &[("a", "test.A")]),
    ]);

    let report = validate(&tree, &catalog);
    let message = only_message(&report, DiagnosticKind::DependencyCycle);

    assert_eq!(
        message,
        "Found a dependency cycle:\n\
         \x20   test.A is injected at\n\
         \x20       test.B.<init>(a)\n\
         \x20   test.B is injected at\n\
         \x20       test.A.<init>(b)\n\
         \x20   test.A is provided at\n\
         \x20       test.Parent.a()"
    );
}

#[test]
fn test_component_dependency_cycle_reported_for_each_component() {
    let mut tree = ComponentTree::new();
    tree.add_root(
        ComponentDescriptor::new("test.AComponent")
            .with_dependency(ComponentDependency::new("test.BComponent")),
    );
    tree.add_root(
        ComponentDescriptor::new("test.BComponent")
            .with_dependency(ComponentDependency::new("test.AComponent")),
    );

    let report = validate(&tree, &TypeCatalog::new());
    let found = messages(&report, DiagnosticKind::ComponentDependencyCycle);

    assert_eq!(
        found,
        vec![
            "test.AComponent contains a cycle in its component dependencies:\n\
             \x20   test.AComponent\n\
             \x20   test.BComponent\n\
             \x20   test.AComponent"
                .to_string(),
            "test.BComponent contains a cycle in its component dependencies:\n\
             \x20   test.BComponent\n\
             \x20   test.AComponent\n\
             \x20   test.BComponent"
                .to_string(),
        ]
    );
}

#[test]
fn test_component_dependency_chain_without_cycle() {
    let mut tree = ComponentTree::new();
    tree.add_root(
        ComponentDescriptor::new("test.AComponent")
            .with_dependency(ComponentDependency::new("test.BComponent")),
    );
    tree.add_root(
        ComponentDescriptor::new("test.BComponent")
            .with_dependency(ComponentDependency::new("test.External")),
    );

    let report = validate(&tree, &TypeCatalog::new());
    assert!(report.diagnostics.is_empty());
}
