//! Duplicate, incompatible and map-key conflict scenarios

use crate::test_utils::{catalog_of, messages, only_message, single_component, validate};
use bindery_domain::{
    Binding, ComponentDescriptor, ComponentTree, EntryPoint, ModuleDescriptor, TypeCatalog,
};
use bindery_validate::DiagnosticKind;

#[test]
fn test_two_provides_in_two_modules() {
    let tree = single_component(
        ComponentDescriptor::new("test.TestComponent")
            .with_module(
                ModuleDescriptor::new("test.Module1")
                    .with_binding(Binding::provides("provideA1", "test.A")),
            )
            .with_module(
                ModuleDescriptor::new("test.Module2")
                    .with_binding(Binding::provides("provideA2", "test.A")),
            )
            .with_entry_point(EntryPoint::provision("getA", "test.A")),
    );

    let report = validate(&tree, &TypeCatalog::new());
    let message = only_message(&report, DiagnosticKind::DuplicateBinding);

    assert_eq!(
        message,
        "test.A is bound multiple times:\n\
         \x20   @Provides test.A test.Module1.provideA1()\n\
         \x20   @Provides test.A test.Module2.provideA2()"
    );
}

#[test]
fn test_order_follows_declaration_not_names() {
    let tree = single_component(
        ComponentDescriptor::new("test.TestComponent")
            .with_module(
                ModuleDescriptor::new("test.ZModule").with_binding(Binding::provides("z", "test.A")),
            )
            .with_module(
                ModuleDescriptor::new("test.AModule").with_binding(Binding::provides("a", "test.A")),
            )
            .with_entry_point(EntryPoint::provision("getA", "test.A")),
    );

    let report = validate(&tree, &TypeCatalog::new());
    let message = only_message(&report, DiagnosticKind::DuplicateBinding);
    let z = message.find("test.ZModule.z()").unwrap();
    let a = message.find("test.AModule.a()").unwrap();
    assert!(z < a);
}

#[test]
fn test_parent_and_child_binding_conflict() {
    let mut tree = ComponentTree::new();
    let parent = tree.add_root(ComponentDescriptor::new("test.Parent").with_module(
        ModuleDescriptor::new("test.ParentModule").with_binding(Binding::provides("parentA", "test.A")),
    ));
    tree.add_child(
        parent,
        ComponentDescriptor::new("test.Child")
            .with_module(
                ModuleDescriptor::new("test.ChildModule")
                    .with_binding(Binding::provides("childA", "test.A")),
            )
            .with_entry_point(EntryPoint::provision("getA", "test.A")),
    )
    .unwrap();

    let report = validate(&tree, &TypeCatalog::new());
    let message = only_message(&report, DiagnosticKind::DuplicateBinding);
    assert_eq!(
        message,
        "test.A is bound multiple times:\n\
         \x20   @Provides test.A test.ParentModule.parentA()\n\
         \x20   @Provides test.A test.ChildModule.childA()"
    );
    assert_eq!(report.diagnostics[0].component.as_deref(), Some("test.Child"));
}

#[test]
fn test_more_than_ten_duplicates_are_truncated() {
    let mut component = ComponentDescriptor::new("test.TestComponent")
        .with_entry_point(EntryPoint::provision("getA", "test.A"));
    for i in 1..=12 {
        component = component.with_module(
            ModuleDescriptor::new(&format!("test.Module{i}"))
                .with_binding(Binding::provides(&format!("provideA{i}"), "test.A")),
        );
    }
    let tree = single_component(component);

    let report = validate(&tree, &TypeCatalog::new());
    let message = only_message(&report, DiagnosticKind::DuplicateBinding);
    let lines: Vec<&str> = message.lines().collect();

    assert_eq!(lines.len(), 12);
    assert_eq!(lines[1], "    @Provides test.A test.Module1.provideA1()");
    assert_eq!(lines[10], "    @Provides test.A test.Module10.provideA10()");
    assert_eq!(lines[11], "    and 2 others");
    assert!(!message.contains("provideA11"));
}

#[test]
fn test_unreachable_duplicates_are_not_reported() {
    let tree = single_component(
        ComponentDescriptor::new("test.TestComponent")
            .with_module(ModuleDescriptor::new("test.Module1").with_binding(Binding::provides("a1", "test.A")))
            .with_module(ModuleDescriptor::new("test.Module2").with_binding(Binding::provides("a2", "test.A"))),
    );
    let report = validate(&tree, &TypeCatalog::new());
    assert!(report.passed());
    assert!(report.diagnostics.is_empty());
}

#[test]
fn test_multibinds_declaration_conflicts_with_unique_binding() {
    let tree = single_component(
        ComponentDescriptor::new("test.TestComponent")
            .with_module(
                ModuleDescriptor::new("test.SetModule")
                    .with_binding(Binding::multibinds("strings", "java.util.Set<java.lang.String>"))
                    .with_binding(Binding::provides("provideSet", "java.util.Set<java.lang.String>")),
            )
            .with_entry_point(EntryPoint::provision("getStrings", "java.util.Set<java.lang.String>")),
    );

    let report = validate(&tree, &TypeCatalog::new());
    let message = only_message(&report, DiagnosticKind::IncompatibleBindings);
    assert!(message.starts_with(
        "java.util.Set<java.lang.String> has incompatible bindings or declarations:\n"
    ));
    assert!(message.contains("    Set bindings and declarations:\n"));
    assert!(message.contains("    Unique bindings and declarations:\n"));
    assert!(message.contains("@Multibinds java.util.Set<java.lang.String> test.SetModule.strings()"));
    assert!(message.contains("@Provides java.util.Set<java.lang.String> test.SetModule.provideSet()"));
}

#[test]
fn test_duplicate_map_keys() {
    let map = "java.util.Map<java.lang.String,test.Handler>";
    let tree = single_component(
        ComponentDescriptor::new("test.TestComponent")
            .with_module(
                ModuleDescriptor::new("test.HandlerModule")
                    .with_binding(
                        Binding::provides("first", "test.Handler")
                            .into_map("@StringKey(\"home\")", "java.lang.String"),
                    )
                    .with_binding(
                        Binding::provides("second", "test.Handler")
                            .into_map("@StringKey(\"home\")", "java.lang.String"),
                    )
                    .with_binding(
                        Binding::provides("third", "test.Handler")
                            .into_map("@StringKey(\"about\")", "java.lang.String"),
                    ),
            )
            .with_entry_point(EntryPoint::provision("handlers", map))
            .with_entry_point(EntryPoint::provision(
                "handlerProviders",
                "java.util.Map<java.lang.String,javax.inject.Provider<test.Handler>>",
            )),
    );

    let report = validate(&tree, &catalog_of(Vec::new()));
    let found = messages(&report, DiagnosticKind::DuplicateMapKey);

    assert_eq!(found.len(), 1);
    assert_eq!(
        found[0],
        format!(
            "The same map key is bound more than once for {map}:\n\
             \x20   @Provides @IntoMap @StringKey(\"home\") test.Handler test.HandlerModule.first()\n\
             \x20   @Provides @IntoMap @StringKey(\"home\") test.Handler test.HandlerModule.second()"
        )
    );
}
