//! Unit tests for the type catalog

use bindery_domain::{
    BindingKind, Key, Parameter, RequestKind, RequestSite, TypeCatalog, TypeDeclaration,
};

fn generic_catalog() -> TypeCatalog {
    TypeCatalog::new()
        .with_type(
            TypeDeclaration::class("test.Generic")
                .with_type_parameters(&["T"])
                .with_inject_constructor(vec![Parameter::new("t", "T")]),
        )
        .with_type(TypeDeclaration::interface("test.Bar"))
}

#[test]
fn test_constructor_binding_substitutes_type_arguments() {
    let catalog = generic_catalog();
    let binding = catalog
        .constructor_binding(&Key::new("test.Generic<test.TestClass>"))
        .unwrap();
    assert_eq!(binding.kind, BindingKind::ConstructorInjection);
    assert_eq!(binding.dependencies.len(), 1);
    assert_eq!(binding.dependencies[0].key, Key::new("test.TestClass"));
    assert_eq!(binding.dependencies[0].site.to_string(), "test.Generic.<init>(t)");
}

#[test]
fn test_no_implicit_binding_for_wildcards_qualifiers_or_interfaces() {
    let catalog = generic_catalog();
    assert!(catalog
        .constructor_binding(&Key::new("test.Generic<? extends java.lang.Number>"))
        .is_none());
    assert!(catalog
        .constructor_binding(&Key::qualified("test.Generic<test.X>", "test.Q"))
        .is_none());
    assert!(catalog.constructor_binding(&Key::new("test.Bar")).is_none());
    assert!(catalog.constructor_binding(&Key::new("test.Unknown")).is_none());
}

#[test]
fn test_raw_use_of_generic_type() {
    let catalog = generic_catalog();
    let declaration = catalog.get("test.Generic").unwrap();
    assert!(declaration.is_raw_use(&"test.Generic".into()));
    assert!(catalog.constructor_binding(&Key::new("test.Generic")).is_none());
}

#[test]
fn test_members_follow_constructor_parameters() {
    let catalog = TypeCatalog::new().with_type(
        TypeDeclaration::class("test.C")
            .with_inject_constructor(vec![Parameter::new("x", "test.X")])
            .with_field(Parameter::new("b", "test.B"))
            .with_method("register", vec![Parameter::new("p", "javax.inject.Provider<test.P>")]),
    );
    let binding = catalog.constructor_binding(&Key::new("test.C")).unwrap();
    let sites: Vec<String> = binding.dependencies.iter().map(|d| d.site.to_string()).collect();
    assert_eq!(sites, vec!["test.C.<init>(x)", "test.C.b", "test.C.register(p)"]);
    assert_eq!(binding.dependencies[2].kind, RequestKind::Provider);

    let members = catalog.members_injection_binding(&Key::new("test.C")).unwrap();
    assert_eq!(members.kind, BindingKind::MembersInjection);
    assert_eq!(members.dependencies.len(), 2);
    assert_eq!(members.dependencies[0].site, RequestSite::field("test.C", "b"));
}

#[test]
fn test_static_members_are_not_injected() {
    let declaration = TypeDeclaration::class("test.S")
        .with_static_field(Parameter::new("s", "java.lang.String"));
    assert!(!declaration.has_injected_members());
    let binding = declaration
        .members_injection_binding(&Key::new("test.S"))
        .unwrap();
    assert!(binding.dependencies.is_empty());
}
