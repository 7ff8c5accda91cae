//! Unit tests for the validator registry and the top-level validator

use crate::test_utils::single_component;
use bindery_domain::{Binding, ComponentDescriptor, ComponentTree, EntryPoint, ModuleDescriptor, TypeCatalog};
use bindery_validate::validators::DuplicateBindingValidator;
use bindery_validate::{
    BindingGraph, Diagnostic, GraphValidator, ValidationConfig, ValidationError, Validator,
    ValidatorRegistry,
};

fn duplicated_component() -> ComponentTree {
    single_component(
        ComponentDescriptor::new("test.C")
            .with_module(ModuleDescriptor::new("test.M1").with_binding(Binding::provides("a1", "test.A")))
            .with_module(ModuleDescriptor::new("test.M2").with_binding(Binding::provides("a2", "test.A")))
            .with_entry_point(EntryPoint::provision("getA", "test.A")),
    )
}

struct FailingValidator;

impl Validator for FailingValidator {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn description(&self) -> &'static str {
        "Always fails"
    }

    fn validate(
        &self,
        _graph: &BindingGraph<'_>,
        _config: &ValidationConfig,
    ) -> anyhow::Result<Vec<Diagnostic>> {
        anyhow::bail!("graph unavailable")
    }
}

#[test]
fn test_standard_registry_order() {
    assert_eq!(
        ValidatorRegistry::standard().names(),
        vec![
            "component_dependency_cycle",
            "module",
            "members_injection",
            "missing_binding",
            "duplicate_bindings",
            "map_keys",
            "dependency_cycle",
            "nullability",
        ]
    );
}

#[test]
fn test_disabled_validator_is_skipped() {
    let tree = duplicated_component();
    let catalog = TypeCatalog::new();

    let enabled = GraphValidator::new().validate(&tree, &catalog).unwrap();
    assert_eq!(enabled.diagnostics.len(), 1);

    let config = ValidationConfig::default().with_disabled_validator("duplicate_bindings");
    let disabled = GraphValidator::with_config(config).validate(&tree, &catalog).unwrap();
    assert!(disabled.diagnostics.is_empty());
}

#[test]
fn test_validate_named() {
    let tree = duplicated_component();
    let catalog = TypeCatalog::new();
    let validator = GraphValidator::new();

    let only_cycles = validator
        .validate_named(&tree, &catalog, &["dependency_cycle"])
        .unwrap();
    assert!(only_cycles.diagnostics.is_empty());

    let unknown = validator.validate_named(&tree, &catalog, &["no_such_check"]);
    assert!(matches!(unknown, Err(ValidationError::Config(_))));
}

#[test]
fn test_validator_failure_is_an_error() {
    let registry = ValidatorRegistry::new()
        .with_validator(DuplicateBindingValidator::new())
        .with_validator(FailingValidator);
    let validator = GraphValidator::with_registry(ValidationConfig::default(), registry);

    let result = validator.validate(&duplicated_component(), &TypeCatalog::new());
    match result {
        Err(ValidationError::Validator { validator, message }) => {
            assert_eq!(validator, "failing");
            assert_eq!(message, "graph unavailable");
        }
        other => panic!("expected validator error, got {other:?}"),
    }
}

#[test]
fn test_broken_tree_is_an_error() {
    let mut tree = ComponentTree::new();
    tree.add_root(ComponentDescriptor::new("test.C"));
    let mut json = serde_json::to_value(&tree).unwrap();
    json["components"][0]["parent"] = serde_json::json!(0);
    let broken: ComponentTree = serde_json::from_value(json).unwrap();

    let result = GraphValidator::new().validate(&broken, &TypeCatalog::new());
    assert!(matches!(result, Err(ValidationError::Domain(_))));
}
