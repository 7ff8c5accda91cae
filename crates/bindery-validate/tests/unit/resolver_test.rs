//! Unit tests for key resolution and graph construction

use crate::test_utils::{catalog_of, injectable, single_component};
use bindery_domain::{
    Binding, ComponentDescriptor, ComponentTree, EntryPoint, Key, ModuleDescriptor, Parameter,
    RequestKind, TypeCatalog, TypeDeclaration,
};
use bindery_validate::resolver::Resolver;
use bindery_validate::{BindingGraph, BindingRequest};

fn provision(key: &str) -> BindingRequest {
    BindingRequest::Provision(Key::new(key))
}

#[test]
fn test_resolution_is_memoized() {
    let tree = single_component(ComponentDescriptor::new("test.C"));
    let catalog = catalog_of(vec![injectable("test.A", &[])]);
    let mut resolver = Resolver::new(&tree, &catalog);
    let root = tree.roots()[0];

    let first = resolver.resolve(root, &provision("test.A"));
    let second = resolver.resolve(root, &provision("test.A"));
    assert_eq!(first, second);
    assert!(resolver.node(first).resolved.implicit.is_some());
}

#[test]
fn test_deferred_requests_share_the_instance_node() {
    let tree = single_component(
        ComponentDescriptor::new("test.C")
            .with_entry_point(EntryPoint::provision("a", "test.A"))
            .with_entry_point(EntryPoint::provision("lazyA", "dagger.Lazy<test.A>"))
            .with_entry_point(EntryPoint::provision(
                "providerOfLazyA",
                "javax.inject.Provider<dagger.Lazy<test.A>>",
            )),
    );
    let catalog = catalog_of(vec![injectable("test.A", &[])]);
    let graph = BindingGraph::build(&tree, &catalog);

    let component = graph.component(tree.roots()[0]);
    let nodes: Vec<_> = component.entry_points.iter().map(|e| e.node).collect();
    assert_eq!(nodes[0], nodes[1]);
    assert_eq!(nodes[0], nodes[2]);
    assert_eq!(
        component.entry_points[2].entry_point.request.kind,
        RequestKind::ProviderOfLazy
    );
}

#[test]
fn test_type_variables_are_substituted() {
    let tree = single_component(
        ComponentDescriptor::new("test.C")
            .with_entry_point(EntryPoint::provision("box", "test.Box<test.Item>")),
    );
    let catalog = TypeCatalog::new().with_type(
        TypeDeclaration::class("test.Box")
            .with_type_parameters(&["T"])
            .with_inject_constructor(vec![Parameter::new("content", "T")]),
    );
    let graph = BindingGraph::build(&tree, &catalog);

    let entry = graph.component(tree.roots()[0]).entry_points[0].node;
    let edges = &graph.node(entry).edges;
    assert_eq!(edges.len(), 1);
    assert_eq!(graph.node(edges[0].target).resolved.key(), &Key::new("test.Item"));
}

#[test]
fn test_qualified_key_gets_no_implicit_binding() {
    let tree = single_component(ComponentDescriptor::new("test.C"));
    let catalog = catalog_of(vec![injectable("test.A", &[])]);
    let mut resolver = Resolver::new(&tree, &catalog);

    let node = resolver.resolve(
        tree.roots()[0],
        &BindingRequest::Provision(Key::qualified("test.A", "Named(\"a\")")),
    );
    assert!(!resolver.node(node).resolved.is_resolved());
}

#[test]
fn test_explicit_binding_hides_constructor() {
    let tree = single_component(ComponentDescriptor::new("test.C").with_module(
        ModuleDescriptor::new("test.M").with_binding(Binding::provides("provideA", "test.A")),
    ));
    let catalog = catalog_of(vec![injectable("test.A", &[("b", "test.B")])]);
    let mut resolver = Resolver::new(&tree, &catalog);

    let node = resolver.resolve(tree.roots()[0], &provision("test.A"));
    let resolved = &resolver.node(node).resolved;
    assert!(resolved.implicit.is_none());
    assert_eq!(resolved.unique.len(), 1);
    assert!(resolver.expand(node).is_empty());
}

#[test]
fn test_deepest_duplicate_is_primary() {
    let mut tree = ComponentTree::new();
    let parent = tree.add_root(ComponentDescriptor::new("test.Parent").with_module(
        ModuleDescriptor::new("test.ParentModule").with_binding(Binding::provides("parentA", "test.A")),
    ));
    let child = tree
        .add_child(
            parent,
            ComponentDescriptor::new("test.Child").with_module(
                ModuleDescriptor::new("test.ChildModule")
                    .with_binding(Binding::provides("childA", "test.A")),
            ),
        )
        .unwrap();
    let catalog = TypeCatalog::new();
    let mut resolver = Resolver::new(&tree, &catalog);

    let node = resolver.resolve(child, &provision("test.A"));
    let primary = resolver.node(node).resolved.primary.unwrap();
    assert_eq!(
        resolver.binding(primary).binding.element_path().as_deref(),
        Some("test.ChildModule.childA")
    );
}

#[test]
fn test_component_instance_and_creator_bindings() {
    let mut tree = ComponentTree::new();
    let parent = tree.add_root(
        ComponentDescriptor::new("test.Parent")
            .with_entry_point(EntryPoint::provision("self", "test.Parent"))
            .with_entry_point(EntryPoint::provision("childFactory", "test.Child.Factory")),
    );
    tree.add_child(
        parent,
        ComponentDescriptor::new("test.Child").with_creator("test.Child.Factory"),
    )
    .unwrap();
    let catalog = TypeCatalog::new();
    let graph = BindingGraph::build(&tree, &catalog);

    for entry in &graph.component(parent).entry_points {
        assert!(graph.node(entry.node).resolved.is_resolved());
    }
}

#[test]
fn test_reachable_nodes_are_breadth_first() {
    let tree = single_component(
        ComponentDescriptor::new("test.C").with_entry_point(EntryPoint::provision("a", "test.A")),
    );
    let catalog = catalog_of(vec![
        injectable("test.A", &[("b", "test.B"), ("c", "test.C2")]),
        injectable("test.B", &[("d", "test.D")]),
        injectable("test.C2", &[]),
        injectable("test.D", &[]),
    ]);
    let graph = BindingGraph::build(&tree, &catalog);

    let keys: Vec<String> = graph
        .component(tree.roots()[0])
        .reachable
        .iter()
        .map(|n| graph.node(*n).resolved.key().to_string())
        .collect();
    assert_eq!(keys, vec!["test.A", "test.B", "test.C2", "test.D"]);
}

#[test]
fn test_implicit_binding_is_owned_by_highest_ancestor() {
    let mut tree = ComponentTree::new();
    let parent = tree.add_root(ComponentDescriptor::new("test.Parent"));
    let child = tree
        .add_child(parent, ComponentDescriptor::new("test.Child"))
        .unwrap();
    let catalog = catalog_of(vec![
        injectable("test.A", &[("b", "test.B")]),
        injectable("test.B", &[]),
    ]);
    let mut resolver = Resolver::new(&tree, &catalog);

    let from_child = resolver.resolve(child, &provision("test.A"));
    let from_parent = resolver.resolve(parent, &provision("test.A"));
    assert_eq!(from_child, from_parent);
    assert_eq!(resolver.node(from_child).resolved.owner, parent);
}

#[test]
fn test_implicit_binding_stays_below_local_dependency() {
    let mut tree = ComponentTree::new();
    let parent = tree.add_root(ComponentDescriptor::new("test.Parent"));
    let child = tree
        .add_child(
            parent,
            ComponentDescriptor::new("test.Child").with_module(
                ModuleDescriptor::new("test.ChildModule").with_binding(Binding::provides("b", "test.B")),
            ),
        )
        .unwrap();
    let catalog = catalog_of(vec![injectable("test.A", &[("b", "test.B")])]);
    let mut resolver = Resolver::new(&tree, &catalog);

    let from_child = resolver.resolve(child, &provision("test.A"));
    let from_parent = resolver.resolve(parent, &provision("test.A"));
    assert_ne!(from_child, from_parent);
    assert_eq!(resolver.node(from_child).resolved.owner, child);
    assert_eq!(resolver.node(from_parent).resolved.owner, parent);
}
