//! Binding graph
//!
//! [`BindingGraph::build`] resolves every entry point of every component, in
//! pre-order, and records which nodes each component reaches. Validators only
//! read the finished graph.

use crate::resolver::{
    BindingId, BindingRequest, DeclaredBinding, Node, NodeId, ResolvedBindings, Resolver,
};
use bindery_domain::constants::COMPONENT_PATH_SEPARATOR;
use bindery_domain::{Binding, ComponentId, ComponentTree, EntryPoint, TypeCatalog};
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::{debug, info};

/// An entry point and the node it resolves to
#[derive(Debug, Clone)]
pub struct EntryPointNode {
    /// The declared entry point
    pub entry_point: EntryPoint,
    /// Resolved node
    pub node: NodeId,
}

/// The part of the graph seen from one component
#[derive(Debug, Clone)]
pub struct ComponentGraph {
    /// The component
    pub component: ComponentId,
    /// Entry points in declaration order
    pub entry_points: Vec<EntryPointNode>,
    /// Nodes reachable from the entry points, breadth-first
    pub reachable: Vec<NodeId>,
    /// Child components
    pub children: Vec<ComponentId>,
}

impl ComponentGraph {
    fn empty(component: ComponentId, children: Vec<ComponentId>) -> Self {
        Self {
            component,
            entry_points: Vec::new(),
            reachable: Vec::new(),
            children,
        }
    }
}

/// Resolved graph over a component tree
pub struct BindingGraph<'a> {
    tree: &'a ComponentTree,
    catalog: &'a TypeCatalog,
    bindings: Vec<DeclaredBinding>,
    nodes: Vec<Node>,
    resolutions: HashMap<(ComponentId, BindingRequest), NodeId>,
    components: Vec<ComponentGraph>,
}

impl<'a> BindingGraph<'a> {
    /// Resolve every component of the tree
    pub fn build(tree: &'a ComponentTree, catalog: &'a TypeCatalog) -> Self {
        let mut resolver = Resolver::new(tree, catalog);
        let mut components: Vec<ComponentGraph> = tree
            .ids()
            .map(|id| ComponentGraph::empty(id, tree.get(id).children.clone()))
            .collect();

        for id in tree.preorder() {
            let descriptor = tree.get(id);
            let graph = &mut components[id.0];
            let mut seen = HashSet::new();
            let mut queue = VecDeque::new();

            for entry_point in &descriptor.entry_points {
                let node = resolver.resolve(id, &BindingRequest::for_dependency(&entry_point.request));
                graph.entry_points.push(EntryPointNode {
                    entry_point: entry_point.clone(),
                    node,
                });
                if seen.insert(node) {
                    graph.reachable.push(node);
                    queue.push_back(node);
                }
            }
            while let Some(node) = queue.pop_front() {
                let targets: Vec<NodeId> = resolver.expand(node).iter().map(|e| e.target).collect();
                for target in targets {
                    if seen.insert(target) {
                        graph.reachable.push(target);
                        queue.push_back(target);
                    }
                }
            }
            debug!(
                component = %descriptor.name,
                entry_points = graph.entry_points.len(),
                reachable = graph.reachable.len(),
                "Resolved component"
            );
        }

        let parts = resolver.into_parts();
        info!(
            components = tree.len(),
            nodes = parts.nodes.len(),
            bindings = parts.bindings.len(),
            "Built binding graph"
        );
        Self {
            tree,
            catalog,
            bindings: parts.bindings,
            nodes: parts.nodes,
            resolutions: parts.memo,
            components,
        }
    }

    /// The component tree
    pub fn tree(&self) -> &'a ComponentTree {
        self.tree
    }

    /// The type catalog
    pub fn catalog(&self) -> &'a TypeCatalog {
        self.catalog
    }

    /// Node by id
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// All nodes
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Binding by id
    pub fn binding(&self, id: BindingId) -> &DeclaredBinding {
        &self.bindings[id.0]
    }

    /// Every declared and synthesized binding
    pub fn bindings(&self) -> &[DeclaredBinding] {
        &self.bindings
    }

    /// Per-component view
    pub fn component(&self, id: ComponentId) -> &ComponentGraph {
        &self.components[id.0]
    }

    /// Per-component views in tree pre-order
    pub fn components_preorder(&self) -> impl Iterator<Item = &ComponentGraph> + '_ {
        self.tree.preorder().into_iter().map(|id| &self.components[id.0])
    }

    /// Resolution of a request as seen from a component, if it was requested there
    pub fn resolution(
        &self,
        component: ComponentId,
        request: &BindingRequest,
    ) -> Option<&ResolvedBindings> {
        self.resolutions
            .get(&(component, request.clone()))
            .map(|node| &self.nodes[node.0].resolved)
    }

    /// Binding the graph follows for a node
    pub fn primary_binding(&self, node: NodeId) -> Option<&Binding> {
        self.nodes[node.0]
            .resolved
            .primary
            .map(|id| &self.bindings[id.0].binding)
    }

    /// Name of a component
    pub fn component_name(&self, id: ComponentId) -> &'a str {
        &self.tree.get(id).name
    }

    /// ` [Root → Child]` for subcomponents, empty for roots
    pub fn component_path(&self, id: ComponentId) -> String {
        let names = self.tree.path_names(id);
        if names.len() < 2 {
            return String::new();
        }
        format!(" [{}]", names.join(COMPONENT_PATH_SEPARATOR))
    }

    /// Whether a node's request is reached by the graph at all
    pub fn is_reachable(&self, node: NodeId) -> bool {
        self.components.iter().any(|c| c.reachable.contains(&node))
    }
}
