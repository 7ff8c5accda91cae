//! Key resolution
//!
//! [`Resolver`] answers "which bindings satisfy this key, seen from this
//! component?" and memoizes the answer per (component, request). Explicit
//! declarations are looked up along the ancestry from the root down; the
//! deepest declaring component owns the result unless the bindings depend on
//! multibinding or optional declarations local to a component further down, in
//! which case they are re-resolved there. Keys with no declaration fall back to
//! the type catalog's `@Inject` constructors, owned by the highest ancestor
//! whose view of their dependencies matches the requester's.
//!
//! Resolved results become graph nodes, interned by (owner, request), so the
//! same binding reached from several components is one node.

use bindery_domain::{
    Binding, BindingKind, ComponentId, ComponentTree, DependencyRequest, Key, RequestKind,
    SourceLocation, TypeCatalog,
};
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

/// Index into the binding arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(pub usize);

/// Index into the node arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// What is being resolved: a value, or injection into an existing instance
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BindingRequest {
    /// The value for a key
    Provision(Key),
    /// Members injection of a type
    MembersInjection(Key),
}

impl BindingRequest {
    /// Request made by a dependency edge
    pub fn for_dependency(request: &DependencyRequest) -> Self {
        if request.kind == RequestKind::MembersInjector {
            Self::MembersInjection(request.key.clone())
        } else {
            Self::Provision(request.key.clone())
        }
    }

    /// Requested key
    pub fn key(&self) -> &Key {
        match self {
            Self::Provision(key) | Self::MembersInjection(key) => key,
        }
    }
}

/// A binding together with where it was declared
#[derive(Debug, Clone)]
pub struct DeclaredBinding {
    /// The binding
    pub binding: Binding,
    /// Declaring component; for implicit bindings, the component owning the resolution
    pub component: ComponentId,
    /// Declaring module, for module bindings
    pub module: Option<String>,
}

/// Everything that satisfies one request, as seen from its owning component
#[derive(Debug, Clone)]
pub struct ResolvedBindings {
    /// Component that owns the resolution
    pub owner: ComponentId,
    /// The resolved request
    pub request: BindingRequest,
    /// Unique bindings visible from the owner, root first
    pub unique: Vec<BindingId>,
    /// Multibinding contributions gathered from every level, root first
    pub contributions: Vec<BindingId>,
    /// `@Multibinds` declarations
    pub multibinding_declarations: Vec<BindingId>,
    /// `@BindsOptionalOf` declarations
    pub optional_declarations: Vec<BindingId>,
    /// Synthesized constructor-injection or members-injection binding
    pub implicit: Option<BindingId>,
    /// Binding whose dependencies the graph follows, if there is a single one
    pub primary: Option<BindingId>,
    /// How contributions or the optional value are requested
    pub value_request: RequestKind,
}

impl ResolvedBindings {
    fn empty(owner: ComponentId, request: BindingRequest) -> Self {
        Self {
            owner,
            request,
            unique: Vec::new(),
            contributions: Vec::new(),
            multibinding_declarations: Vec::new(),
            optional_declarations: Vec::new(),
            implicit: None,
            primary: None,
            value_request: RequestKind::Instance,
        }
    }

    /// Requested key
    pub fn key(&self) -> &Key {
        self.request.key()
    }

    /// Whether anything satisfies the request
    pub fn is_resolved(&self) -> bool {
        self.primary.is_some()
            || !self.contributions.is_empty()
            || !self.multibinding_declarations.is_empty()
            || !self.optional_declarations.is_empty()
    }

    /// Whether the key is satisfied as a set or map multibinding
    pub fn is_multibinding(&self) -> bool {
        self.unique.is_empty()
            && (!self.contributions.is_empty() || !self.multibinding_declarations.is_empty())
    }

    /// Explicit bindings and declarations in traversal order
    pub fn declarations(&self) -> impl Iterator<Item = BindingId> + '_ {
        self.unique
            .iter()
            .chain(&self.contributions)
            .chain(&self.multibinding_declarations)
            .chain(&self.optional_declarations)
            .copied()
    }
}

/// Outgoing edge of a node
#[derive(Debug, Clone)]
pub struct Edge {
    /// Node the edge leads to
    pub target: NodeId,
    /// How the target is requested
    pub kind: RequestKind,
    /// The written request; `None` for edges to multibinding contributions and
    /// optional values, which have no request site of their own
    pub request: Option<DependencyRequest>,
}

/// A resolved request and its outgoing edges
#[derive(Debug, Clone)]
pub struct Node {
    /// Resolution result
    pub resolved: ResolvedBindings,
    /// Dependency edges in declaration order
    pub edges: Vec<Edge>,
    expanded: bool,
}

#[derive(Debug, Default)]
struct ComponentIndex {
    by_key: HashMap<Key, Vec<BindingId>>,
}

/// Per-component, memoizing resolution engine
pub struct Resolver<'a> {
    tree: &'a ComponentTree,
    catalog: &'a TypeCatalog,
    bindings: Vec<DeclaredBinding>,
    index: Vec<ComponentIndex>,
    nodes: Vec<Node>,
    memo: HashMap<(ComponentId, BindingRequest), NodeId>,
    interned: HashMap<(ComponentId, BindingRequest), NodeId>,
}

/// Arenas handed over to the graph once resolution is finished
pub(crate) struct ResolverParts {
    pub bindings: Vec<DeclaredBinding>,
    pub nodes: Vec<Node>,
    pub memo: HashMap<(ComponentId, BindingRequest), NodeId>,
}

impl<'a> Resolver<'a> {
    /// Index every declaration of every component
    ///
    /// Module bindings come first in module order, followed by the bindings
    /// each component gets implicitly.
    pub fn new(tree: &'a ComponentTree, catalog: &'a TypeCatalog) -> Self {
        let mut resolver = Self {
            tree,
            catalog,
            bindings: Vec::new(),
            index: Vec::new(),
            nodes: Vec::new(),
            memo: HashMap::new(),
            interned: HashMap::new(),
        };
        for component in tree.ids() {
            let mut index = ComponentIndex::default();
            let descriptor = tree.get(component);
            let declared = descriptor.modules.iter().flat_map(|module| {
                module
                    .bindings
                    .iter()
                    .map(move |b| (b.clone(), Some(module.name.clone())))
            });
            let synthesized = tree
                .synthesized_bindings(component)
                .into_iter()
                .map(|b| (b, None));
            for (binding, module) in declared.chain(synthesized) {
                let id = BindingId(resolver.bindings.len());
                index
                    .by_key
                    .entry(binding.key.aggregate())
                    .or_default()
                    .push(id);
                if binding.key.is_contribution() {
                    index.by_key.entry(binding.key.clone()).or_default().push(id);
                }
                resolver.bindings.push(DeclaredBinding {
                    binding,
                    component,
                    module,
                });
            }
            resolver.index.push(index);
        }
        resolver
    }

    /// Binding by id
    pub fn binding(&self, id: BindingId) -> &DeclaredBinding {
        &self.bindings[id.0]
    }

    /// Node by id
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub(crate) fn into_parts(self) -> ResolverParts {
        ResolverParts {
            bindings: self.bindings,
            nodes: self.nodes,
            memo: self.memo,
        }
    }

    fn local(&self, component: ComponentId, key: &Key) -> &[BindingId] {
        self.index[component.0]
            .by_key
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn depth(&self, component: ComponentId) -> usize {
        self.tree.depth(component)
    }

    /// Resolve a request from a component, memoized
    pub fn resolve(&mut self, component: ComponentId, request: &BindingRequest) -> NodeId {
        let memo_key = (component, request.clone());
        if let Some(node) = self.memo.get(&memo_key) {
            return *node;
        }
        let resolved = match request {
            BindingRequest::Provision(key) => self.resolve_provision(component, key),
            BindingRequest::MembersInjection(key) => {
                self.resolve_members_injection(component, key)
            }
        };
        trace!(
            component = %self.tree.get(component).name,
            owner = %self.tree.get(resolved.owner).name,
            key = %request.key(),
            resolved = resolved.is_resolved(),
            "Resolved request"
        );
        let node = self.intern(resolved);
        self.memo.insert(memo_key, node);
        node
    }

    fn intern(&mut self, resolved: ResolvedBindings) -> NodeId {
        let identity = (resolved.owner, resolved.request.clone());
        if let Some(node) = self.interned.get(&identity) {
            return *node;
        }
        let node = NodeId(self.nodes.len());
        self.nodes.push(Node {
            resolved,
            edges: Vec::new(),
            expanded: false,
        });
        self.interned.insert(identity, node);
        node
    }

    fn resolve_provision(&mut self, component: ComponentId, key: &Key) -> ResolvedBindings {
        let chain = self.tree.ancestry(component);
        let mut resolved =
            ResolvedBindings::empty(component, BindingRequest::Provision(key.clone()));
        let provider_values = key.unwrap_provider_values();
        let optional_value = optional_value(key);
        let mut declaring = None;

        for &level in &chain {
            let mut found = false;
            for &id in self.local(level, key) {
                found = true;
                let binding = &self.bindings[id.0].binding;
                if key.is_contribution() {
                    resolved.unique.push(id);
                    continue;
                }
                match binding.kind {
                    BindingKind::MultibindingDeclaration { .. } => {
                        resolved.multibinding_declarations.push(id);
                    }
                    BindingKind::OptionalPresence { .. } => resolved.optional_declarations.push(id),
                    _ if binding.is_multibinding_contribution() => resolved.contributions.push(id),
                    _ => resolved.unique.push(id),
                }
            }
            if let Some(values_key) = &provider_values {
                for &id in self.local(level, values_key) {
                    let binding = &self.bindings[id.0].binding;
                    if binding.is_multibinding_contribution() {
                        resolved.contributions.push(id);
                    } else if matches!(binding.kind, BindingKind::MultibindingDeclaration { .. }) {
                        resolved.multibinding_declarations.push(id);
                    } else {
                        continue;
                    }
                    found = true;
                    resolved.value_request = RequestKind::Provider;
                }
            }
            if let Some((optional_key, kind)) = &optional_value {
                for &id in self.local(level, optional_key) {
                    if matches!(
                        self.bindings[id.0].binding.kind,
                        BindingKind::OptionalPresence { .. }
                    ) {
                        found = true;
                        resolved.optional_declarations.push(id);
                        resolved.value_request = *kind;
                    }
                }
            }
            if found {
                declaring = Some(level);
            }
        }

        let Some(declaring) = declaring else {
            if let Some(binding) = self.catalog.constructor_binding(key) {
                let owner = self.implicit_owner(component, &self.dependency_requests(&binding));
                if let Some(node) = self.interned.get(&(owner, resolved.request.clone())) {
                    return self.nodes[node.0].resolved.clone();
                }
                let id = self.push_implicit(binding, owner);
                resolved.owner = owner;
                resolved.implicit = Some(id);
                resolved.primary = Some(id);
            } else {
                debug!(
                    component = %self.tree.get(component).name,
                    key = %key,
                    "No binding found"
                );
            }
            return resolved;
        };

        resolved.primary = self.deepest(&resolved.unique);
        let start = self.float_roots(&resolved);
        resolved.owner = self.float_owner(component, declaring, &start);
        resolved
    }

    fn resolve_members_injection(&mut self, component: ComponentId, key: &Key) -> ResolvedBindings {
        let mut resolved =
            ResolvedBindings::empty(component, BindingRequest::MembersInjection(key.clone()));
        let binding = self
            .catalog
            .members_injection_binding(key)
            .unwrap_or_else(|| Binding {
                key: key.aggregate(),
                kind: BindingKind::MembersInjection,
                declared_type: key.type_name.clone(),
                dependencies: Vec::new(),
                nullable: false,
                element: None,
                location: SourceLocation::element(key.type_name.name()),
            });
        let id = self.push_implicit(binding, component);
        resolved.implicit = Some(id);
        resolved.primary = Some(id);
        resolved
    }

    fn push_implicit(&mut self, binding: Binding, component: ComponentId) -> BindingId {
        let id = BindingId(self.bindings.len());
        self.bindings.push(DeclaredBinding {
            binding,
            component,
            module: None,
        });
        id
    }

    /// Deepest declaration wins; declaration order breaks ties
    fn deepest(&self, candidates: &[BindingId]) -> Option<BindingId> {
        let mut best: Option<(usize, BindingId)> = None;
        for &id in candidates {
            let depth = self.depth(self.bindings[id.0].component);
            if best.is_none_or(|(d, _)| depth > d) {
                best = Some((depth, id));
            }
        }
        best.map(|(_, id)| id)
    }

    fn float_roots(&self, resolved: &ResolvedBindings) -> Vec<BindingRequest> {
        let mut roots = Vec::new();
        let followed: Vec<BindingId> = match resolved.primary {
            Some(primary) => vec![primary],
            None => resolved
                .contributions
                .iter()
                .chain(&resolved.optional_declarations)
                .copied()
                .collect(),
        };
        for id in followed {
            roots.extend(self.dependency_requests(&self.bindings[id.0].binding));
        }
        roots
    }

    fn dependency_requests(&self, binding: &Binding) -> Vec<BindingRequest> {
        let mut requests: Vec<BindingRequest> = binding
            .dependencies
            .iter()
            .map(BindingRequest::for_dependency)
            .collect();
        if let BindingKind::OptionalPresence { underlying } = &binding.kind {
            requests.push(BindingRequest::Provision(underlying.clone()));
        }
        requests
    }

    fn float_owner(
        &self,
        requester: ComponentId,
        declaring: ComponentId,
        start: &[BindingRequest],
    ) -> ComponentId {
        if requester == declaring || start.is_empty() {
            return declaring;
        }
        for &level in self.tree.ancestry(requester).iter().rev() {
            if level == declaring {
                break;
            }
            if self.depends_on_local(level, start) {
                debug!(
                    from = %self.tree.get(declaring).name,
                    to = %self.tree.get(level).name,
                    "Re-resolving binding below its declaring component"
                );
                return level;
            }
        }
        declaring
    }

    /// Highest ancestor of `requester` from which `start` resolves the same way
    ///
    /// That is the deepest component declaring anything the dependencies reach,
    /// or the root when they reach no declaration at all.
    fn implicit_owner(&self, requester: ComponentId, start: &[BindingRequest]) -> ComponentId {
        let chain = self.tree.ancestry(requester);
        let mut deepest = 0;
        let mut stack: Vec<BindingRequest> = start.to_vec();
        let mut visited = HashSet::new();
        while let Some(request) = stack.pop() {
            if deepest + 1 == chain.len() {
                break;
            }
            if !visited.insert(request.clone()) {
                continue;
            }
            let BindingRequest::Provision(key) = &request else {
                if let Some(binding) = self.catalog.members_injection_binding(request.key()) {
                    stack.extend(self.dependency_requests(&binding));
                }
                continue;
            };
            let mut explicit = false;
            for (depth, &level) in chain.iter().enumerate() {
                for &id in self.visible_ids(level, key) {
                    explicit = true;
                    deepest = deepest.max(depth);
                    stack.extend(self.dependency_requests(&self.bindings[id.0].binding));
                }
            }
            if !explicit {
                if let Some(binding) = self.catalog.constructor_binding(key) {
                    stack.extend(self.dependency_requests(&binding));
                }
            }
        }
        chain[deepest]
    }

    /// Whether following `start` from `component` reaches a multibinding or
    /// optional declaration made in `component` itself
    fn depends_on_local(&self, component: ComponentId, start: &[BindingRequest]) -> bool {
        let chain = self.tree.ancestry(component);
        let mut stack: Vec<BindingRequest> = start.to_vec();
        let mut visited = HashSet::new();
        while let Some(request) = stack.pop() {
            if !visited.insert(request.clone()) {
                continue;
            }
            let BindingRequest::Provision(key) = &request else {
                if let Some(binding) = self.catalog.members_injection_binding(request.key()) {
                    stack.extend(self.dependency_requests(&binding));
                }
                continue;
            };
            if self.has_local_aggregate(component, key) {
                return true;
            }
            let mut explicit = false;
            for &level in &chain {
                for &id in self.visible_ids(level, key) {
                    explicit = true;
                    stack.extend(self.dependency_requests(&self.bindings[id.0].binding));
                }
            }
            if !explicit {
                if let Some(binding) = self.catalog.constructor_binding(key) {
                    stack.extend(self.dependency_requests(&binding));
                }
            }
        }
        false
    }

    fn visible_ids(&self, level: ComponentId, key: &Key) -> Vec<&BindingId> {
        let mut ids: Vec<&BindingId> = self.local(level, key).iter().collect();
        if let Some(values_key) = key.unwrap_provider_values() {
            ids.extend(self.local(level, &values_key));
        }
        if let Some((optional_key, _)) = optional_value(key) {
            ids.extend(self.local(level, &optional_key));
        }
        ids
    }

    fn has_local_aggregate(&self, component: ComponentId, key: &Key) -> bool {
        self.visible_ids(component, key).into_iter().any(|id| {
            let binding = &self.bindings[id.0].binding;
            binding.is_multibinding_contribution()
                || matches!(
                    binding.kind,
                    BindingKind::MultibindingDeclaration { .. } | BindingKind::OptionalPresence { .. }
                )
        })
    }

    /// Compute the outgoing edges of a node once
    ///
    /// Dependencies are resolved from the node's owner. Multibinding nodes get
    /// one edge per contribution; optional nodes get an edge to the value when it
    /// is bound.
    pub fn expand(&mut self, node: NodeId) -> &[Edge] {
        if !self.nodes[node.0].expanded {
            let edges = self.compute_edges(node);
            let entry = &mut self.nodes[node.0];
            entry.edges = edges;
            entry.expanded = true;
        }
        &self.nodes[node.0].edges
    }

    fn compute_edges(&mut self, node: NodeId) -> Vec<Edge> {
        let resolved = self.nodes[node.0].resolved.clone();
        let owner = resolved.owner;
        let mut edges = Vec::new();

        if let Some(primary) = resolved.primary {
            let dependencies = self.bindings[primary.0].binding.dependencies.clone();
            for request in dependencies {
                let target = self.resolve(owner, &BindingRequest::for_dependency(&request));
                edges.push(Edge {
                    target,
                    kind: request.kind,
                    request: Some(request),
                });
            }
        } else if resolved.is_multibinding() {
            for id in &resolved.contributions {
                let key = self.bindings[id.0].binding.key.clone();
                let target = self.resolve(owner, &BindingRequest::Provision(key));
                edges.push(Edge {
                    target,
                    kind: resolved.value_request,
                    request: None,
                });
            }
        } else if let Some(first) = resolved.optional_declarations.first() {
            if let BindingKind::OptionalPresence { underlying } = &self.bindings[first.0].binding.kind {
                let underlying = underlying.clone();
                let target = self.resolve(owner, &BindingRequest::Provision(underlying));
                if self.nodes[target.0].resolved.is_resolved() {
                    edges.push(Edge {
                        target,
                        kind: resolved.value_request,
                        request: None,
                    });
                }
            }
        }
        edges
    }
}

/// For `Optional<Provider<T>>`-shaped keys, the plain optional key and the wrapper kind
fn optional_value(key: &Key) -> Option<(Key, RequestKind)> {
    let arguments = key.type_name.arguments();
    if arguments.len() != 1 {
        return None;
    }
    let (kind, inner) = RequestKind::from_declared_type(&arguments[0]);
    if !kind.is_deferred() {
        return None;
    }
    Some((key.with_type(key.type_name.with_arguments(vec![inner])), kind))
}
