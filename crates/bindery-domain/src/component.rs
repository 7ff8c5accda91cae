//! Component tree
//!
//! Components are the nested scopes of the graph. The tree is an arena indexed
//! by [`ComponentId`]; each descriptor points back at its parent and lists its
//! children in declaration order.

use crate::binding::{Binding, BindingElement, BindingKind};
use crate::error::{Error, Result};
use crate::value_objects::{
    DependencyRequest, Key, Qualifier, RequestKind, RequestSite, SourceLocation, TypeName,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Index of a component in its [`ComponentTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(pub usize);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A module and the bindings it declares, in declaration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    /// Qualified module name
    pub name: String,
    /// Declared `abstract` (or an interface)
    #[serde(default)]
    pub is_abstract: bool,
    /// Declared bindings
    #[serde(default)]
    pub bindings: Vec<Binding>,
    /// Source position
    #[serde(default)]
    pub location: SourceLocation,
}

impl ModuleDescriptor {
    /// Concrete module
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            is_abstract: false,
            bindings: Vec::new(),
            location: SourceLocation::element(name),
        }
    }

    /// Abstract module
    pub fn abstract_module(name: &str) -> Self {
        Self {
            is_abstract: true,
            ..Self::new(name)
        }
    }

    /// Declare a binding in this module
    pub fn with_binding(mut self, binding: Binding) -> Self {
        self.bindings.push(binding.declared_in(&self.name));
        self
    }
}

/// Provision method exposed by a component dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionMethod {
    /// Method name
    pub method: String,
    /// Returned type
    #[serde(rename = "type")]
    pub declared_type: TypeName,
    /// Qualifier on the method
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<Qualifier>,
    /// Annotated as returning null
    #[serde(default)]
    pub nullable: bool,
}

/// A declared "depends-on" edge of a component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDependency {
    /// Qualified name of the dependency type
    pub type_name: String,
    /// Its provision methods, each a binding in the dependent component
    #[serde(default)]
    pub provisions: Vec<ProvisionMethod>,
}

impl ComponentDependency {
    /// Dependency on a type
    pub fn new(type_name: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            provisions: Vec::new(),
        }
    }

    /// Expose a provision method
    pub fn with_provision<T: Into<TypeName>>(mut self, method: &str, declared_type: T) -> Self {
        self.provisions.push(ProvisionMethod {
            method: method.to_string(),
            declared_type: declared_type.into(),
            qualifier: None,
            nullable: false,
        });
        self
    }

    /// Expose a provision method that may return null
    pub fn with_nullable_provision<T: Into<TypeName>>(
        mut self,
        method: &str,
        declared_type: T,
    ) -> Self {
        self.provisions.push(ProvisionMethod {
            method: method.to_string(),
            declared_type: declared_type.into(),
            qualifier: None,
            nullable: true,
        });
        self
    }
}

/// Whether an entry point returns a value or injects into an argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryPointKind {
    /// `T get()`
    Provision,
    /// `void inject(T)` or `T inject(T)`
    MembersInjection,
}

/// A request made by the component's own interface
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryPoint {
    /// Method name
    pub method: String,
    /// Provision or members injection
    pub kind: EntryPointKind,
    /// The request
    pub request: DependencyRequest,
}

impl EntryPoint {
    /// Provision method returning `declared_type`
    pub fn provision<T: Into<TypeName>>(method: &str, declared_type: T) -> Self {
        Self {
            method: method.to_string(),
            kind: EntryPointKind::Provision,
            request: DependencyRequest::new(
                declared_type,
                RequestSite::component_method("", method, None),
            ),
        }
    }

    /// Members-injection method taking `declared_type`
    pub fn members_injection<T: Into<TypeName>>(method: &str, declared_type: T) -> Self {
        let type_name: TypeName = declared_type.into();
        let site = RequestSite::component_method("", method, Some(type_name.to_string()));
        Self {
            method: method.to_string(),
            kind: EntryPointKind::MembersInjection,
            request: DependencyRequest::for_key(
                Key::new(type_name),
                RequestKind::MembersInjector,
                site,
            ),
        }
    }

    /// Qualify the requested key
    pub fn qualified<Q: Into<String>>(mut self, qualifier: Q) -> Self {
        self.request = self.request.qualified(qualifier);
        self
    }

    /// Mark the method as returning a nullable value
    pub fn nullable(mut self) -> Self {
        self.request = self.request.nullable();
        self
    }

    fn declared_in(mut self, component: &str) -> Self {
        if let RequestSite::ComponentMethod {
            component: site_component,
            ..
        } = &mut self.request.site
        {
            if site_component.is_empty() {
                *site_component = component.to_string();
            }
        }
        self
    }
}

/// One scope in the component tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDescriptor {
    /// Qualified component name
    pub name: String,
    /// Parent component for subcomponents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ComponentId>,
    /// Child components in declaration order
    #[serde(default)]
    pub children: Vec<ComponentId>,
    /// Key of the child's builder or factory, when it has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<Key>,
    /// Installed modules in declaration order
    #[serde(default)]
    pub modules: Vec<ModuleDescriptor>,
    /// Declared component dependencies
    #[serde(default)]
    pub dependencies: Vec<ComponentDependency>,
    /// Entry-point methods
    #[serde(default)]
    pub entry_points: Vec<EntryPoint>,
    /// Source position
    #[serde(default)]
    pub location: SourceLocation,
}

impl ComponentDescriptor {
    /// Component without declarations
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parent: None,
            children: Vec::new(),
            creator: None,
            modules: Vec::new(),
            dependencies: Vec::new(),
            entry_points: Vec::new(),
            location: SourceLocation::element(name),
        }
    }

    /// Install a module
    pub fn with_module(mut self, module: ModuleDescriptor) -> Self {
        self.modules.push(module);
        self
    }

    /// Declare a component dependency
    pub fn with_dependency(mut self, dependency: ComponentDependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    /// Add an entry point
    pub fn with_entry_point(mut self, entry_point: EntryPoint) -> Self {
        self.entry_points.push(entry_point.declared_in(&self.name));
        self
    }

    /// Set the builder or factory type used by the parent to create this component
    pub fn with_creator<T: Into<TypeName>>(mut self, creator: T) -> Self {
        self.creator = Some(Key::new(creator));
        self
    }

    /// Attach a source location
    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = location;
        self
    }

    /// Key under which the parent can obtain this component
    pub fn creator_key(&self) -> Key {
        self.creator
            .clone()
            .unwrap_or_else(|| Key::new(TypeName::declared(&self.name)))
    }

    fn component_binding(&self, key: Key, kind: BindingKind, method: Option<&str>) -> Binding {
        Binding {
            declared_type: key.type_name.clone(),
            key,
            kind,
            dependencies: Vec::new(),
            nullable: false,
            element: method.map(|m| BindingElement {
                owner: self.name.clone(),
                name: m.to_string(),
            }),
            location: self.location.clone(),
        }
    }
}

/// Arena of components
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentTree {
    components: Vec<ComponentDescriptor>,
}

impl ComponentTree {
    /// Empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a tree handed over as JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let tree: Self = serde_json::from_str(json)?;
        tree.validate_structure()?;
        Ok(tree)
    }

    /// Read and parse a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            Error::io_with_source(format!("Failed to read {}", path.display()), e)
        })?;
        Self::from_json(&json)
    }

    /// Add a root component
    pub fn add_root(&mut self, mut descriptor: ComponentDescriptor) -> ComponentId {
        let id = ComponentId(self.components.len());
        descriptor.parent = None;
        descriptor.children.clear();
        self.components.push(descriptor);
        id
    }

    /// Add a child component under `parent`
    pub fn add_child(
        &mut self,
        parent: ComponentId,
        mut descriptor: ComponentDescriptor,
    ) -> Result<ComponentId> {
        if parent.0 >= self.components.len() {
            return Err(Error::unknown_component(parent.to_string()));
        }
        let id = ComponentId(self.components.len());
        descriptor.parent = Some(parent);
        descriptor.children.clear();
        self.components.push(descriptor);
        self.components[parent.0].children.push(id);
        Ok(id)
    }

    /// Descriptor for an id
    ///
    /// Ids are only created by this tree, so an out-of-range id is a caller bug.
    pub fn get(&self, id: ComponentId) -> &ComponentDescriptor {
        &self.components[id.0]
    }

    /// Number of components
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether the tree is empty
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// All ids in insertion order
    pub fn ids(&self) -> impl Iterator<Item = ComponentId> + '_ {
        (0..self.components.len()).map(ComponentId)
    }

    /// Root components in insertion order
    pub fn roots(&self) -> Vec<ComponentId> {
        self.ids()
            .filter(|id| self.get(*id).parent.is_none())
            .collect()
    }

    /// Parent of a component
    pub fn parent(&self, id: ComponentId) -> Option<ComponentId> {
        self.get(id).parent
    }

    /// Chain from the root down to and including `id`
    pub fn ancestry(&self, id: ComponentId) -> Vec<ComponentId> {
        let mut chain = vec![id];
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            if chain.contains(&parent) {
                break;
            }
            chain.push(parent);
            current = parent;
        }
        chain.reverse();
        chain
    }

    /// Number of ancestors
    pub fn depth(&self, id: ComponentId) -> usize {
        self.ancestry(id).len() - 1
    }

    /// Pre-order traversal: each root followed by its descendants, children in order
    pub fn preorder(&self) -> Vec<ComponentId> {
        let mut order = Vec::with_capacity(self.components.len());
        for root in self.roots() {
            let mut stack = vec![root];
            while let Some(id) = stack.pop() {
                order.push(id);
                stack.extend(self.get(id).children.iter().rev().copied());
            }
        }
        order
    }

    /// Find a component by qualified name
    pub fn find(&self, name: &str) -> Option<ComponentId> {
        self.ids().find(|id| self.get(*id).name == name)
    }

    /// Names from the root down to `id`
    pub fn path_names(&self, id: ComponentId) -> Vec<&str> {
        self.ancestry(id)
            .into_iter()
            .map(|c| self.get(c).name.as_str())
            .collect()
    }

    /// Check parent/child links for dangling ids and composition cycles
    pub fn validate_structure(&self) -> Result<()> {
        for id in self.ids() {
            let descriptor = self.get(id);
            if let Some(parent) = descriptor.parent {
                if parent.0 >= self.len() {
                    return Err(Error::unknown_component(parent.to_string()));
                }
                if !self.get(parent).children.contains(&id) {
                    return Err(Error::invalid_declaration(format!(
                        "{} names {} as parent, but is not among its children",
                        descriptor.name,
                        self.get(parent).name
                    )));
                }
            }
            for child in &descriptor.children {
                if child.0 >= self.len() {
                    return Err(Error::unknown_component(child.to_string()));
                }
                if self.get(*child).parent != Some(id) {
                    return Err(Error::invalid_declaration(format!(
                        "{} lists {} as a child with a different parent",
                        descriptor.name,
                        self.get(*child).name
                    )));
                }
            }
            let mut seen = vec![id];
            let mut current = id;
            while let Some(parent) = self.parent(current) {
                if seen.contains(&parent) {
                    return Err(Error::invalid_declaration(format!(
                        "{} is its own ancestor",
                        self.get(parent).name
                    )));
                }
                seen.push(parent);
                current = parent;
            }
        }
        Ok(())
    }

    /// Bindings every component gets without declaring them
    ///
    /// In order: the component instance, each dependency instance followed by
    /// its provision methods, and one creator binding per child.
    pub fn synthesized_bindings(&self, id: ComponentId) -> Vec<Binding> {
        let descriptor = self.get(id);
        let mut bindings = vec![descriptor.component_binding(
            Key::new(TypeName::declared(&descriptor.name)),
            BindingKind::ComponentInstance,
            None,
        )];

        for dependency in &descriptor.dependencies {
            bindings.push(descriptor.component_binding(
                Key::new(TypeName::declared(&dependency.type_name)),
                BindingKind::ComponentDependency,
                None,
            ));
            for provision in &dependency.provisions {
                let mut binding = descriptor.component_binding(
                    Key::new(provision.declared_type.clone())
                        .with_qualifier(provision.qualifier.clone()),
                    BindingKind::ComponentDependencyMethod {
                        dependency: dependency.type_name.clone(),
                    },
                    Some(&provision.method),
                );
                binding.nullable = provision.nullable;
                bindings.push(binding);
            }
        }

        for child in &descriptor.children {
            let child = self.get(*child);
            bindings.push(descriptor.component_binding(
                child.creator_key(),
                BindingKind::SubcomponentCreator {
                    subcomponent: child.name.clone(),
                },
                None,
            ));
        }
        bindings
    }
}
