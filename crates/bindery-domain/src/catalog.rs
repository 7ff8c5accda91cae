//! Type catalog
//!
//! Types known to the scanner, with their `@Inject` constructors and injected
//! members. Implicit constructor-injection and members-injection bindings are
//! synthesized from here.

use crate::binding::{Binding, BindingElement, BindingKind};
use crate::value_objects::{
    DependencyRequest, Key, Qualifier, RequestSite, SourceLocation, TypeName,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Shape of a declared type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    /// Concrete class
    #[default]
    Class,
    /// Interface
    Interface,
    /// Abstract class
    AbstractClass,
}

/// Constructor or method parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name
    pub name: String,
    /// Type as written, including framework wrappers
    #[serde(rename = "type")]
    pub declared_type: TypeName,
    /// Qualifier annotation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<Qualifier>,
    /// Annotated as accepting null
    #[serde(default)]
    pub nullable: bool,
}

impl Parameter {
    /// Unqualified, non-null parameter
    pub fn new<T: Into<TypeName>>(name: &str, declared_type: T) -> Self {
        Self {
            name: name.to_string(),
            declared_type: declared_type.into(),
            qualifier: None,
            nullable: false,
        }
    }

    /// Attach a qualifier
    pub fn qualified<Q: Into<String>>(mut self, qualifier: Q) -> Self {
        self.qualifier = Some(Qualifier::new(qualifier));
        self
    }

    /// Mark as accepting null
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    fn request(&self, site: RequestSite, bindings: &BTreeMap<String, TypeName>) -> DependencyRequest {
        let mut request = DependencyRequest::new(self.declared_type.substitute(bindings), site);
        request.key.qualifier = self.qualifier.clone();
        request.nullable = self.nullable;
        request
    }
}

/// Field or method marked for injection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "member", rename_all = "snake_case")]
pub enum InjectedMember {
    /// Injected field
    Field {
        /// The field, as a parameter
        field: Parameter,
        /// Declared `static`
        #[serde(default)]
        is_static: bool,
    },
    /// Injected method
    Method {
        /// Method name
        name: String,
        /// Parameters in order
        parameters: Vec<Parameter>,
        /// Declared `static`
        #[serde(default)]
        is_static: bool,
    },
}

impl InjectedMember {
    /// Whether the member is static
    pub fn is_static(&self) -> bool {
        match self {
            Self::Field { is_static, .. } | Self::Method { is_static, .. } => *is_static,
        }
    }

    /// Member name
    pub fn name(&self) -> &str {
        match self {
            Self::Field { field, .. } => &field.name,
            Self::Method { name, .. } => name,
        }
    }
}

/// A type known to the scanner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDeclaration {
    /// Qualified name without type arguments
    pub name: String,
    /// Class, interface or abstract class
    #[serde(default)]
    pub kind: TypeKind,
    /// Declared type variables
    #[serde(default)]
    pub type_parameters: Vec<String>,
    /// Parameters of the `@Inject` constructor, if there is one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inject_constructor: Option<Vec<Parameter>>,
    /// Injected fields and methods, superclass members first
    #[serde(default)]
    pub injected_members: Vec<InjectedMember>,
    /// Source position
    #[serde(default)]
    pub location: SourceLocation,
}

impl TypeDeclaration {
    fn new(name: &str, kind: TypeKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            type_parameters: Vec::new(),
            inject_constructor: None,
            injected_members: Vec::new(),
            location: SourceLocation::element(name),
        }
    }

    /// Concrete class
    pub fn class(name: &str) -> Self {
        Self::new(name, TypeKind::Class)
    }

    /// Interface
    pub fn interface(name: &str) -> Self {
        Self::new(name, TypeKind::Interface)
    }

    /// Abstract class
    pub fn abstract_class(name: &str) -> Self {
        Self::new(name, TypeKind::AbstractClass)
    }

    /// Declare type variables
    pub fn with_type_parameters(mut self, parameters: &[&str]) -> Self {
        self.type_parameters = parameters.iter().map(|p| (*p).to_string()).collect();
        self
    }

    /// Declare an `@Inject` constructor
    pub fn with_inject_constructor(mut self, parameters: Vec<Parameter>) -> Self {
        self.inject_constructor = Some(parameters);
        self
    }

    /// Declare an injected field
    pub fn with_field(mut self, field: Parameter) -> Self {
        self.injected_members.push(InjectedMember::Field {
            field,
            is_static: false,
        });
        self
    }

    /// Declare an injected static field
    pub fn with_static_field(mut self, field: Parameter) -> Self {
        self.injected_members.push(InjectedMember::Field {
            field,
            is_static: true,
        });
        self
    }

    /// Declare an injected method
    pub fn with_method(mut self, name: &str, parameters: Vec<Parameter>) -> Self {
        self.injected_members.push(InjectedMember::Method {
            name: name.to_string(),
            parameters,
            is_static: false,
        });
        self
    }

    /// Whether this type is generic but used without arguments
    pub fn is_raw_use(&self, used: &TypeName) -> bool {
        !self.type_parameters.is_empty() && used.arguments().is_empty()
    }

    /// Whether any instance member is injected
    pub fn has_injected_members(&self) -> bool {
        self.injected_members.iter().any(|m| !m.is_static())
    }

    /// Whether a constructor-injection binding could ever exist for this type
    pub fn is_constructible(&self) -> bool {
        self.kind == TypeKind::Class
    }

    fn type_bindings(&self, used: &TypeName) -> Option<BTreeMap<String, TypeName>> {
        let arguments = used.arguments();
        if arguments.len() != self.type_parameters.len() || used.has_wildcard_arguments() {
            return None;
        }
        Some(
            self.type_parameters
                .iter()
                .cloned()
                .zip(arguments.iter().cloned())
                .collect(),
        )
    }

    fn member_requests(&self, bindings: &BTreeMap<String, TypeName>) -> Vec<DependencyRequest> {
        let mut requests = Vec::new();
        for member in self.injected_members.iter().filter(|m| !m.is_static()) {
            match member {
                InjectedMember::Field { field, .. } => {
                    requests.push(field.request(RequestSite::field(&self.name, &field.name), bindings));
                }
                InjectedMember::Method {
                    name, parameters, ..
                } => {
                    for parameter in parameters {
                        let site = RequestSite::method(&self.name, name, &parameter.name);
                        requests.push(parameter.request(site, bindings));
                    }
                }
            }
        }
        requests
    }

    /// Implicit binding for `key` through the `@Inject` constructor
    ///
    /// Type arguments of the key are substituted into the constructor parameters
    /// and injected members. Qualified keys, wildcard arguments and raw uses of
    /// generic types never get an implicit binding.
    pub fn constructor_binding(&self, key: &Key) -> Option<Binding> {
        if key.qualifier.is_some() || !self.is_constructible() {
            return None;
        }
        let parameters = self.inject_constructor.as_ref()?;
        let bindings = self.type_bindings(&key.type_name)?;

        let mut dependencies: Vec<DependencyRequest> = parameters
            .iter()
            .map(|p| p.request(RequestSite::constructor(&self.name, &p.name), &bindings))
            .collect();
        dependencies.extend(self.member_requests(&bindings));

        Some(Binding {
            key: key.aggregate(),
            kind: BindingKind::ConstructorInjection,
            declared_type: key.type_name.clone(),
            dependencies,
            nullable: false,
            element: Some(BindingElement {
                owner: self.name.clone(),
                name: "<init>".to_string(),
            }),
            location: self.location.clone(),
        })
    }

    /// Members-injection binding for `key`
    pub fn members_injection_binding(&self, key: &Key) -> Option<Binding> {
        let bindings = self.type_bindings(&key.type_name)?;
        Some(Binding {
            key: key.aggregate(),
            kind: BindingKind::MembersInjection,
            declared_type: key.type_name.clone(),
            dependencies: self.member_requests(&bindings),
            nullable: false,
            element: None,
            location: self.location.clone(),
        })
    }
}

/// All types known to the scanner, by qualified name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCatalog {
    types: BTreeMap<String, TypeDeclaration>,
}

impl TypeCatalog {
    /// Empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a type
    pub fn insert(&mut self, declaration: TypeDeclaration) {
        self.types.insert(declaration.name.clone(), declaration);
    }

    /// Builder form of [`TypeCatalog::insert`]
    pub fn with_type(mut self, declaration: TypeDeclaration) -> Self {
        self.insert(declaration);
        self
    }

    /// Look up a type by qualified name
    pub fn get(&self, name: &str) -> Option<&TypeDeclaration> {
        self.types.get(name)
    }

    /// Look up the declaration of a used type
    pub fn declaration_of(&self, type_name: &TypeName) -> Option<&TypeDeclaration> {
        if type_name.is_wildcard() {
            return None;
        }
        self.get(type_name.name())
    }

    /// All types in name order
    pub fn iter(&self) -> impl Iterator<Item = &TypeDeclaration> {
        self.types.values()
    }

    /// Number of known types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Implicit constructor-injection binding for a key, if one exists
    pub fn constructor_binding(&self, key: &Key) -> Option<Binding> {
        self.declaration_of(&key.type_name)?.constructor_binding(key)
    }

    /// Members-injection binding for a key, if the type is known
    pub fn members_injection_binding(&self, key: &Key) -> Option<Binding> {
        self.declaration_of(&key.type_name)?
            .members_injection_binding(key)
    }
}
