//! Bindings
//!
//! A binding is one way to produce the value for a key. Each kind is a variant
//! of [`BindingKind`]; dependency edges are kept in declaration order because
//! that order is the tie-break for traces.

use crate::constants::{MAP_TYPE, SET_TYPE};
use crate::value_objects::{
    ContributionId, DependencyRequest, Key, Qualifier, RequestSite, SourceLocation, TypeName,
};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Aggregation role of a provision or delegation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionType {
    /// The single owner of its key
    #[default]
    Unique,
    /// `@IntoSet`
    SetElement,
    /// `@ElementsIntoSet`
    SetValues,
    /// `@IntoMap` with the map-key annotation text
    MapEntry {
        /// Map key annotation, e.g. `@StringKey("a")`
        map_key: String,
    },
}

impl ContributionType {
    /// Whether the binding contributes to a multibinding
    pub fn is_multibinding(&self) -> bool {
        !matches!(self, Self::Unique)
    }

    /// Aggregate kind the contribution feeds, if any
    pub fn aggregate(&self) -> Option<AggregateKind> {
        match self {
            Self::Unique => None,
            Self::SetElement | Self::SetValues => Some(AggregateKind::Set),
            Self::MapEntry { .. } => Some(AggregateKind::Map),
        }
    }
}

/// Shape of a multibound aggregate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregateKind {
    /// `Set<T>`
    Set,
    /// `Map<K, V>`
    Map,
}

impl fmt::Display for AggregateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Set => write!(f, "Set"),
            Self::Map => write!(f, "Map"),
        }
    }
}

/// Closed set of binding kinds
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BindingKind {
    /// Implicit binding from an `@Inject` constructor
    ConstructorInjection,
    /// `@Provides` method
    Provision {
        /// Aggregation role
        #[serde(default)]
        contribution: ContributionType,
        /// Non-static method that needs a module instance
        #[serde(default)]
        requires_module_instance: bool,
    },
    /// `@Binds` method
    Delegation {
        /// Aggregation role
        #[serde(default)]
        contribution: ContributionType,
    },
    /// `@Multibinds` declaration of a possibly empty aggregate
    MultibindingDeclaration {
        /// Set or map
        aggregate: AggregateKind,
    },
    /// `@BindsOptionalOf` declaration
    OptionalPresence {
        /// Key of the optional value
        underlying: Key,
    },
    /// The component itself
    ComponentInstance,
    /// Instance of a component dependency
    ComponentDependency,
    /// Provision method of a component dependency
    ComponentDependencyMethod {
        /// Dependency type declaring the method
        dependency: String,
    },
    /// Factory or builder of a child component
    SubcomponentCreator {
        /// Child component type
        subcomponent: String,
    },
    /// Injection of fields and methods into an existing instance
    MembersInjection,
}

/// Declaring element of a binding, e.g. a module method
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BindingElement {
    /// Declaring module, component or type
    pub owner: String,
    /// Method name
    pub name: String,
}

/// One way to satisfy a key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Binding {
    /// Key satisfied by this binding; contributions carry a contribution tag
    pub key: Key,
    /// Kind and kind-specific payload
    #[serde(flatten)]
    pub kind: BindingKind,
    /// Return type as written at the declaration
    pub declared_type: TypeName,
    /// Dependency edges in declaration order
    #[serde(default)]
    pub dependencies: Vec<DependencyRequest>,
    /// Whether the binding may produce null
    #[serde(default)]
    pub nullable: bool,
    /// Declaring element
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<BindingElement>,
    /// Source position
    #[serde(default)]
    pub location: SourceLocation,
}

impl Binding {
    fn declared(kind: BindingKind, method: &str, declared_type: TypeName) -> Self {
        Self {
            key: Key::new(declared_type.clone()),
            kind,
            declared_type,
            dependencies: Vec::new(),
            nullable: false,
            element: Some(BindingElement {
                owner: String::new(),
                name: method.to_string(),
            }),
            location: SourceLocation::default(),
        }
    }

    /// `@Provides` method returning `declared_type`
    pub fn provides<T: Into<TypeName>>(method: &str, declared_type: T) -> Self {
        Self::declared(
            BindingKind::Provision {
                contribution: ContributionType::Unique,
                requires_module_instance: false,
            },
            method,
            declared_type.into(),
        )
    }

    /// `@Binds` method delegating `declared_type` to the implementation parameter
    pub fn binds<T: Into<TypeName>, S: Into<TypeName>>(
        method: &str,
        declared_type: T,
        parameter: &str,
        source: S,
    ) -> Self {
        Self::declared(
            BindingKind::Delegation {
                contribution: ContributionType::Unique,
            },
            method,
            declared_type.into(),
        )
        .with_parameter(parameter, source)
    }

    /// `@Multibinds` declaration of `aggregate_type`
    pub fn multibinds<T: Into<TypeName>>(method: &str, aggregate_type: T) -> Self {
        let declared_type: TypeName = aggregate_type.into();
        let aggregate = if declared_type.name() == MAP_TYPE {
            AggregateKind::Map
        } else {
            AggregateKind::Set
        };
        Self::declared(
            BindingKind::MultibindingDeclaration { aggregate },
            method,
            declared_type,
        )
    }

    /// `@BindsOptionalOf` declaration for `underlying`, satisfying `optional_type<underlying>`
    pub fn optional_of<T: Into<TypeName>>(method: &str, optional_type: &str, underlying: T) -> Self {
        let underlying: TypeName = underlying.into();
        let mut binding = Self::declared(
            BindingKind::OptionalPresence {
                underlying: Key::new(underlying.clone()),
            },
            method,
            underlying.clone(),
        );
        binding.key = Key::new(TypeName::generic(optional_type, vec![underlying]));
        binding
    }

    /// Add a method parameter dependency
    pub fn with_parameter<T: Into<TypeName>>(mut self, name: &str, declared_type: T) -> Self {
        let request = DependencyRequest::new(declared_type, self.parameter_site(name));
        self.dependencies.push(request);
        self
    }

    /// Add a qualified method parameter dependency
    pub fn with_qualified_parameter<T: Into<TypeName>>(
        mut self,
        name: &str,
        qualifier: &str,
        declared_type: T,
    ) -> Self {
        let request =
            DependencyRequest::new(declared_type, self.parameter_site(name)).qualified(qualifier);
        self.dependencies.push(request);
        self
    }

    /// Add an already built dependency
    pub fn with_dependency(mut self, request: DependencyRequest) -> Self {
        self.dependencies.push(request);
        self
    }

    fn parameter_site(&self, parameter: &str) -> RequestSite {
        let (owner, method) = self
            .element
            .as_ref()
            .map(|e| (e.owner.clone(), e.name.clone()))
            .unwrap_or_default();
        RequestSite::method(owner, method, parameter)
    }

    /// Qualify the bound key
    pub fn qualified<Q: Into<String>>(mut self, qualifier: Q) -> Self {
        self.key.qualifier = Some(Qualifier::new(qualifier));
        if let BindingKind::OptionalPresence { underlying } = &mut self.kind {
            underlying.qualifier = self.key.qualifier.clone();
        }
        self
    }

    /// Mark as possibly producing null
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Mark a `@Provides` method as non-static
    pub fn instance_method(mut self) -> Self {
        if let BindingKind::Provision {
            requires_module_instance,
            ..
        } = &mut self.kind
        {
            *requires_module_instance = true;
        }
        self
    }

    /// Attach a source location
    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = location;
        self
    }

    /// Contribute the returned element to `Set<T>`
    pub fn into_set(self) -> Self {
        let aggregate = TypeName::generic(SET_TYPE, vec![self.declared_type.clone()]);
        self.contributing(ContributionType::SetElement, aggregate)
    }

    /// Contribute all returned elements to the returned set type
    pub fn elements_into_set(self) -> Self {
        let aggregate = self.declared_type.clone();
        self.contributing(ContributionType::SetValues, aggregate)
    }

    /// Contribute the returned value to `Map<K, V>` under `map_key`
    pub fn into_map<K: Into<TypeName>>(self, map_key: &str, key_type: K) -> Self {
        let aggregate = TypeName::generic(
            MAP_TYPE,
            vec![key_type.into(), self.declared_type.clone()],
        );
        self.contributing(
            ContributionType::MapEntry {
                map_key: map_key.to_string(),
            },
            aggregate,
        )
    }

    fn contributing(mut self, role: ContributionType, aggregate: TypeName) -> Self {
        match &mut self.kind {
            BindingKind::Provision { contribution, .. } | BindingKind::Delegation { contribution } => {
                *contribution = role;
            }
            _ => return self,
        }
        self.key.type_name = aggregate;
        self
    }

    /// Record the declaring module or component
    ///
    /// Fills in the owner of the element and of parameter sites, and tags
    /// multibinding contributions so each one is a distinct key.
    pub fn declared_in(mut self, owner: &str) -> Self {
        if let Some(element) = &mut self.element {
            if element.owner.is_empty() {
                element.owner = owner.to_string();
            }
        }
        for request in &mut self.dependencies {
            if let RequestSite::MethodParameter { owner: site_owner, .. } = &mut request.site {
                if site_owner.is_empty() {
                    *site_owner = owner.to_string();
                }
            }
        }
        if self.contribution_type().is_multibinding() && !self.key.is_contribution() {
            let method = self.element.as_ref().map(|e| e.name.as_str()).unwrap_or_default();
            let id = ContributionId::new(format!("{owner}#{method}"));
            self.key = self.key.with_contribution(id);
        }
        if self.location.element.is_none() {
            self.location.element = self.element_path();
        }
        self
    }

    /// Aggregation role (unique for kinds that cannot contribute)
    pub fn contribution_type(&self) -> ContributionType {
        match &self.kind {
            BindingKind::Provision { contribution, .. } | BindingKind::Delegation { contribution } => {
                contribution.clone()
            }
            _ => ContributionType::Unique,
        }
    }

    /// Whether this binding is a multibinding contribution
    pub fn is_multibinding_contribution(&self) -> bool {
        self.contribution_type().is_multibinding()
    }

    /// Whether this binding claims sole ownership of its key
    pub fn is_unique(&self) -> bool {
        !matches!(
            self.kind,
            BindingKind::MultibindingDeclaration { .. } | BindingKind::OptionalPresence { .. }
        ) && !self.is_multibinding_contribution()
    }

    /// Whether this binding is declared in a module rather than synthesized
    pub fn is_module_declaration(&self) -> bool {
        matches!(
            self.kind,
            BindingKind::Provision { .. }
                | BindingKind::Delegation { .. }
                | BindingKind::MultibindingDeclaration { .. }
                | BindingKind::OptionalPresence { .. }
        )
    }

    /// `Owner.method` of the declaring element
    pub fn element_path(&self) -> Option<String> {
        self.element
            .as_ref()
            .map(|e| format!("{}.{}", e.owner, e.name))
    }

    fn annotations(&self) -> Vec<String> {
        let mut annotations = Vec::new();
        let kind = match &self.kind {
            BindingKind::ConstructorInjection => Some("@Inject"),
            BindingKind::Provision { .. } => Some("@Provides"),
            BindingKind::Delegation { .. } => Some("@Binds"),
            BindingKind::MultibindingDeclaration { .. } => Some("@Multibinds"),
            BindingKind::OptionalPresence { .. } => Some("@BindsOptionalOf"),
            _ => None,
        };
        annotations.extend(kind.map(str::to_string));
        match self.contribution_type() {
            ContributionType::Unique => {}
            ContributionType::SetElement => annotations.push("@IntoSet".to_string()),
            ContributionType::SetValues => annotations.push("@ElementsIntoSet".to_string()),
            ContributionType::MapEntry { map_key } => {
                annotations.push("@IntoMap".to_string());
                annotations.push(map_key);
            }
        }
        if let Some(qualifier) = &self.key.qualifier {
            annotations.push(qualifier.to_string());
        }
        if self.nullable {
            annotations.push("@Nullable".to_string());
        }
        annotations
    }
}

/// Declaration form used in diagnostics, e.g.
/// `@Provides test.Outer.A test.Outer.Module1.provideA1()`
impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parameters = self
            .dependencies
            .iter()
            .filter(|d| {
                matches!(
                    d.site,
                    RequestSite::MethodParameter { .. } | RequestSite::ConstructorParameter { .. }
                )
            })
            .map(DependencyRequest::requested_type)
            .join(", ");

        for annotation in self.annotations() {
            write!(f, "{annotation} ")?;
        }
        match (&self.kind, &self.element) {
            (BindingKind::ConstructorInjection, _) => {
                write!(f, "{}({parameters})", self.declared_type)
            }
            (BindingKind::MembersInjection, _) => {
                write!(f, "members of {}", self.declared_type)
            }
            (BindingKind::ComponentDependencyMethod { dependency }, Some(element)) => {
                write!(f, "{} {dependency}.{}()", self.declared_type, element.name)
            }
            (_, Some(element)) => write!(
                f,
                "{} {}.{}({parameters})",
                self.declared_type, element.owner, element.name
            ),
            (_, None) => write!(f, "{}", self.declared_type),
        }
    }
}
