//! Dependency requests
//!
//! A request is one edge out of a binding: the key it needs, how it asks for it
//! (directly or through a deferring wrapper) and where the request is written.

use super::{Key, Qualifier, TypeName};
use crate::constants::{LAZY_TYPE, MEMBERS_INJECTOR_TYPE, PROVIDER_TYPE};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a dependency is requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RequestKind {
    /// `T`
    #[default]
    Instance,
    /// `Provider<T>`
    Provider,
    /// `Lazy<T>`
    Lazy,
    /// `Provider<Lazy<T>>`
    ProviderOfLazy,
    /// `MembersInjector<T>`
    MembersInjector,
}

impl RequestKind {
    /// Deferred requests do not need the value while the requester is constructed
    pub fn is_deferred(self) -> bool {
        matches!(self, Self::Provider | Self::Lazy | Self::ProviderOfLazy)
    }

    /// Strip a framework wrapper off a declared type
    pub fn from_declared_type(declared: &TypeName) -> (RequestKind, TypeName) {
        if let Some(inner) = declared.unwrap_single(PROVIDER_TYPE) {
            if let Some(lazy) = inner.unwrap_single(LAZY_TYPE) {
                return (Self::ProviderOfLazy, lazy.clone());
            }
            return (Self::Provider, inner.clone());
        }
        if let Some(inner) = declared.unwrap_single(LAZY_TYPE) {
            return (Self::Lazy, inner.clone());
        }
        if let Some(inner) = declared.unwrap_single(MEMBERS_INJECTOR_TYPE) {
            return (Self::MembersInjector, inner.clone());
        }
        (Self::Instance, declared.clone())
    }

    /// Wrap a type the way this kind requests it
    pub fn wrap(self, type_name: &TypeName) -> TypeName {
        match self {
            Self::Instance => type_name.clone(),
            Self::Provider => TypeName::generic(PROVIDER_TYPE, vec![type_name.clone()]),
            Self::Lazy => TypeName::generic(LAZY_TYPE, vec![type_name.clone()]),
            Self::ProviderOfLazy => TypeName::generic(
                PROVIDER_TYPE,
                vec![TypeName::generic(LAZY_TYPE, vec![type_name.clone()])],
            ),
            Self::MembersInjector => {
                TypeName::generic(MEMBERS_INJECTOR_TYPE, vec![type_name.clone()])
            }
        }
    }
}

/// Where a request is written in source
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "site", rename_all = "snake_case")]
pub enum RequestSite {
    /// Parameter of an `@Inject` constructor
    ConstructorParameter {
        /// Declaring type
        owner: String,
        /// Parameter name
        parameter: String,
    },
    /// Injected field
    Field {
        /// Declaring type
        owner: String,
        /// Field name
        field: String,
    },
    /// Parameter of a module method or an injected method
    MethodParameter {
        /// Declaring module or type
        owner: String,
        /// Method name
        method: String,
        /// Parameter name
        parameter: String,
    },
    /// An entry-point method on a component
    ComponentMethod {
        /// Component type
        component: String,
        /// Method name
        method: String,
        /// Parameter type of a members-injection method
        #[serde(default, skip_serializing_if = "Option::is_none")]
        argument: Option<String>,
    },
}

impl RequestSite {
    /// Constructor parameter site
    pub fn constructor<O: Into<String>, P: Into<String>>(owner: O, parameter: P) -> Self {
        Self::ConstructorParameter {
            owner: owner.into(),
            parameter: parameter.into(),
        }
    }

    /// Field site
    pub fn field<O: Into<String>, F: Into<String>>(owner: O, field: F) -> Self {
        Self::Field {
            owner: owner.into(),
            field: field.into(),
        }
    }

    /// Method parameter site
    pub fn method<O: Into<String>, M: Into<String>, P: Into<String>>(
        owner: O,
        method: M,
        parameter: P,
    ) -> Self {
        Self::MethodParameter {
            owner: owner.into(),
            method: method.into(),
            parameter: parameter.into(),
        }
    }

    /// Component entry-point site
    pub fn component_method<C: Into<String>, M: Into<String>>(
        component: C,
        method: M,
        argument: Option<String>,
    ) -> Self {
        Self::ComponentMethod {
            component: component.into(),
            method: method.into(),
            argument,
        }
    }
}

impl fmt::Display for RequestSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConstructorParameter { owner, parameter } => {
                write!(f, "{owner}.<init>({parameter})")
            }
            Self::Field { owner, field } => write!(f, "{owner}.{field}"),
            Self::MethodParameter {
                owner,
                method,
                parameter,
            } => write!(f, "{owner}.{method}({parameter})"),
            Self::ComponentMethod {
                component,
                method,
                argument,
            } => write!(
                f,
                "{component}.{method}({})",
                argument.as_deref().unwrap_or_default()
            ),
        }
    }
}

/// One dependency edge of a binding
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyRequest {
    /// Normalized key, wrapper stripped
    pub key: Key,
    /// How the key is requested
    #[serde(default)]
    pub kind: RequestKind,
    /// Where the request is written
    pub site: RequestSite,
    /// Whether the requesting site accepts null
    #[serde(default)]
    pub nullable: bool,
}

impl DependencyRequest {
    /// Request for a declared type; framework wrappers are stripped into the kind
    pub fn new<T: Into<TypeName>>(declared: T, site: RequestSite) -> Self {
        let (kind, type_name) = RequestKind::from_declared_type(&declared.into());
        Self {
            key: Key::new(type_name),
            kind,
            site,
            nullable: false,
        }
    }

    /// Request for an already normalized key
    pub fn for_key(key: Key, kind: RequestKind, site: RequestSite) -> Self {
        Self {
            key,
            kind,
            site,
            nullable: false,
        }
    }

    /// Attach a qualifier
    pub fn qualified<Q: Into<String>>(mut self, qualifier: Q) -> Self {
        self.key.qualifier = Some(Qualifier::new(qualifier));
        self
    }

    /// Mark the requesting site as accepting null
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// The type as written at the site, including any wrapper
    pub fn requested_type(&self) -> String {
        let wrapped = self.kind.wrap(&self.key.type_name);
        match &self.key.qualifier {
            Some(qualifier) => format!("{qualifier} {wrapped}"),
            None => wrapped.to_string(),
        }
    }
}
