//! Bindery Domain
//!
//! Declaration model for the binding-graph validator. A declaration scanner
//! describes a program's dependency-injection setup with these types:
//!
//! - [`ComponentTree`] - nested scopes, their modules and entry points
//! - [`Binding`] - one way to satisfy a [`Key`], as a closed set of kinds
//! - [`TypeCatalog`] - types with `@Inject` constructors and injected members
//!
//! The engine in `bindery-validate` consumes these and reports problems as
//! diagnostics. Nothing in this crate parses source or generates code.

pub mod binding;
pub mod catalog;
pub mod component;
pub mod constants;
pub mod error;
pub mod value_objects;

pub use binding::{AggregateKind, Binding, BindingElement, BindingKind, ContributionType};
pub use catalog::{InjectedMember, Parameter, TypeCatalog, TypeDeclaration, TypeKind};
pub use component::{
    ComponentDependency, ComponentDescriptor, ComponentId, ComponentTree, EntryPoint,
    EntryPointKind, ModuleDescriptor, ProvisionMethod,
};
pub use error::{Error, Result};
pub use value_objects::{
    ContributionId, DependencyRequest, Key, Qualifier, RequestKind, RequestSite,
    SourceLocation, TypeName, WildcardBound,
};
