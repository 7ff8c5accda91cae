//! Built-in validators
//!
//! Each validator reads the finished [`BindingGraph`](crate::graph::BindingGraph)
//! and walks components in pre-order, so diagnostics come out in declaration
//! order.

mod component_dependency_cycle;
mod dependency_cycle;
mod duplicate_bindings;
mod map_keys;
mod members_injection;
mod missing_binding;
mod module_validation;
mod nullability;

pub use component_dependency_cycle::ComponentDependencyCycleValidator;
pub use dependency_cycle::DependencyCycleValidator;
pub use duplicate_bindings::DuplicateBindingValidator;
pub use map_keys::MapKeyValidator;
pub use members_injection::MembersInjectionValidator;
pub use missing_binding::MissingBindingValidator;
pub use module_validation::ModuleValidator;
pub use nullability::NullabilityValidator;

use crate::diagnostic::Diagnostic;
use crate::graph::BindingGraph;
use bindery_domain::ComponentId;
use itertools::Itertools;

/// Anchor a diagnostic to a component's declaration
fn in_component(graph: &BindingGraph<'_>, component: ComponentId, diagnostic: Diagnostic) -> Diagnostic {
    let descriptor = graph.tree().get(component);
    diagnostic.in_component(descriptor.name.as_str(), &descriptor.location)
}

/// `    line` for every item, one per line
fn indented<I, T>(items: I, indent: &str) -> String
where
    I: IntoIterator<Item = T>,
    T: std::fmt::Display,
{
    items
        .into_iter()
        .map(|item| format!("{indent}{item}"))
        .join("\n")
}
