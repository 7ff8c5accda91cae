//! Missing Binding Validation
//!
//! Reports every reachable request that nothing satisfies, with the shortest
//! trace to an entry point and the list of other entry points that depend on it.

use super::{in_component, indented};
use crate::ValidationConfig;
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::graph::BindingGraph;
use crate::resolver::NodeId;
use crate::trace::{TraceBuilder, render};
use bindery_domain::{Key, TypeCatalog, TypeKind};
use std::collections::HashSet;

/// Missing Binding Validator
pub struct MissingBindingValidator;

impl Default for MissingBindingValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl MissingBindingValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, graph: &BindingGraph<'_>) -> Vec<Diagnostic> {
        let mut reported: HashSet<NodeId> = HashSet::new();
        let mut diagnostics = Vec::new();
        for component in graph.components_preorder() {
            let traces = TraceBuilder::new(graph, component.component);
            for &node in &component.reachable {
                if graph.node(node).resolved.is_resolved() || !reported.insert(node) {
                    continue;
                }
                let Some(path) = traces.shortest_path(node) else {
                    continue;
                };
                let key = graph.node(node).resolved.key();
                let elements = traces.elements(&path);
                let mut message = format!(
                    "{}\n{}",
                    missing_binding_headline(graph.catalog(), key),
                    render(&elements)
                );
                let others: Vec<String> = traces
                    .entry_points_reaching(node)
                    .into_iter()
                    .filter(|i| *i != path.entry_index)
                    .map(|i| traces.entry_site(i))
                    .collect();
                if !others.is_empty() {
                    message.push_str("\nThe following other entry points also depend on it:\n");
                    message.push_str(&indented(others, "    "));
                }
                diagnostics.push(in_component(
                    graph,
                    component.component,
                    Diagnostic::error(DiagnosticKind::MissingBinding, message).with_trace(elements),
                ));
            }
        }
        diagnostics
    }
}

/// First line of a missing-binding message
///
/// The `@Inject constructor` alternative is only offered for unqualified keys
/// whose type could have one: not an interface or abstract class, no wildcards.
pub fn missing_binding_headline(catalog: &TypeCatalog, key: &Key) -> String {
    let declaration = catalog.declaration_of(&key.type_name);
    let could_be_constructed = key.qualifier.is_none()
        && !key.type_name.is_wildcard()
        && !key.type_name.has_wildcard_arguments()
        && declaration.is_none_or(|d| d.kind == TypeKind::Class);
    let mut headline = if could_be_constructed {
        format!("{key} cannot be provided without an @Inject constructor or an @Provides-annotated method.")
    } else {
        format!("{key} cannot be provided without an @Provides-annotated method.")
    };
    if key.qualifier.is_none() && declaration.is_some_and(|d| d.has_injected_members()) {
        headline.push_str(" This type supports members injection but cannot be implicitly provided.");
    }
    headline
}

impl crate::validator_trait::Validator for MissingBindingValidator {
    fn name(&self) -> &'static str {
        "missing_binding"
    }

    fn description(&self) -> &'static str {
        "Reports requests that no binding satisfies"
    }

    fn validate(
        &self,
        graph: &BindingGraph<'_>,
        _config: &ValidationConfig,
    ) -> anyhow::Result<Vec<Diagnostic>> {
        Ok(self.validate(graph))
    }
}
