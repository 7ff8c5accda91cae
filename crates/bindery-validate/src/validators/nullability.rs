//! Nullability Validation
//!
//! A nullable binding may only be requested directly by sites that accept
//! null. Requests through `Provider` or `Lazy` are not checked. The value of
//! a plain `Optional<T>` counts as requested by whoever requested the optional.

use super::in_component;
use crate::ValidationConfig;
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::graph::{BindingGraph, ComponentGraph};
use crate::resolver::NodeId;
use crate::trace::{TraceBuilder, TraceElement, render};
use bindery_domain::{Binding, EntryPointKind, Key, RequestKind};
use std::collections::HashSet;

/// Nullability Validator
pub struct NullabilityValidator;

impl Default for NullabilityValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl NullabilityValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, graph: &BindingGraph<'_>, config: &ValidationConfig) -> Vec<Diagnostic> {
        let mut seen_edges: HashSet<(NodeId, usize)> = HashSet::new();
        let mut diagnostics = Vec::new();
        for component in graph.components_preorder() {
            let traces = TraceBuilder::new(graph, component.component);

            for (index, entry) in component.entry_points.iter().enumerate() {
                if entry.entry_point.kind != EntryPointKind::Provision {
                    continue;
                }
                let request = &entry.entry_point.request;
                if let Some(binding) = violating(graph, request.kind, request.nullable, entry.node) {
                    let elements = vec![traces.entry_element(index)];
                    diagnostics.push(report(graph, component, config, &request.key, binding, elements));
                }
            }

            for &node in &component.reachable {
                for (index, edge) in graph.node(node).edges.iter().enumerate() {
                    let found = match &edge.request {
                        Some(request) => violating(graph, edge.kind, request.nullable, edge.target)
                            .map(|binding| (&request.key, binding)),
                        None if is_optional(graph, node) => violating(graph, edge.kind, false, edge.target)
                            .map(|binding| (graph.node(edge.target).resolved.key(), binding)),
                        None => None,
                    };
                    let Some((key, binding)) = found else {
                        continue;
                    };
                    if !seen_edges.insert((node, index)) {
                        continue;
                    }
                    // Edges without a request site are dropped from the trace,
                    // leaving the request of the optional as the consuming site
                    let mut path = traces.shortest_path(node);
                    let elements = match &mut path {
                        Some(path) => {
                            path.edges.push((node, index));
                            traces.elements(path)
                        }
                        None => traces.edge_elements(&[(node, index)]),
                    };
                    diagnostics.push(report(graph, component, config, key, binding, elements));
                }
            }
        }
        diagnostics
    }
}

/// The nullable binding a non-null request receives, if any
fn violating<'g>(
    graph: &'g BindingGraph<'_>,
    kind: RequestKind,
    accepts_null: bool,
    target: NodeId,
) -> Option<&'g Binding> {
    if kind != RequestKind::Instance || accepts_null {
        return None;
    }
    graph.primary_binding(target).filter(|binding| binding.nullable)
}

/// Whether a node is an optional binding, whose edge leads to the present value
fn is_optional(graph: &BindingGraph<'_>, node: NodeId) -> bool {
    let resolved = &graph.node(node).resolved;
    resolved.primary.is_none() && !resolved.is_multibinding() && !resolved.optional_declarations.is_empty()
}

fn report(
    graph: &BindingGraph<'_>,
    component: &ComponentGraph,
    config: &ValidationConfig,
    key: &Key,
    binding: &Binding,
    elements: Vec<TraceElement>,
) -> Diagnostic {
    let message = format!(
        "{key} is not nullable, but is being provided by {binding}\n{}",
        render(&elements)
    );
    let diagnostic = Diagnostic::new(
        DiagnosticKind::NullabilityViolation,
        config.nullable_validation,
        message,
    )
    .with_trace(elements);
    in_component(graph, component.component, diagnostic)
}

impl crate::validator_trait::Validator for NullabilityValidator {
    fn name(&self) -> &'static str {
        "nullability"
    }

    fn description(&self) -> &'static str {
        "Reports nullable bindings requested by sites that do not accept null"
    }

    fn validate(
        &self,
        graph: &BindingGraph<'_>,
        config: &ValidationConfig,
    ) -> anyhow::Result<Vec<Diagnostic>> {
        Ok(self.validate(graph, config))
    }
}
