//! Members Injection Validation
//!
//! Members injection needs a fully parameterized type and instance members:
//! - static injected fields are rejected for every known type
//! - raw uses of generic types are rejected
//! - wildcard type arguments are rejected, with the request trace

use super::in_component;
use crate::ValidationConfig;
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::graph::BindingGraph;
use crate::resolver::BindingRequest;
use crate::trace::{TraceBuilder, render};
use bindery_domain::{InjectedMember, Key};
use std::collections::HashSet;

/// Members Injection Validator
pub struct MembersInjectionValidator;

impl Default for MembersInjectionValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl MembersInjectionValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, graph: &BindingGraph<'_>) -> Vec<Diagnostic> {
        let mut diagnostics = self.check_static_fields(graph);
        diagnostics.extend(self.check_injected_types(graph));
        diagnostics
    }

    /// Injected static fields of catalog types, in type-name order
    pub fn check_static_fields(&self, graph: &BindingGraph<'_>) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for declaration in graph.catalog().iter() {
            for member in &declaration.injected_members {
                if let InjectedMember::Field {
                    field,
                    is_static: true,
                } = member
                {
                    diagnostics.push(
                        Diagnostic::error(
                            DiagnosticKind::StaticFieldInjection,
                            format!(
                                "Injection into static fields is not supported: {}.{}",
                                declaration.name, field.name
                            ),
                        )
                        .at(&declaration.location),
                    );
                }
            }
        }
        diagnostics
    }

    /// Raw and wildcard-parameterized types reached by members injection
    pub fn check_injected_types(&self, graph: &BindingGraph<'_>) -> Vec<Diagnostic> {
        let mut seen: HashSet<&Key> = HashSet::new();
        let mut diagnostics = Vec::new();
        for component in graph.components_preorder() {
            let traces = TraceBuilder::new(graph, component.component);
            for &node in &component.reachable {
                let BindingRequest::MembersInjection(key) = &graph.node(node).resolved.request else {
                    continue;
                };
                let type_name = &key.type_name;
                let diagnostic = if type_name.has_wildcard_arguments() {
                    let elements = traces
                        .shortest_path(node)
                        .map(|path| traces.elements(&path))
                        .unwrap_or_default();
                    Diagnostic::error(
                        DiagnosticKind::UnboundedTypeArgument,
                        format!(
                            "Cannot inject members into types with unbounded type arguments: {type_name}\n{}",
                            render(&elements)
                        ),
                    )
                    .with_trace(elements)
                } else if graph
                    .catalog()
                    .declaration_of(type_name)
                    .is_some_and(|d| d.is_raw_use(type_name))
                {
                    Diagnostic::error(
                        DiagnosticKind::RawTypeInjection,
                        format!("Cannot inject members into raw type {type_name}"),
                    )
                } else {
                    continue;
                };
                if seen.insert(key) {
                    diagnostics.push(in_component(graph, component.component, diagnostic));
                }
            }
        }
        diagnostics
    }
}

impl crate::validator_trait::Validator for MembersInjectionValidator {
    fn name(&self) -> &'static str {
        "members_injection"
    }

    fn description(&self) -> &'static str {
        "Reports static injected fields and members injection into raw or wildcard types"
    }

    fn validate(
        &self,
        graph: &BindingGraph<'_>,
        _config: &ValidationConfig,
    ) -> anyhow::Result<Vec<Diagnostic>> {
        Ok(self.validate(graph))
    }
}
