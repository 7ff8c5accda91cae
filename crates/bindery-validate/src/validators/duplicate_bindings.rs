//! Duplicate Binding Validation
//!
//! A key may have one unique binding. More than one visible unique binding
//! (or a unique binding next to a `@BindsOptionalOf` declaration) is a
//! duplicate; a unique binding next to multibinding contributions or
//! declarations is incompatible.

use super::{in_component, indented};
use crate::ValidationConfig;
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::graph::BindingGraph;
use crate::resolver::{BindingId, NodeId, ResolvedBindings};
use bindery_domain::constants::DUPLICATE_DISPLAY_LIMIT;
use bindery_domain::{AggregateKind, BindingKind};
use std::collections::HashSet;

/// Duplicate and Incompatible Binding Validator
pub struct DuplicateBindingValidator {
    display_limit: usize,
}

impl Default for DuplicateBindingValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl DuplicateBindingValidator {
    pub fn new() -> Self {
        Self {
            display_limit: DUPLICATE_DISPLAY_LIMIT,
        }
    }

    pub fn validate(&self, graph: &BindingGraph<'_>) -> Vec<Diagnostic> {
        let mut seen: HashSet<NodeId> = HashSet::new();
        let mut diagnostics = Vec::new();
        for component in graph.components_preorder() {
            for &node in &component.reachable {
                if !seen.insert(node) {
                    continue;
                }
                let resolved = &graph.node(node).resolved;
                if resolved.unique.is_empty() {
                    continue;
                }
                let diagnostic = if resolved.unique.len() + resolved.optional_declarations.len() > 1 {
                    self.duplicate(graph, resolved)
                } else if !resolved.contributions.is_empty()
                    || !resolved.multibinding_declarations.is_empty()
                {
                    Self::incompatible(graph, resolved)
                } else {
                    continue;
                };
                diagnostics.push(in_component(graph, resolved.owner, diagnostic));
            }
        }
        diagnostics
    }

    fn duplicate(&self, graph: &BindingGraph<'_>, resolved: &ResolvedBindings) -> Diagnostic {
        let bindings: Vec<String> = resolved
            .unique
            .iter()
            .chain(&resolved.optional_declarations)
            .map(|id| graph.binding(*id).binding.to_string())
            .collect();
        let mut message = format!("{} is bound multiple times:\n", resolved.key());
        message.push_str(&indented(bindings.iter().take(self.display_limit), "    "));
        if bindings.len() > self.display_limit {
            message.push_str(&format!(
                "\n    and {} others",
                bindings.len() - self.display_limit
            ));
        }
        Diagnostic::error(DiagnosticKind::DuplicateBinding, message)
    }

    fn incompatible(graph: &BindingGraph<'_>, resolved: &ResolvedBindings) -> Diagnostic {
        let multibindings: Vec<BindingId> = resolved
            .contributions
            .iter()
            .chain(&resolved.multibinding_declarations)
            .copied()
            .collect();
        let aggregate = multibindings
            .iter()
            .find_map(|id| {
                let binding = &graph.binding(*id).binding;
                match &binding.kind {
                    BindingKind::MultibindingDeclaration { aggregate } => Some(*aggregate),
                    _ => binding.contribution_type().aggregate(),
                }
            })
            .unwrap_or(AggregateKind::Set);
        let render = |ids: &[BindingId]| {
            indented(ids.iter().map(|id| &graph.binding(*id).binding), "        ")
        };
        let message = format!(
            "{} has incompatible bindings or declarations:\n    {aggregate} bindings and declarations:\n{}\n    Unique bindings and declarations:\n{}",
            resolved.key(),
            render(&multibindings),
            render(&resolved.unique),
        );
        Diagnostic::error(DiagnosticKind::IncompatibleBindings, message)
    }
}

impl crate::validator_trait::Validator for DuplicateBindingValidator {
    fn name(&self) -> &'static str {
        "duplicate_bindings"
    }

    fn description(&self) -> &'static str {
        "Reports keys bound more than once or bound both uniquely and as a multibinding"
    }

    fn validate(
        &self,
        graph: &BindingGraph<'_>,
        _config: &ValidationConfig,
    ) -> anyhow::Result<Vec<Diagnostic>> {
        Ok(self.validate(graph))
    }
}
