//! Map Key Validation
//!
//! Two `@IntoMap` contributions to the same map may not use the same map key.

use super::{in_component, indented};
use crate::ValidationConfig;
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::graph::BindingGraph;
use bindery_domain::{Binding, ComponentId, ContributionType, Key};
use std::collections::HashSet;

/// Map Key Validator
pub struct MapKeyValidator;

impl Default for MapKeyValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl MapKeyValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, graph: &BindingGraph<'_>) -> Vec<Diagnostic> {
        // Map<K, V> and Map<K, Provider<V>> share contributions; report once
        let mut seen: HashSet<(ComponentId, Key)> = HashSet::new();
        let mut diagnostics = Vec::new();
        for component in graph.components_preorder() {
            for &node in &component.reachable {
                let resolved = &graph.node(node).resolved;
                if !resolved.is_multibinding() {
                    continue;
                }
                let key = resolved
                    .key()
                    .unwrap_provider_values()
                    .unwrap_or_else(|| resolved.key().clone());
                if !seen.insert((resolved.owner, key.clone())) {
                    continue;
                }
                // Groups in order of first appearance
                let mut groups: Vec<(String, Vec<&Binding>)> = Vec::new();
                for id in &resolved.contributions {
                    let binding = &graph.binding(*id).binding;
                    let ContributionType::MapEntry { map_key } = binding.contribution_type() else {
                        continue;
                    };
                    match groups.iter_mut().find(|(k, _)| *k == map_key) {
                        Some((_, bindings)) => bindings.push(binding),
                        None => groups.push((map_key, vec![binding])),
                    }
                }
                for (_, bindings) in groups.into_iter().filter(|(_, b)| b.len() > 1) {
                    let message = format!(
                        "The same map key is bound more than once for {key}:\n{}",
                        indented(bindings, "    ")
                    );
                    diagnostics.push(in_component(
                        graph,
                        resolved.owner,
                        Diagnostic::error(DiagnosticKind::DuplicateMapKey, message),
                    ));
                }
            }
        }
        diagnostics
    }
}

impl crate::validator_trait::Validator for MapKeyValidator {
    fn name(&self) -> &'static str {
        "map_keys"
    }

    fn description(&self) -> &'static str {
        "Reports map multibindings with the same map key contributed twice"
    }

    fn validate(
        &self,
        graph: &BindingGraph<'_>,
        _config: &ValidationConfig,
    ) -> anyhow::Result<Vec<Diagnostic>> {
        Ok(self.validate(graph))
    }
}
