//! Component Dependency Cycle Validation
//!
//! Walks the declared "depends-on" edges from every component. A dependency
//! that is not itself a component in the tree is a leaf.

use super::{in_component, indented};
use crate::ValidationConfig;
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::graph::BindingGraph;
use bindery_domain::{ComponentId, ComponentTree};
use std::collections::HashSet;
use tracing::warn;

/// Component Dependency Cycle Validator
pub struct ComponentDependencyCycleValidator;

impl Default for ComponentDependencyCycleValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentDependencyCycleValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, graph: &BindingGraph<'_>) -> Vec<Diagnostic> {
        let tree = graph.tree();
        let mut diagnostics = Vec::new();
        let mut unknown: HashSet<&str> = HashSet::new();
        for component in tree.preorder() {
            if let Some(stack) = find_cycle(tree, component, &mut unknown) {
                let message = format!(
                    "{} contains a cycle in its component dependencies:\n{}",
                    tree.get(component).name,
                    indented(stack, "    ")
                );
                diagnostics.push(in_component(
                    graph,
                    component,
                    Diagnostic::error(DiagnosticKind::ComponentDependencyCycle, message),
                ));
            }
        }
        diagnostics
    }
}

/// First cycle reachable from `component`, as the dependency stack with the
/// most recent type first
fn find_cycle<'t>(
    tree: &'t ComponentTree,
    component: ComponentId,
    unknown: &mut HashSet<&'t str>,
) -> Option<Vec<&'t str>> {
    let mut explored: HashSet<&str> = HashSet::new();
    // (component, index of the next dependency to follow)
    let mut stack: Vec<(ComponentId, usize)> = vec![(component, 0)];

    while let Some((current, next)) = stack.last_mut() {
        let descriptor = tree.get(*current);
        let Some(dependency) = descriptor.dependencies.get(*next) else {
            explored.insert(descriptor.name.as_str());
            stack.pop();
            continue;
        };
        *next += 1;
        let name = dependency.type_name.as_str();
        if stack.iter().any(|(c, _)| tree.get(*c).name == name) {
            let mut cycle = vec![name];
            cycle.extend(stack.iter().rev().map(|(c, _)| tree.get(*c).name.as_str()));
            return Some(cycle);
        }
        if explored.contains(name) {
            continue;
        }
        match tree.find(name) {
            Some(target) => stack.push((target, 0)),
            None => {
                if unknown.insert(name) {
                    warn!(dependency = name, "Component dependency is not a known component");
                }
                explored.insert(name);
            }
        }
    }
    None
}

impl crate::validator_trait::Validator for ComponentDependencyCycleValidator {
    fn name(&self) -> &'static str {
        "component_dependency_cycle"
    }

    fn description(&self) -> &'static str {
        "Reports cycles among declared component dependencies"
    }

    fn validate(
        &self,
        graph: &BindingGraph<'_>,
        _config: &ValidationConfig,
    ) -> anyhow::Result<Vec<Diagnostic>> {
        Ok(self.validate(graph))
    }
}
