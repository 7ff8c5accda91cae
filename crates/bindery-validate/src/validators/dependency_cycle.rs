//! Dependency Cycle Validation
//!
//! Iterative depth-first walk over the resolved graph. Edges exempted by the
//! configured [`CyclePolicy`](crate::CyclePolicy) are not followed; every back
//! edge closes a cycle, reported once per set of participating nodes.

use super::in_component;
use crate::ValidationConfig;
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::graph::{BindingGraph, ComponentGraph};
use crate::resolver::NodeId;
use crate::trace::{TraceBuilder, render};
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Unvisited,
    OnStack,
    Resolved,
    Cyclic,
}

/// Dependency Cycle Validator
pub struct DependencyCycleValidator;

impl Default for DependencyCycleValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl DependencyCycleValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, graph: &BindingGraph<'_>, config: &ValidationConfig) -> Vec<Diagnostic> {
        let mut reported: HashSet<BTreeSet<NodeId>> = HashSet::new();
        let mut diagnostics = Vec::new();
        for component in graph.components_preorder() {
            for cycle in find_cycles(graph, component, config) {
                let members: BTreeSet<NodeId> = cycle.iter().map(|(node, _)| *node).collect();
                if !reported.insert(members) {
                    continue;
                }
                debug!(
                    component = %graph.component_name(component.component),
                    length = cycle.len(),
                    "Found dependency cycle"
                );
                diagnostics.push(report(graph, component, &cycle));
            }
        }
        diagnostics
    }
}

/// Cycles reachable in one component, each as edges from its first node round
/// to the closing edge
fn find_cycles(
    graph: &BindingGraph<'_>,
    component: &ComponentGraph,
    config: &ValidationConfig,
) -> Vec<Vec<(NodeId, usize)>> {
    let mut state: HashMap<NodeId, VisitState> = HashMap::new();
    let mut cycles = Vec::new();
    let roots = component
        .entry_points
        .iter()
        .map(|e| e.node)
        .chain(component.reachable.iter().copied());

    for root in roots {
        if state.get(&root).copied().unwrap_or(VisitState::Unvisited) != VisitState::Unvisited {
            continue;
        }
        // (node, index of the next edge to follow)
        let mut stack: Vec<(NodeId, usize)> = vec![(root, 0)];
        state.insert(root, VisitState::OnStack);

        while let Some((node, next)) = stack.last_mut() {
            let node = *node;
            let edges = &graph.node(node).edges;
            if *next >= edges.len() {
                stack.pop();
                let finished = state.entry(node).or_insert(VisitState::Resolved);
                if *finished == VisitState::OnStack {
                    *finished = VisitState::Resolved;
                }
                continue;
            }
            let index = *next;
            *next += 1;
            let edge = &edges[index];
            if config.cycle_policy.exempts(edge.kind, edge.target == node) {
                continue;
            }
            match state.get(&edge.target).copied().unwrap_or(VisitState::Unvisited) {
                VisitState::Unvisited => {
                    state.insert(edge.target, VisitState::OnStack);
                    stack.push((edge.target, 0));
                }
                VisitState::OnStack => {
                    let Some(start) = stack.iter().position(|(n, _)| *n == edge.target) else {
                        continue;
                    };
                    let mut cycle: Vec<(NodeId, usize)> = stack[start..stack.len() - 1]
                        .iter()
                        .map(|(n, next)| (*n, next - 1))
                        .collect();
                    cycle.push((node, index));
                    cycles.push(cycle);
                }
                VisitState::Resolved | VisitState::Cyclic => {}
            }
        }

        for cycle in &cycles {
            for (node, _) in cycle {
                state.insert(*node, VisitState::Cyclic);
            }
        }
    }
    cycles
}

fn report(graph: &BindingGraph<'_>, component: &ComponentGraph, cycle: &[(NodeId, usize)]) -> Diagnostic {
    let traces = TraceBuilder::new(graph, component.component);
    let start = cycle[0].0;
    let mut elements = traces.edge_elements(cycle);
    if let Some(path) = traces.shortest_path(start) {
        elements.extend(traces.elements(&path));
    }
    let message = format!("Found a dependency cycle:\n{}", render(&elements));
    in_component(
        graph,
        component.component,
        Diagnostic::error(DiagnosticKind::DependencyCycle, message).with_trace(elements),
    )
}

impl crate::validator_trait::Validator for DependencyCycleValidator {
    fn name(&self) -> &'static str {
        "dependency_cycle"
    }

    fn description(&self) -> &'static str {
        "Reports dependency cycles not broken by Provider or Lazy"
    }

    fn validate(
        &self,
        graph: &BindingGraph<'_>,
        config: &ValidationConfig,
    ) -> anyhow::Result<Vec<Diagnostic>> {
        Ok(self.validate(graph, config))
    }
}
