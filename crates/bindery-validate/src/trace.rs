//! Dependency traces
//!
//! A trace explains how an entry point reaches a node: one line pair per
//! dependency request, innermost first, ending at the entry point.

use crate::graph::BindingGraph;
use crate::resolver::NodeId;
use bindery_domain::{ComponentId, EntryPointKind};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

/// Whether a trace line is a dependency request or the entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceElementKind {
    /// Parameter, field or members-injection request
    InjectedAt,
    /// Provision entry point
    ProvidedAt,
}

/// One step of a dependency trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceElement {
    /// Request or entry point
    pub kind: TraceElementKind,
    /// Type as written at the site, wrapper included
    pub key: String,
    /// Rendered request site
    pub site: String,
}

impl fmt::Display for TraceElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.kind {
            TraceElementKind::InjectedAt => "is injected at",
            TraceElementKind::ProvidedAt => "is provided at",
        };
        write!(f, "    {} {verb}\n        {}", self.key, self.site)
    }
}

/// Path from an entry point to a node, as (source node, edge index) steps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracePath {
    /// Index of the entry point in the component
    pub entry_index: usize,
    /// Edges from the entry node to the target
    pub edges: Vec<(NodeId, usize)>,
}

/// Builds traces within one component
pub struct TraceBuilder<'g, 'a> {
    graph: &'g BindingGraph<'a>,
    component: ComponentId,
}

impl<'g, 'a> TraceBuilder<'g, 'a> {
    pub fn new(graph: &'g BindingGraph<'a>, component: ComponentId) -> Self {
        Self { graph, component }
    }

    /// Shortest path to `target` from any entry point
    ///
    /// Breadth-first from all entry points at once, seeded in declaration
    /// order, so ties go to the earliest entry point and earliest edge.
    pub fn shortest_path(&self, target: NodeId) -> Option<TracePath> {
        self.shortest_path_from(&self.entry_seeds(), target)
    }

    /// Shortest path from a single node to `target`
    pub fn path_between(&self, from: NodeId, target: NodeId) -> Option<Vec<(NodeId, usize)>> {
        self.shortest_path_from(&[(from, 0)], target)
            .map(|path| path.edges)
    }

    fn entry_seeds(&self) -> Vec<(NodeId, usize)> {
        self.graph
            .component(self.component)
            .entry_points
            .iter()
            .enumerate()
            .map(|(i, e)| (e.node, i))
            .collect()
    }

    fn shortest_path_from(&self, seeds: &[(NodeId, usize)], target: NodeId) -> Option<TracePath> {
        let mut parent: HashMap<NodeId, Option<(NodeId, usize)>> = HashMap::new();
        let mut source: HashMap<NodeId, usize> = HashMap::new();
        let mut queue = VecDeque::new();
        for &(node, entry) in seeds {
            if !parent.contains_key(&node) {
                parent.insert(node, None);
                source.insert(node, entry);
                queue.push_back(node);
            }
        }
        while let Some(node) = queue.pop_front() {
            if node == target {
                break;
            }
            for (index, edge) in self.graph.node(node).edges.iter().enumerate() {
                if !parent.contains_key(&edge.target) {
                    parent.insert(edge.target, Some((node, index)));
                    source.insert(edge.target, source[&node]);
                    queue.push_back(edge.target);
                }
            }
        }

        let entry_index = *source.get(&target)?;
        let mut edges = Vec::new();
        let mut current = target;
        while let Some(Some((from, index))) = parent.get(&current) {
            edges.push((*from, *index));
            current = *from;
        }
        edges.reverse();
        Some(TracePath { entry_index, edges })
    }

    /// Entry points from which `target` is reachable, in declaration order
    pub fn entry_points_reaching(&self, target: NodeId) -> Vec<usize> {
        let component = self.graph.component(self.component);
        let mut predecessors: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        for &node in &component.reachable {
            for edge in &self.graph.node(node).edges {
                predecessors.entry(edge.target).or_default().push(node);
            }
        }
        let mut reaching = HashSet::from([target]);
        let mut queue = VecDeque::from([target]);
        while let Some(node) = queue.pop_front() {
            for &predecessor in predecessors.get(&node).into_iter().flatten() {
                if reaching.insert(predecessor) {
                    queue.push_back(predecessor);
                }
            }
        }
        component
            .entry_points
            .iter()
            .enumerate()
            .filter(|(_, e)| reaching.contains(&e.node))
            .map(|(i, _)| i)
            .collect()
    }

    /// Trace lines for a path, innermost first, ending with the entry point
    pub fn elements(&self, path: &TracePath) -> Vec<TraceElement> {
        let mut elements = self.edge_elements(&path.edges);
        elements.push(self.entry_element(path.entry_index));
        elements
    }

    /// Trace lines for edges, innermost first
    ///
    /// Edges to multibinding contributions and optional values have no request
    /// site and are skipped.
    pub fn edge_elements(&self, edges: &[(NodeId, usize)]) -> Vec<TraceElement> {
        edges
            .iter()
            .rev()
            .filter_map(|&(node, index)| {
                let request = self.graph.node(node).edges[index].request.as_ref()?;
                Some(TraceElement {
                    kind: TraceElementKind::InjectedAt,
                    key: request.requested_type(),
                    site: request.site.to_string(),
                })
            })
            .collect()
    }

    /// Trace line for an entry point, with the component path for subcomponents
    pub fn entry_element(&self, entry_index: usize) -> TraceElement {
        let entry = &self.graph.component(self.component).entry_points[entry_index].entry_point;
        let (kind, key) = match entry.kind {
            EntryPointKind::MembersInjection => {
                (TraceElementKind::InjectedAt, entry.request.key.to_string())
            }
            EntryPointKind::Provision => {
                (TraceElementKind::ProvidedAt, entry.request.requested_type())
            }
        };
        TraceElement {
            kind,
            key,
            site: self.entry_site(entry_index),
        }
    }

    /// Rendered site of an entry point, with the component path for subcomponents
    pub fn entry_site(&self, entry_index: usize) -> String {
        let entry = &self.graph.component(self.component).entry_points[entry_index].entry_point;
        format!(
            "{}{}",
            entry.request.site,
            self.graph.component_path(self.component)
        )
    }
}

/// Join trace elements into message lines
pub fn render(elements: &[TraceElement]) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(elements.len());
    for element in elements {
        let line = element.to_string();
        if lines.last() != Some(&line) {
            lines.push(line);
        }
    }
    lines.join("\n")
}
