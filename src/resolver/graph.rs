//! The dependency graph built for one resolution request.
//!
//! Nodes are module names, edges are labeled with the visibility they were
//! declared with. The graph covers every module the root would compile,
//! through public and private edges alike, so unknown names and cycles are
//! caught wherever they are. Visibility only decides what the root sees.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

use crate::core::catalog::ModuleCatalog;
use crate::core::target::TargetInfo;
use crate::resolver::errors::ResolveError;

/// Visibility of a dependency edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Propagates to dependents
    Public,
    /// Seen only by the declaring module
    Private,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Private => write!(f, "private"),
        }
    }
}

/// Directed, acyclic module graph rooted at one module.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    graph: DiGraph<String, Visibility>,
    nodes: HashMap<String, NodeIndex>,
    root: NodeIndex,
    target: TargetInfo,
}

impl DependencyGraph {
    /// Build the graph for `root` under `target`.
    ///
    /// Fails on the first unknown module name (in breadth-first declaration
    /// order) and on any cycle.
    pub fn build(
        root: &str,
        target: &TargetInfo,
        catalog: &ModuleCatalog,
    ) -> Result<Self, ResolveError> {
        if !catalog.contains(root) {
            return Err(ResolveError::UnresolvedDependency {
                name: root.to_string(),
                requested_by: None,
                suggestions: catalog.similar_names(root),
            });
        }

        let mut graph = DiGraph::new();
        let root_idx = graph.add_node(root.to_string());
        let mut nodes = HashMap::new();
        nodes.insert(root.to_string(), root_idx);

        let mut queue = VecDeque::from([root_idx]);
        while let Some(current) = queue.pop_front() {
            let name = graph[current].clone();
            let Some(descriptor) = catalog.get(&name) else {
                continue;
            };
            let rules = descriptor.rules_for(target);

            let edges = rules
                .public_dependencies()
                .iter()
                .map(|d| (d, Visibility::Public))
                .chain(
                    rules
                        .private_dependencies()
                        .iter()
                        .map(|d| (d, Visibility::Private)),
                );

            for (dep, visibility) in edges {
                if !catalog.contains(dep) {
                    return Err(ResolveError::UnresolvedDependency {
                        name: dep.clone(),
                        requested_by: Some(name),
                        suggestions: catalog.similar_names(dep),
                    });
                }

                let dep_idx = match nodes.get(dep) {
                    Some(&idx) => idx,
                    None => {
                        let idx = graph.add_node(dep.clone());
                        nodes.insert(dep.clone(), idx);
                        queue.push_back(idx);
                        idx
                    }
                };
                graph.add_edge(current, dep_idx, visibility);
            }

            for include_module in rules.private_include_path_modules() {
                if !catalog.contains(include_module) {
                    return Err(ResolveError::UnresolvedDependency {
                        name: include_module.clone(),
                        requested_by: Some(name),
                        suggestions: catalog.similar_names(include_module),
                    });
                }
            }
        }

        let dep_graph = DependencyGraph {
            graph,
            nodes,
            root: root_idx,
            target: *target,
        };

        if let Some(cycle) = dep_graph.find_cycle() {
            return Err(ResolveError::CyclicDependency { cycle });
        }

        tracing::debug!(
            "built dependency graph for `{}` ({}): {} module(s), {} edge(s)",
            root,
            target,
            dep_graph.graph.node_count(),
            dep_graph.graph.edge_count()
        );

        Ok(dep_graph)
    }

    /// The root module's name.
    pub fn root(&self) -> &str {
        &self.graph[self.root]
    }

    /// The target the graph was built for.
    pub fn target(&self) -> &TargetInfo {
        &self.target
    }

    /// Number of modules in the graph.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Check if a module is in the graph.
    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Module names in breadth-first discovery order.
    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.graph.node_indices().map(|n| self.graph[n].as_str())
    }

    /// Direct dependencies of a module in declaration order.
    pub fn dependencies(&self, name: &str) -> Vec<(&str, Visibility)> {
        match self.nodes.get(name) {
            Some(&node) => self
                .ordered_edges(node)
                .into_iter()
                .map(|(target, vis)| (self.graph[target].as_str(), vis))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Modules whose includes and libraries the root sees, root first.
    ///
    /// Breadth-first from the root. The root expands all of its edges; every
    /// other module expands only its public edges.
    pub fn visible_modules(&self) -> Vec<&str> {
        let mut visited = HashSet::from([self.root]);
        let mut order = vec![self.root];
        let mut queue = VecDeque::from([self.root]);

        while let Some(node) = queue.pop_front() {
            for (dep, visibility) in self.ordered_edges(node) {
                if node != self.root && visibility == Visibility::Private {
                    continue;
                }
                if visited.insert(dep) {
                    order.push(dep);
                    queue.push_back(dep);
                }
            }
        }

        order.into_iter().map(|n| self.graph[n].as_str()).collect()
    }

    /// Outgoing edges in the order they were added.
    ///
    /// petgraph walks adjacency lists newest-first, so edges are re-sorted
    /// by index.
    fn ordered_edges(&self, node: NodeIndex) -> Vec<(NodeIndex, Visibility)> {
        let mut edges: Vec<_> = self.graph.edges(node).collect();
        edges.sort_by_key(|e| e.id());
        edges.into_iter().map(|e| (e.target(), *e.weight())).collect()
    }

    /// Find a cycle reachable from the root, as `[A, B, ..., A]`.
    fn find_cycle(&self) -> Option<Vec<String>> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            Unvisited,
            InProgress,
            Done,
        }

        let mut marks = vec![Mark::Unvisited; self.graph.node_count()];
        let mut path: Vec<NodeIndex> = Vec::new();
        // (node, children, index of the next child)
        let mut stack: Vec<(NodeIndex, Vec<NodeIndex>, usize)> = Vec::new();

        let children = |node: NodeIndex| -> Vec<NodeIndex> {
            self.ordered_edges(node).into_iter().map(|(n, _)| n).collect()
        };

        marks[self.root.index()] = Mark::InProgress;
        path.push(self.root);
        stack.push((self.root, children(self.root), 0));

        while let Some((_, next, cursor)) = stack.last_mut() {
            if *cursor >= next.len() {
                if let Some((node, _, _)) = stack.pop() {
                    marks[node.index()] = Mark::Done;
                    path.pop();
                }
                continue;
            }

            let child = next[*cursor];
            *cursor += 1;

            match marks[child.index()] {
                Mark::InProgress => {
                    let start = path.iter().position(|&n| n == child).unwrap_or(0);
                    let mut cycle: Vec<String> =
                        path[start..].iter().map(|&n| self.graph[n].clone()).collect();
                    cycle.push(self.graph[child].clone());
                    return Some(cycle);
                }
                Mark::Unvisited => {
                    marks[child.index()] = Mark::InProgress;
                    path.push(child);
                    stack.push((child, children(child), 0));
                }
                Mark::Done => {}
            }
        }

        None
    }
}
