//! Manifest graph construction and traversal.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use lockwise_core::manifest::Manifest;
use lockwise_core::version::Requirement;

/// Edge label: the dependent's requirement on the target.
#[derive(Debug, Clone)]
pub struct DepEdge {
    pub requirement: Requirement,
    /// Whether the target's version satisfies `requirement`.
    pub satisfied: bool,
}

/// A manifest set as a petgraph arena.
///
/// Nodes are added in input order, so `NodeIndex::index()` is the position of
/// the manifest in the slice it was built from. Edges point from a manifest to
/// the manifests it depends on; dependencies on names outside the set have no
/// edge.
pub struct ManifestGraph {
    graph: DiGraph<Manifest, DepEdge>,
    /// Lookup from name to node index (first manifest of that name).
    index: HashMap<String, NodeIndex>,
}

impl ManifestGraph {
    pub fn from_manifests(manifests: &[Manifest]) -> Self {
        let mut graph = DiGraph::with_capacity(manifests.len(), manifests.len());
        let mut index = HashMap::new();
        for manifest in manifests {
            let idx = graph.add_node(manifest.clone());
            index.entry(manifest.name.clone()).or_insert(idx);
        }

        let mut g = Self { graph, index };
        for (i, manifest) in manifests.iter().enumerate() {
            let from = NodeIndex::new(i);
            for dep in &manifest.dependencies {
                let Some(to) = g.find(&dep.name) else {
                    continue;
                };
                let satisfied = dep.satisfied_by(&g.graph[to]);
                g.add_edge(
                    from,
                    to,
                    DepEdge {
                        requirement: dep.requirement.clone(),
                        satisfied,
                    },
                );
            }
        }
        g
    }

    fn add_edge(&mut self, from: NodeIndex, to: NodeIndex, edge: DepEdge) {
        match self.graph.find_edge(from, to) {
            // Repeated dependency on the same name: the edge is satisfied
            // only if every declaration is.
            Some(existing) => self.graph[existing].satisfied &= edge.satisfied,
            None => {
                self.graph.add_edge(from, to, edge);
            }
        }
    }

    /// Look up a node by manifest name.
    pub fn find(&self, name: &str) -> Option<NodeIndex> {
        self.index.get(name).copied()
    }

    pub fn node(&self, idx: NodeIndex) -> &Manifest {
        &self.graph[idx]
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Direct dependencies of a node, in declaration order.
    pub fn dependencies_of(&self, idx: NodeIndex) -> Vec<(NodeIndex, &DepEdge)> {
        let mut deps: Vec<(NodeIndex, &DepEdge)> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (e.target(), e.weight()))
            .collect();
        // petgraph walks outgoing edges newest first.
        deps.reverse();
        deps
    }

    /// Reverse dependencies (who depends on this node).
    pub fn dependents_of(&self, idx: NodeIndex) -> Vec<(NodeIndex, &DepEdge)> {
        let mut deps: Vec<(NodeIndex, &DepEdge)> = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| (e.source(), e.weight()))
            .collect();
        deps.sort_by_key(|(i, _)| i.index());
        deps
    }

    /// Strongly connected groups, each sorted by input position.
    pub fn components(&self) -> Vec<Vec<NodeIndex>> {
        tarjan_scc(&self.graph)
            .into_iter()
            .map(|mut c| {
                c.sort_by_key(|i| i.index());
                c
            })
            .collect()
    }

    /// True if the group is a cycle: more than one member or a self edge.
    pub fn is_cycle(&self, component: &[NodeIndex]) -> bool {
        match component {
            [single] => self.graph.find_edge(*single, *single).is_some(),
            _ => true,
        }
    }

    /// Edges between members of `component` that are not satisfied.
    pub fn unsatisfied_within(&self, component: &[NodeIndex]) -> Vec<(NodeIndex, NodeIndex)> {
        let members: HashSet<NodeIndex> = component.iter().copied().collect();
        component
            .iter()
            .flat_map(|&n| self.graph.edges_directed(n, Direction::Outgoing))
            .filter(|e| members.contains(&e.target()) && !e.weight().satisfied)
            .map(|e| (e.source(), e.target()))
            .collect()
    }

    /// Members of components nothing outside the component depends on.
    ///
    /// These are the manifests a specification must have asked for directly.
    pub fn roots(&self) -> Vec<NodeIndex> {
        let mut roots: Vec<NodeIndex> = self
            .components()
            .into_iter()
            .filter(|component| {
                let members: HashSet<NodeIndex> = component.iter().copied().collect();
                component.iter().all(|&n| {
                    self.graph
                        .edges_directed(n, Direction::Incoming)
                        .all(|e| members.contains(&e.source()))
                })
            })
            .flatten()
            .collect();
        roots.sort_by_key(|i| i.index());
        roots
    }

    /// Nodes reachable from `roots` without entering a node in `blocked`.
    ///
    /// Blocked roots are not visited at all.
    pub fn reachable(&self, roots: &[NodeIndex], blocked: &HashSet<NodeIndex>) -> HashSet<NodeIndex> {
        let mut seen = HashSet::new();
        let mut queue: VecDeque<NodeIndex> = roots
            .iter()
            .copied()
            .filter(|r| !blocked.contains(r))
            .collect();
        while let Some(idx) = queue.pop_front() {
            if !seen.insert(idx) {
                continue;
            }
            for edge in self.graph.edges_directed(idx, Direction::Outgoing) {
                let next = edge.target();
                if !blocked.contains(&next) && !seen.contains(&next) {
                    queue.push_back(next);
                }
            }
        }
        seen
    }

    /// Print the dependency tree below `roots` to a string.
    ///
    /// A manifest that is already on the current path is printed but not
    /// expanded again.
    pub fn print_tree(&self, roots: &[NodeIndex], max_depth: Option<usize>) -> String {
        let mut output = String::new();
        let mut visited = HashSet::new();
        for &root in roots {
            output.push_str(&format!("{}\n", self.graph[root]));
            if max_depth == Some(0) {
                continue;
            }
            visited.insert(root);
            let deps = self.dependencies_of(root);
            let count = deps.len();
            for (i, (idx, _)) in deps.iter().enumerate() {
                let is_last = i == count - 1;
                self.print_subtree(&mut output, *idx, "", is_last, 1, max_depth, &mut visited);
            }
            visited.remove(&root);
        }
        output
    }

    #[allow(clippy::too_many_arguments)]
    fn print_subtree(
        &self,
        output: &mut String,
        idx: NodeIndex,
        prefix: &str,
        is_last: bool,
        depth: usize,
        max_depth: Option<usize>,
        visited: &mut HashSet<NodeIndex>,
    ) {
        let connector = if is_last { "└── " } else { "├── " };
        let node = &self.graph[idx];
        output.push_str(&format!("{prefix}{connector}{node}\n"));

        if let Some(max) = max_depth {
            if depth >= max {
                return;
            }
        }

        if !visited.insert(idx) {
            return;
        }

        let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
        let deps = self.dependencies_of(idx);
        let count = deps.len();
        for (i, (child, _)) in deps.iter().enumerate() {
            let is_last = i == count - 1;
            self.print_subtree(
                output,
                *child,
                &child_prefix,
                is_last,
                depth + 1,
                max_depth,
                visited,
            );
        }

        visited.remove(&idx);
    }

    /// Print what depends on `name`, up to the roots.
    pub fn print_inverted_tree(&self, name: &str) -> String {
        let mut output = String::new();
        let Some(idx) = self.find(name) else {
            return output;
        };

        output.push_str(&format!("{}\n", self.graph[idx]));

        let mut visited = HashSet::new();
        visited.insert(idx);

        let dependents = self.dependents_of(idx);
        let count = dependents.len();
        for (i, (dep_idx, _)) in dependents.iter().enumerate() {
            let is_last = i == count - 1;
            self.print_inverted_subtree(&mut output, *dep_idx, "", is_last, &mut visited);
        }

        output
    }

    fn print_inverted_subtree(
        &self,
        output: &mut String,
        idx: NodeIndex,
        prefix: &str,
        is_last: bool,
        visited: &mut HashSet<NodeIndex>,
    ) {
        let connector = if is_last { "└── " } else { "├── " };
        output.push_str(&format!("{prefix}{connector}{}\n", self.graph[idx]));

        if !visited.insert(idx) {
            return;
        }

        let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
        let dependents = self.dependents_of(idx);
        let count = dependents.len();
        for (i, (dep_idx, _)) in dependents.iter().enumerate() {
            let is_last = i == count - 1;
            self.print_inverted_subtree(output, *dep_idx, &child_prefix, is_last, visited);
        }

        visited.remove(&idx);
    }

    /// Find a path from one of `roots` to the manifest called `target`.
    pub fn find_path(&self, roots: &[NodeIndex], target: &str) -> Option<Vec<&Manifest>> {
        let target = self.find(target)?;
        for &root in roots {
            let mut path = Vec::new();
            let mut visited = HashSet::new();
            if self.dfs_path(root, target, &mut path, &mut visited) {
                return Some(path.iter().map(|&idx| &self.graph[idx]).collect());
            }
        }
        None
    }

    fn dfs_path(
        &self,
        current: NodeIndex,
        target: NodeIndex,
        path: &mut Vec<NodeIndex>,
        visited: &mut HashSet<NodeIndex>,
    ) -> bool {
        path.push(current);
        if current == target {
            return true;
        }
        if !visited.insert(current) {
            path.pop();
            return false;
        }
        for (next, _) in self.dependencies_of(current) {
            if self.dfs_path(next, target, path, visited) {
                return true;
            }
        }
        path.pop();
        false
    }
}
