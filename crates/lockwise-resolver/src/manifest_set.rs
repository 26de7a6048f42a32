//! Pure functions over collections of manifests.
//!
//! None of these consult a source: edges are drawn by name between manifests
//! of the same slice, and dependencies on names outside the slice are ignored.

use std::collections::{BTreeSet, HashMap, HashSet};

use petgraph::graph::NodeIndex;

use lockwise_core::manifest::Manifest;
use lockwise_util::errors::LockwiseError;

use crate::graph::ManifestGraph;

/// Order `manifests` so that every manifest comes after the manifests it
/// depends on.
///
/// Independent manifests keep their input order. A dependency cycle is
/// emitted as one group, members in input order, provided every edge inside
/// the group is satisfied; otherwise the cycle is an error.
pub fn sort(manifests: &[Manifest]) -> Result<Vec<Manifest>, LockwiseError> {
    let graph = ManifestGraph::from_manifests(manifests);
    let components = graph.components();

    let mut component_of: HashMap<NodeIndex, usize> = HashMap::new();
    for (c, members) in components.iter().enumerate() {
        if graph.is_cycle(members) && !graph.unsatisfied_within(members).is_empty() {
            let mut names: Vec<String> = members.iter().map(|&n| graph.node(n).name.clone()).collect();
            names.sort();
            tracing::debug!(?names, "unsatisfied dependency cycle");
            return Err(LockwiseError::Cycle { names });
        }
        for &n in members {
            component_of.insert(n, c);
        }
    }

    // Kahn over the condensation, dependencies first. A component becomes
    // ready once every component it depends on has been emitted; ready
    // components are taken by lowest input position.
    let mut pending = vec![0usize; components.len()];
    let mut dependents: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); components.len()];
    for (c, members) in components.iter().enumerate() {
        let targets: BTreeSet<usize> = members
            .iter()
            .flat_map(|&n| graph.dependencies_of(n))
            .map(|(t, _)| component_of[&t])
            .filter(|&t| t != c)
            .collect();
        pending[c] = targets.len();
        for t in targets {
            dependents[t].insert(c);
        }
    }

    let first = |c: usize| components[c][0].index();
    let mut ready: BTreeSet<(usize, usize)> = (0..components.len())
        .filter(|&c| pending[c] == 0)
        .map(|c| (first(c), c))
        .collect();

    let mut sorted = Vec::with_capacity(manifests.len());
    while let Some((_, c)) = ready.pop_first() {
        sorted.extend(components[c].iter().map(|&n| graph.node(n).clone()));
        for &d in &dependents[c] {
            pending[d] -= 1;
            if pending[d] == 0 {
                ready.insert((first(d), d));
            }
        }
    }
    Ok(sorted)
}

/// Remove the manifests named in `names` and everything reachable only
/// through them.
///
/// The retained roots are the manifests no other manifest outside their own
/// cycle depends on. Use [`deep_strip_from`] when the roots are known.
pub fn deep_strip(manifests: &[Manifest], names: &[String]) -> Vec<Manifest> {
    let graph = ManifestGraph::from_manifests(manifests);
    let roots = graph.roots();
    strip_with(&graph, manifests, &roots, names)
}

/// [`deep_strip`] with explicit root names, usually the top-level
/// dependencies of a specification. Unknown root names are ignored.
pub fn deep_strip_from(manifests: &[Manifest], roots: &[String], names: &[String]) -> Vec<Manifest> {
    let graph = ManifestGraph::from_manifests(manifests);
    let roots: Vec<NodeIndex> = roots.iter().filter_map(|r| graph.find(r)).collect();
    strip_with(&graph, manifests, &roots, names)
}

fn strip_with(
    graph: &ManifestGraph,
    manifests: &[Manifest],
    roots: &[NodeIndex],
    names: &[String],
) -> Vec<Manifest> {
    let names: HashSet<&str> = names.iter().map(String::as_str).collect();
    let blocked: HashSet<NodeIndex> = manifests
        .iter()
        .enumerate()
        .filter(|(_, m)| names.contains(m.name.as_str()))
        .map(|(i, _)| NodeIndex::new(i))
        .collect();
    let keep = graph.reachable(roots, &blocked);
    tracing::debug!(kept = keep.len(), of = manifests.len(), "deep strip");
    manifests
        .iter()
        .enumerate()
        .filter(|(i, _)| keep.contains(&NodeIndex::new(*i)))
        .map(|(_, m)| m.clone())
        .collect()
}

/// The manifests named in `names` plus everything reachable from them.
pub fn deep_keep(manifests: &[Manifest], names: &[String]) -> Vec<Manifest> {
    let graph = ManifestGraph::from_manifests(manifests);
    let roots: Vec<NodeIndex> = names.iter().filter_map(|n| graph.find(n)).collect();
    let keep = graph.reachable(&roots, &HashSet::new());
    manifests
        .iter()
        .enumerate()
        .filter(|(i, _)| keep.contains(&NodeIndex::new(*i)))
        .map(|(_, m)| m.clone())
        .collect()
}

/// Remove exactly the manifests named in `names`.
pub fn shallow_strip(manifests: &[Manifest], names: &[String]) -> Vec<Manifest> {
    manifests
        .iter()
        .filter(|m| !names.contains(&m.name))
        .cloned()
        .collect()
}

/// The transitive dependencies of the manifests named in `names`, excluding
/// those manifests themselves unless something else pulls them in.
pub fn dependencies_of(manifests: &[Manifest], names: &[String]) -> Vec<Manifest> {
    let graph = ManifestGraph::from_manifests(manifests);
    let starts: Vec<NodeIndex> = names
        .iter()
        .filter_map(|n| graph.find(n))
        .flat_map(|n| graph.dependencies_of(n).into_iter().map(|(t, _)| t))
        .collect();
    let keep = graph.reachable(&starts, &HashSet::new());
    manifests
        .iter()
        .enumerate()
        .filter(|(i, _)| keep.contains(&NodeIndex::new(*i)))
        .map(|(_, m)| m.clone())
        .collect()
}

/// True if names are unique and every dependency is present and satisfied.
pub fn consistent(manifests: &[Manifest]) -> bool {
    let by_name = index(manifests);
    by_name.len() == manifests.len()
        && manifests.iter().all(|m| {
            m.dependencies.iter().all(|d| {
                by_name
                    .get(d.name.as_str())
                    .is_some_and(|target| d.satisfied_by(target))
            })
        })
}

/// Name lookup over a manifest slice. Later duplicates shadow earlier ones.
pub fn index(manifests: &[Manifest]) -> HashMap<&str, &Manifest> {
    manifests.iter().map(|m| (m.name.as_str(), m)).collect()
}
