//! Backtracking dependency resolution.
//!
//! The search keeps an assignment `name -> Manifest` and a FIFO worklist of
//! dependencies still to check. Every time a name is assigned for the first
//! time a choice point is pushed holding the untried candidates and snapshots
//! of the assignment and worklist, so a conflict anywhere later rewinds to the
//! most recent choice that still has alternatives. The stack is explicit; the
//! search never recurses.

use std::collections::{BTreeMap, HashMap, VecDeque};

use lockwise_core::config::CandidatePolicy;
use lockwise_core::conflict::{Conflict, ConflictKind, ConflictReport};
use lockwise_core::dependency::Dependency;
use lockwise_core::manifest::Manifest;
use lockwise_core::resolution::Resolution;
use lockwise_core::spec::Specification;

use crate::cache::CandidateCache;
use crate::manifest_set;

/// Resolve `spec`, preferring the manifests in `partial`.
pub fn resolve(spec: &Specification, partial: &[Manifest]) -> Resolution {
    Resolver::new(spec).resolve(partial)
}

/// Entry in the worklist.
#[derive(Debug, Clone)]
struct Pending {
    dependency: Dependency,
    /// Display form of the manifest that declared the dependency.
    required_by: Option<String>,
}

struct ChoicePoint {
    name: String,
    remaining: VecDeque<Manifest>,
    /// State just before `name` was first assigned.
    assignment: BTreeMap<String, Manifest>,
    worklist: VecDeque<Pending>,
}

/// Mutable state of one search.
struct Search<'p> {
    assignment: BTreeMap<String, Manifest>,
    worklist: VecDeque<Pending>,
    stack: Vec<ChoicePoint>,
    cache: CandidateCache,
    report: ConflictReport,
    preferred: HashMap<&'p str, &'p Manifest>,
    backtracks: usize,
}

pub struct Resolver<'a> {
    spec: &'a Specification,
    policy: CandidatePolicy,
}

impl<'a> Resolver<'a> {
    pub fn new(spec: &'a Specification) -> Self {
        Self {
            spec,
            policy: CandidatePolicy::default(),
        }
    }

    /// How to order candidates that satisfy a requirement.
    pub fn with_policy(mut self, policy: CandidatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run the search.
    ///
    /// A locked manifest in `partial` is tried before anything the source
    /// offers, as long as it satisfies the dependency being resolved. Failure
    /// is reported through [`Resolution::correct`], never as an error.
    pub fn resolve(&self, partial: &[Manifest]) -> Resolution {
        let mut search = Search {
            assignment: BTreeMap::new(),
            worklist: self
                .spec
                .dependencies()
                .iter()
                .map(|d| Pending {
                    dependency: d.clone(),
                    required_by: None,
                })
                .collect(),
            stack: Vec::new(),
            cache: CandidateCache::new(),
            report: ConflictReport::new(),
            preferred: manifest_set::index(partial),
            backtracks: 0,
        };
        tracing::debug!(
            dependencies = self.spec.dependencies().len(),
            preferred = partial.len(),
            policy = ?self.policy,
            "resolving"
        );

        while let Some(pending) = search.worklist.pop_front() {
            let dep = &pending.dependency;

            let mismatch = match search.assignment.get(&dep.name) {
                Some(chosen) if dep.satisfied_by(chosen) => continue,
                Some(chosen) => Some(chosen.to_string()),
                None => None,
            };

            if let Some(resolved) = mismatch {
                tracing::debug!(dependency = %dep, %resolved, "conflict");
                search.report.add(Conflict {
                    dependency: dep.to_string(),
                    required_by: pending.required_by.clone(),
                    kind: ConflictKind::Mismatch { resolved },
                });
                if !self.backtrack(&mut search) {
                    return self.exhausted(search);
                }
                continue;
            }

            let mut candidates: VecDeque<Manifest> = self.candidates(&mut search, dep).into();
            let Some(first) = candidates.pop_front() else {
                tracing::debug!(dependency = %dep, "no candidates");
                search.report.add(Conflict {
                    dependency: dep.to_string(),
                    required_by: pending.required_by.clone(),
                    kind: ConflictKind::NoCandidates,
                });
                if !self.backtrack(&mut search) {
                    return self.exhausted(search);
                }
                continue;
            };

            search.stack.push(ChoicePoint {
                name: dep.name.clone(),
                remaining: candidates,
                assignment: search.assignment.clone(),
                worklist: search.worklist.clone(),
            });
            self.assign(&mut search, first);
        }

        let manifests: Vec<Manifest> = search.assignment.into_values().collect();
        tracing::debug!(
            manifests = manifests.len(),
            backtracks = search.backtracks,
            lookups = search.cache.len(),
            "resolved"
        );
        let manifests = match manifest_set::sort(&manifests) {
            Ok(sorted) => sorted,
            Err(e) => {
                tracing::warn!("{e}; keeping name order");
                manifests
            }
        };
        Resolution::resolved(self.spec.dependencies().to_vec(), manifests)
    }

    /// Satisfying candidates for `dep` in trial order.
    fn candidates(&self, search: &mut Search<'_>, dep: &Dependency) -> Vec<Manifest> {
        let offered = search.cache.get_or_insert_with(dep, || self.fetch(dep));
        let mut list: Vec<Manifest> = offered
            .iter()
            .filter(|m| dep.satisfied_by(m))
            .cloned()
            .collect();

        match self.policy {
            CandidatePolicy::SourceOrder => {}
            CandidatePolicy::Newest => list.sort_by(|a, b| b.version.cmp(&a.version)),
            CandidatePolicy::Oldest => list.sort_by(|a, b| a.version.cmp(&b.version)),
        }

        if let Some(locked) = search
            .preferred
            .get(dep.name.as_str())
            .filter(|p| p.source == dep.source && dep.satisfied_by(p))
        {
            list.retain(|m| m.version != locked.version);
            list.insert(0, (*locked).clone());
        }
        list
    }

    fn fetch(&self, dep: &Dependency) -> Vec<Manifest> {
        let Some(source) = self.spec.source(&dep.source) else {
            tracing::warn!(dependency = %dep, source = %dep.source, "dependency refers to an unregistered source");
            return Vec::new();
        };
        match source.candidates(dep) {
            Ok(found) => {
                tracing::debug!(dependency = %dep, count = found.len(), "fetched candidates");
                found
            }
            Err(e) => {
                tracing::warn!(dependency = %dep, "{e}");
                Vec::new()
            }
        }
    }

    /// Record `manifest` and queue its dependencies.
    ///
    /// A dependency whose name is also a top-level dependency is looked up in
    /// the source the specification names for it.
    fn assign(&self, search: &mut Search<'_>, manifest: Manifest) {
        tracing::debug!(%manifest, "trying");
        let required_by = manifest.to_string();
        for dep in &manifest.dependencies {
            let mut dependency = dep.clone();
            if let Some(top) = self.spec.dependency(&dep.name) {
                dependency.source = top.source.clone();
            }
            search.worklist.push_back(Pending {
                dependency,
                required_by: Some(required_by.clone()),
            });
        }
        search.assignment.insert(manifest.name.clone(), manifest);
    }

    /// Rewind to the latest choice point with an untried candidate and try
    /// it. Returns `false` when every choice point is exhausted.
    fn backtrack(&self, search: &mut Search<'_>) -> bool {
        while let Some(mut point) = search.stack.pop() {
            let Some(next) = point.remaining.pop_front() else {
                tracing::debug!(name = %point.name, "choice point exhausted");
                continue;
            };
            search.backtracks += 1;
            search.assignment = point.assignment.clone();
            search.worklist = point.worklist.clone();
            search.stack.push(point);
            self.assign(search, next);
            return true;
        }
        false
    }

    fn exhausted(&self, search: Search<'_>) -> Resolution {
        tracing::debug!(
            conflicts = search.report.len(),
            backtracks = search.backtracks,
            "search exhausted"
        );
        Resolution::unresolvable(self.spec.dependencies().to_vec(), search.report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use lockwise_core::source::{Source, SourceId};
    use lockwise_core::version::{Requirement, Version};
    use lockwise_util::errors::LockwiseError;

    /// Offers manifests in the order given, oldest first.
    struct ListSource {
        id: SourceId,
        manifests: Vec<Manifest>,
    }

    impl Source for ListSource {
        fn id(&self) -> &SourceId {
            &self.id
        }
        fn candidates(&self, dep: &Dependency) -> Result<Vec<Manifest>, LockwiseError> {
            Ok(self.manifests.iter().filter(|m| m.name == dep.name).cloned().collect())
        }
        fn cache(&self, _: &[Manifest]) -> Result<(), LockwiseError> {
            Ok(())
        }
    }

    fn src() -> SourceId {
        SourceId::new("list", "test")
    }

    fn m(name: &str, version: &str) -> Manifest {
        Manifest::new(name, Version::parse(version).unwrap(), src())
    }

    fn dep(name: &str, req: &str) -> Dependency {
        Dependency::new(name, Requirement::parse(req).unwrap(), src())
    }

    fn spec() -> Specification {
        Specification::builder()
            .source(Arc::new(ListSource {
                id: src(),
                manifests: vec![m("a", "1.0"), m("a", "3.0"), m("a", "2.0")],
            }))
            .dependency(dep("a", "*"))
            .build()
            .unwrap()
    }

    fn version_of(resolution: &Resolution, name: &str) -> String {
        resolution.manifest(name).unwrap().version.to_string()
    }

    #[test]
    fn source_order_is_default() {
        let spec = spec();
        assert_eq!(version_of(&resolve(&spec, &[]), "a"), "1.0");
    }

    #[test]
    fn newest_and_oldest_policies() {
        let spec = spec();
        let newest = Resolver::new(&spec).with_policy(CandidatePolicy::Newest).resolve(&[]);
        assert_eq!(version_of(&newest, "a"), "3.0");
        let oldest = Resolver::new(&spec).with_policy(CandidatePolicy::Oldest).resolve(&[]);
        assert_eq!(version_of(&oldest, "a"), "1.0");
    }

    #[test]
    fn preferred_manifest_beats_policy() {
        let spec = spec();
        let resolution = Resolver::new(&spec)
            .with_policy(CandidatePolicy::Newest)
            .resolve(&[m("a", "2.0")]);
        assert_eq!(version_of(&resolution, "a"), "2.0");
    }

    #[test]
    fn preferred_manifest_from_other_source_is_ignored() {
        let spec = spec();
        let elsewhere = Manifest::new("a", Version::parse("2.0").unwrap(), SourceId::new("list", "other"));
        let resolution = resolve(&spec, &[elsewhere]);
        assert_eq!(version_of(&resolution, "a"), "1.0");
        assert_eq!(resolution.manifest("a").unwrap().source, src());
    }

    #[test]
    fn empty_specification_resolves_to_nothing() {
        let spec = Specification::builder().build().unwrap();
        let resolution = resolve(&spec, &[]);
        assert!(resolution.correct());
        assert!(resolution.manifests().is_empty());
    }
}
