//! Differences between a specification and the lock it is compared with.

use std::fmt;

use lockwise_core::dependency::Dependency;
use lockwise_core::manifest::Manifest;
use lockwise_core::resolution::Resolution;
use lockwise_core::spec::Specification;

use crate::manifest_set;

/// How a top-level dependency differs from the lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Unchanged,
    Added,
    Removed,
    /// Same name, different requirement or source.
    Changed,
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Change::Unchanged => "unchanged",
            Change::Added => "added",
            Change::Removed => "removed",
            Change::Changed => "changed",
        };
        f.write_str(s)
    }
}

/// Classification of every top-level dependency name.
///
/// Names from the specification come first in declaration order, followed by
/// names only the lock knows about.
#[derive(Debug)]
pub struct SpecChangeSet<'a> {
    lock: &'a Resolution,
    changes: Vec<(String, Change)>,
    /// Added names whose locked manifest already satisfies the new dependency.
    reusable: Vec<String>,
}

impl<'a> SpecChangeSet<'a> {
    pub fn new(spec: &Specification, lock: &'a Resolution) -> Self {
        let locked = |name: &str| lock.dependencies.iter().find(|d| d.name == name);

        let mut changes: Vec<(String, Change)> = spec
            .dependencies()
            .iter()
            .map(|dep| {
                let change = match locked(&dep.name) {
                    None => Change::Added,
                    Some(prev) if same_dependency(dep, prev) => Change::Unchanged,
                    Some(_) => Change::Changed,
                };
                (dep.name.clone(), change)
            })
            .collect();
        changes.extend(
            lock.dependencies
                .iter()
                .filter(|d| spec.dependency(&d.name).is_none())
                .map(|d| (d.name.clone(), Change::Removed)),
        );

        let reusable = spec
            .dependencies()
            .iter()
            .filter(|dep| locked(&dep.name).is_none())
            .filter(|dep| {
                lock.manifest(&dep.name)
                    .is_some_and(|m| m.source == dep.source && dep.satisfied_by(m))
            })
            .map(|dep| dep.name.clone())
            .collect();

        for (name, change) in &changes {
            if *change != Change::Unchanged {
                tracing::debug!(%name, %change, "specification differs from lock");
            }
        }
        Self {
            lock,
            changes,
            reusable,
        }
    }

    /// True if the lock was produced for exactly this specification.
    pub fn same(&self) -> bool {
        self.lock.correct() && self.changes.iter().all(|(_, c)| *c == Change::Unchanged)
    }

    pub fn changes(&self) -> &[(String, Change)] {
        &self.changes
    }

    pub fn change(&self, name: &str) -> Option<Change> {
        self.changes.iter().find(|(n, _)| n == name).map(|(_, c)| *c)
    }

    fn names(&self, wanted: Change) -> Vec<String> {
        self.changes
            .iter()
            .filter(|(_, c)| *c == wanted)
            .map(|(n, _)| n.clone())
            .collect()
    }

    pub fn unchanged_names(&self) -> Vec<String> {
        self.names(Change::Unchanged)
    }

    pub fn added_names(&self) -> Vec<String> {
        self.names(Change::Added)
    }

    pub fn removed_names(&self) -> Vec<String> {
        self.names(Change::Removed)
    }

    pub fn changed_names(&self) -> Vec<String> {
        self.names(Change::Changed)
    }

    /// The locked manifests worth preferring when resolving again.
    ///
    /// The whole locked subgraph of every unchanged top-level dependency is
    /// kept, as is that of an added dependency whose locked manifest already
    /// satisfies it. A removed name survives while a kept manifest still
    /// reaches it. Manifests of changed names, and of added names the lock
    /// cannot satisfy, are dropped; their dependencies stay only while a kept
    /// root still reaches them.
    pub fn analyze(&self) -> Vec<Manifest> {
        let manifests = self.lock.manifests();
        if self.same() {
            return manifests.to_vec();
        }
        let mut roots = self.unchanged_names();
        roots.extend(self.reusable.iter().cloned());
        let mut replaced = self.changed_names();
        replaced.extend(
            self.added_names()
                .into_iter()
                .filter(|name| !self.reusable.contains(name)),
        );

        let kept = manifest_set::deep_keep(manifests, &roots);
        let kept = manifest_set::shallow_strip(&kept, &replaced);
        tracing::debug!(kept = kept.len(), of = manifests.len(), "analyzed lock");
        kept
    }
}

fn same_dependency(a: &Dependency, b: &Dependency) -> bool {
    a.name == b.name && a.requirement == b.requirement && a.source == b.source
}
