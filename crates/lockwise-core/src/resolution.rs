use std::collections::BTreeSet;

use crate::conflict::ConflictReport;
use crate::dependency::Dependency;
use crate::manifest::Manifest;
use crate::source::SourceId;

/// What a resolve call produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A consistent manifest set, dependencies before dependents.
    Resolved(Vec<Manifest>),
    /// The search ran out of choice points.
    Unresolvable(ConflictReport),
}

/// The result of resolving a specification, and the in-memory form of a lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Top-level dependencies the resolution was computed for.
    pub dependencies: Vec<Dependency>,
    outcome: Outcome,
    sources: Vec<SourceId>,
}

impl Resolution {
    pub fn resolved(dependencies: Vec<Dependency>, manifests: Vec<Manifest>) -> Self {
        let sources = collect_sources(&dependencies, &manifests);
        Self {
            dependencies,
            outcome: Outcome::Resolved(manifests),
            sources,
        }
    }

    pub fn unresolvable(dependencies: Vec<Dependency>, report: ConflictReport) -> Self {
        let sources = collect_sources(&dependencies, &[]);
        Self {
            dependencies,
            outcome: Outcome::Unresolvable(report),
            sources,
        }
    }

    /// True if the search succeeded.
    pub fn correct(&self) -> bool {
        matches!(self.outcome, Outcome::Resolved(_))
    }

    /// The resolved manifests; empty for an incorrect resolution.
    pub fn manifests(&self) -> &[Manifest] {
        match &self.outcome {
            Outcome::Resolved(manifests) => manifests,
            Outcome::Unresolvable(_) => &[],
        }
    }

    pub fn manifest(&self, name: &str) -> Option<&Manifest> {
        self.manifests().iter().find(|m| m.name == name)
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    /// The conflict trace of a failed search.
    pub fn conflicts(&self) -> Option<&ConflictReport> {
        match &self.outcome {
            Outcome::Unresolvable(report) => Some(report),
            Outcome::Resolved(_) => None,
        }
    }

    /// Every source referenced by the dependencies or manifests, sorted.
    pub fn sources(&self) -> &[SourceId] {
        &self.sources
    }
}

fn collect_sources(dependencies: &[Dependency], manifests: &[Manifest]) -> Vec<SourceId> {
    let mut sources: BTreeSet<SourceId> = dependencies.iter().map(|d| d.source.clone()).collect();
    sources.extend(manifests.iter().map(|m| m.source.clone()));
    sources.into_iter().collect()
}
