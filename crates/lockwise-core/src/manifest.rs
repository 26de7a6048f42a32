use std::fmt;

use crate::dependency::Dependency;
use crate::source::SourceId;
use crate::version::Version;

/// A concrete package version and the dependencies it declares.
///
/// Produced by a [`Source`](crate::source::Source) and never modified
/// afterwards; the resolver and the manifest-set functions clone manifests
/// rather than editing them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub name: String,
    pub version: Version,
    pub dependencies: Vec<Dependency>,
    pub source: SourceId,
}

impl Manifest {
    pub fn new(name: impl Into<String>, version: Version, source: SourceId) -> Self {
        Self {
            name: name.into(),
            version,
            dependencies: Vec::new(),
            source,
        }
    }

    /// Builder-style helper appending a dependency.
    pub fn with_dependency(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    /// Identity of this manifest within a resolution: name plus version.
    pub fn key(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }
}

impl fmt::Display for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.version)
    }
}
