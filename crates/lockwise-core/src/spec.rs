//! The typed specification: top-level dependencies plus the live sources
//! they are bound to.
//!
//! The core never reads specification syntax; a front end (see the
//! `Lockwise.toml` reader in `lockwise-ops`) or a test builds one with
//! [`SpecificationBuilder`].

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

use lockwise_util::errors::LockwiseError;

use crate::dependency::Dependency;
use crate::source::{Source, SourceId};

/// Ordered top-level dependencies and the sources they reference.
#[derive(Clone)]
pub struct Specification {
    dependencies: Vec<Dependency>,
    sources: BTreeMap<SourceId, Arc<dyn Source>>,
}

impl Specification {
    pub fn builder() -> SpecificationBuilder {
        SpecificationBuilder::default()
    }

    /// Top-level dependencies in declaration order.
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    pub fn dependency(&self, name: &str) -> Option<&Dependency> {
        self.dependencies.iter().find(|d| d.name == name)
    }

    /// Look up the live capability for a source id.
    pub fn source(&self, id: &SourceId) -> Option<&Arc<dyn Source>> {
        self.sources.get(id)
    }

    /// Registered source ids in sorted order.
    pub fn source_ids(&self) -> impl Iterator<Item = &SourceId> {
        self.sources.keys()
    }
}

impl fmt::Debug for Specification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Specification")
            .field("dependencies", &self.dependencies)
            .field("sources", &self.sources.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for [`Specification`].
#[derive(Default)]
pub struct SpecificationBuilder {
    dependencies: Vec<Dependency>,
    sources: BTreeMap<SourceId, Arc<dyn Source>>,
}

impl SpecificationBuilder {
    /// Register a source. Re-registering an id replaces the earlier source.
    pub fn source(mut self, source: Arc<dyn Source>) -> Self {
        self.sources.insert(source.id().clone(), source);
        self
    }

    /// Append a top-level dependency.
    pub fn dependency(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    /// Validate and build.
    ///
    /// Fails on duplicate top-level names and on dependencies bound to a
    /// source that was never registered.
    pub fn build(self) -> Result<Specification, LockwiseError> {
        let mut seen = HashSet::new();
        for dep in &self.dependencies {
            if !seen.insert(dep.name.as_str()) {
                return Err(LockwiseError::Spec {
                    message: format!("dependency `{}` is declared more than once", dep.name),
                });
            }
            if !self.sources.contains_key(&dep.source) {
                return Err(LockwiseError::Spec {
                    message: format!(
                        "dependency `{}` refers to unknown source {}",
                        dep.name, dep.source
                    ),
                });
            }
        }
        Ok(Specification {
            dependencies: self.dependencies,
            sources: self.sources,
        })
    }
}
