//! The `index` source: a TOML file listing every available package version.
//!
//! ```toml
//! [[package]]
//! name = "a"
//! version = "2.0"
//! dependencies = ["c (>= 1)"]
//! ```
//!
//! Dependencies declared by an indexed package are bound to the index itself.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use lockwise_core::dependency::Dependency;
use lockwise_core::manifest::Manifest;
use lockwise_core::source::{Source, SourceId};
use lockwise_core::version::Version;
use lockwise_util::errors::LockwiseError;

use crate::cache::{self, LocalCache};

/// Source kind recorded in source ids.
pub const KIND: &str = "index";

/// Serialized shape of an index file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexFile {
    #[serde(default, rename = "package")]
    pub packages: Vec<IndexPackage>,
}

/// One package version in an index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexPackage {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl IndexPackage {
    pub fn from_manifest(manifest: &Manifest) -> Self {
        Self {
            name: manifest.name.clone(),
            version: manifest.version.to_string(),
            dependencies: manifest.dependencies.iter().map(|d| d.to_string()).collect(),
        }
    }

    pub fn into_manifest(self, source: &SourceId) -> Result<Manifest, LockwiseError> {
        cache::check_component("package name", &self.name)?;
        cache::check_component("version", &self.version)?;
        let version = Version::parse(&self.version)?;
        self.dependencies
            .iter()
            .try_fold(Manifest::new(self.name.clone(), version, source.clone()), |m, d| {
                Ok(m.with_dependency(Dependency::parse(d, source.clone())?))
            })
    }
}

/// A package index held in memory.
pub struct IndexSource {
    id: SourceId,
    /// Versions per package name, newest first.
    packages: BTreeMap<String, Vec<Manifest>>,
    cache: Option<LocalCache>,
    cached: Mutex<Vec<Manifest>>,
}

impl IndexSource {
    /// Build an index from manifests already in memory.
    pub fn new(id: SourceId, manifests: impl IntoIterator<Item = Manifest>) -> Self {
        let mut packages: BTreeMap<String, Vec<Manifest>> = BTreeMap::new();
        for manifest in manifests {
            packages.entry(manifest.name.clone()).or_default().push(manifest);
        }
        for versions in packages.values_mut() {
            versions.sort_by(|a, b| b.version.cmp(&a.version));
        }
        Self {
            id,
            packages,
            cache: None,
            cached: Mutex::new(Vec::new()),
        }
    }

    /// Parse index TOML text.
    pub fn parse(id: SourceId, text: &str) -> Result<Self, LockwiseError> {
        let file: IndexFile = toml::from_str(text).map_err(|e| LockwiseError::SourceUnavailable {
            source_id: id.to_string(),
            message: format!("invalid index: {e}"),
        })?;
        let manifests = file
            .packages
            .into_iter()
            .map(|p| p.into_manifest(&id))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(id, manifests))
    }

    /// Read an index file from disk.
    pub fn load(id: SourceId, path: &Path) -> Result<Self, LockwiseError> {
        let text = std::fs::read_to_string(path).map_err(|e| LockwiseError::SourceUnavailable {
            source_id: id.to_string(),
            message: format!("cannot read {}: {e}", path.display()),
        })?;
        let index = Self::parse(id, &text)?;
        tracing::debug!(source = %index.id, packages = index.packages.len(), "loaded index");
        Ok(index)
    }

    /// Store manifests in `cache` when [`Source::cache`] is called.
    pub fn with_cache(mut self, cache: LocalCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// All versions of `name`, newest first.
    pub fn versions(&self, name: &str) -> &[Manifest] {
        self.packages.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Manifests passed to the most recent [`Source::cache`] call.
    pub fn cached(&self) -> Vec<Manifest> {
        self.cached.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl Source for IndexSource {
    fn id(&self) -> &SourceId {
        &self.id
    }

    /// Versions satisfying the requirement, newest first.
    ///
    /// Pre-release versions are only offered when the requirement itself
    /// names a pre-release.
    fn candidates(&self, dependency: &Dependency) -> Result<Vec<Manifest>, LockwiseError> {
        let allow_prerelease = dependency
            .requirement
            .constraints()
            .iter()
            .any(|c| c.version.is_prerelease());
        Ok(self
            .versions(&dependency.name)
            .iter()
            .filter(|m| allow_prerelease || !m.version.is_prerelease())
            .filter(|m| dependency.requirement.satisfied_by(&m.version))
            .cloned()
            .collect())
    }

    fn cache(&self, manifests: &[Manifest]) -> Result<(), LockwiseError> {
        if let Some(cache) = &self.cache {
            for manifest in manifests {
                cache.put_manifest(manifest)?;
            }
        }
        let mut cached = self.cached.lock().map_err(|_| LockwiseError::SourceUnavailable {
            source_id: self.id.to_string(),
            message: "cache state poisoned".to_string(),
        })?;
        *cached = manifests.to_vec();
        tracing::debug!(source = %self.id, count = manifests.len(), "cached manifests");
        Ok(())
    }
}
