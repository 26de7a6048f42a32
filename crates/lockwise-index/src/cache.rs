//! Local manifest cache at `<cache>/<name>/<version>.toml`.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use lockwise_core::manifest::Manifest;
use lockwise_core::source::SourceId;
use lockwise_util::errors::LockwiseError;

use crate::index::IndexPackage;

/// Reject a name or version that would not stay one directory level below
/// the cache root.
pub fn check_component(what: &str, value: &str) -> Result<(), LockwiseError> {
    let unsafe_path = value.is_empty()
        || value == "."
        || value.contains("..")
        || value.contains(['/', '\\', ':'])
        || value.chars().any(char::is_control);
    if unsafe_path {
        return Err(LockwiseError::Spec {
            message: format!("{what} `{value}` cannot be used as a path component"),
        });
    }
    Ok(())
}

/// Directory holding one TOML file per cached manifest.
#[derive(Debug, Clone)]
pub struct LocalCache {
    root: PathBuf,
}

impl LocalCache {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    /// The root directory of this cache.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the cache entry for `name` at `version`.
    pub fn manifest_path(&self, name: &str, version: &str) -> PathBuf {
        self.root.join(name).join(format!("{version}.toml"))
    }

    pub fn has_manifest(&self, name: &str, version: &str) -> bool {
        self.manifest_path(name, version).is_file()
    }

    /// Read a cached manifest back, binding its dependencies to `source`.
    pub fn get_manifest(&self, name: &str, version: &str, source: &SourceId) -> Option<Manifest> {
        let content = fs::read_to_string(self.manifest_path(name, version)).ok()?;
        let package: IndexPackage = toml::from_str(&content).ok()?;
        package.into_manifest(source).ok()
    }

    /// Write a manifest into the cache, creating directories as needed.
    pub fn put_manifest(&self, manifest: &Manifest) -> Result<PathBuf, LockwiseError> {
        check_component("package name", &manifest.name)?;
        check_component("version", manifest.version.as_str())?;
        let path = self.manifest_path(&manifest.name, manifest.version.as_str());
        let content = toml::to_string_pretty(&IndexPackage::from_manifest(manifest)).map_err(|e| {
            LockwiseError::Generic {
                message: format!("Failed to encode cache entry for {manifest}: {e}"),
            }
        })?;
        lockwise_util::fs::write_atomic(&path, content.as_bytes())?;
        Ok(path)
    }

    /// Remove cached manifests not present in `keep`.
    ///
    /// `keep` contains `(name, version)` pairs. Package directories left
    /// empty are removed too. Returns the number of entries deleted.
    pub fn prune(&self, keep: &HashSet<(String, String)>) -> u32 {
        let mut removed = 0u32;
        let Ok(packages) = fs::read_dir(&self.root) else {
            return removed;
        };

        for package in packages.flatten() {
            let dir = package.path();
            if !dir.is_dir() {
                continue;
            }
            let name = package.file_name().to_string_lossy().to_string();
            let Ok(entries) = fs::read_dir(&dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                let Some(version) = path
                    .file_name()
                    .and_then(|f| f.to_str())
                    .and_then(|f| f.strip_suffix(".toml"))
                else {
                    continue;
                };
                if !keep.contains(&(name.clone(), version.to_string()))
                    && fs::remove_file(&path).is_ok()
                {
                    removed += 1;
                }
            }
            if fs::read_dir(&dir)
                .map(|mut rd| rd.next().is_none())
                .unwrap_or(false)
            {
                let _ = fs::remove_dir(&dir);
            }
        }
        removed
    }

    /// Total size of the cache directory in bytes.
    pub fn size(&self) -> u64 {
        dir_size(&self.root)
    }
}

fn dir_size(path: &Path) -> u64 {
    let mut total = 0u64;
    if let Ok(entries) = fs::read_dir(path) {
        for entry in entries.flatten() {
            if let Ok(m) = entry.metadata() {
                if m.is_dir() {
                    total += dir_size(&entry.path());
                } else {
                    total += m.len();
                }
            }
        }
    }
    total
}
