//! Canonical lockfile encoding and the round-trip ("bounce") check.
//!
//! The on-disk form is TOML:
//!
//! ```toml
//! # This file is generated by lockwise. Do not edit it by hand.
//! version = 1
//!
//! [[source]]
//! id = "index+vendor/index.toml"
//!
//! [[source.package]]
//! name = "a"
//! version = "2.0"
//! dependencies = ["c (>= 1)"]
//!
//! [[dependency]]
//! name = "a"
//! requirement = ">= 1.0"
//! source = "index+vendor/index.toml"
//! ```
//!
//! Sources are sorted by id, packages by name, top-level dependencies by name.
//! Package dependencies keep the manifest's own order. A dependency declared
//! with the source its package is locked from is written `name (requirement)`;
//! any other source is spelled out as `name (requirement) from kind+location`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use lockwise_util::errors::LockwiseError;

use crate::dependency::Dependency;
use crate::manifest::Manifest;
use crate::resolution::Resolution;
use crate::source::SourceId;
use crate::version::{Requirement, Version};

/// Default lockfile name next to `Lockwise.toml`.
pub const LOCKFILE_NAME: &str = "Lockwise.lock";

const FORMAT_VERSION: u32 = 1;
const HEADER: &str = "# This file is generated by lockwise. Do not edit it by hand.\n";
const FROM: &str = " from ";

/// Serialized shape of a lockfile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockDocument {
    pub version: u32,
    #[serde(default, rename = "source")]
    pub sources: Vec<LockedSource>,
    #[serde(default, rename = "dependency")]
    pub dependencies: Vec<LockedDependency>,
}

/// A source and the packages locked from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockedSource {
    pub id: String,
    #[serde(default, rename = "package")]
    pub packages: Vec<LockedPackage>,
}

/// A locked manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockedPackage {
    pub name: String,
    pub version: String,
    /// `name (requirement)` strings in manifest order.
    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// A top-level dependency as it was when the lock was produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockedDependency {
    pub name: String,
    pub requirement: String,
    pub source: String,
}

impl LockDocument {
    /// Canonical document for a successful resolution.
    pub fn from_resolution(resolution: &Resolution) -> Result<Self, LockwiseError> {
        if !resolution.correct() {
            return Err(LockwiseError::Lockfile {
                message: "cannot lock a resolution that did not succeed".to_string(),
            });
        }

        let owner: HashMap<&str, &SourceId> = resolution
            .manifests()
            .iter()
            .map(|m| (m.name.as_str(), &m.source))
            .collect();
        let dependency_ref = |m: &Manifest, d: &Dependency| {
            let implied = owner.get(d.name.as_str()).copied().unwrap_or(&m.source);
            if &d.source == implied {
                d.to_string()
            } else {
                format!("{d}{FROM}{}", d.source)
            }
        };

        let mut sources: Vec<LockedSource> = resolution
            .sources()
            .iter()
            .map(|id| {
                let mut packages: Vec<LockedPackage> = resolution
                    .manifests()
                    .iter()
                    .filter(|m| &m.source == id)
                    .map(|m| LockedPackage {
                        name: m.name.clone(),
                        version: m.version.to_string(),
                        dependencies: m.dependencies.iter().map(|d| dependency_ref(m, d)).collect(),
                    })
                    .collect();
                packages.sort_by(|a, b| a.name.cmp(&b.name));
                LockedSource {
                    id: id.to_string(),
                    packages,
                }
            })
            .collect();
        sources.sort_by(|a, b| a.id.cmp(&b.id));

        let mut dependencies: Vec<LockedDependency> = resolution
            .dependencies
            .iter()
            .map(|d| LockedDependency {
                name: d.name.clone(),
                requirement: d.requirement.to_string(),
                source: d.source.to_string(),
            })
            .collect();
        dependencies.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(Self {
            version: FORMAT_VERSION,
            sources,
            dependencies,
        })
    }

    /// Rebuild the resolution this document describes.
    pub fn into_resolution(self) -> Result<Resolution, LockwiseError> {
        if self.version != FORMAT_VERSION {
            return Err(LockwiseError::Lockfile {
                message: format!(
                    "unsupported lockfile version {} (expected {FORMAT_VERSION})",
                    self.version
                ),
            });
        }

        // First pass: where each locked package lives.
        let mut owner: HashMap<String, SourceId> = HashMap::new();
        for source in &self.sources {
            let id: SourceId = source.id.parse()?;
            for pkg in &source.packages {
                if owner.insert(pkg.name.clone(), id.clone()).is_some() {
                    return Err(LockwiseError::Lockfile {
                        message: format!("package `{}` is locked more than once", pkg.name),
                    });
                }
            }
        }

        let mut manifests = Vec::new();
        for source in self.sources {
            let id: SourceId = source.id.parse()?;
            for pkg in source.packages {
                let version = Version::parse(&pkg.version)?;
                let mut manifest = Manifest::new(pkg.name, version, id.clone());
                for text in &pkg.dependencies {
                    let (text, declared) = match text.rsplit_once(FROM) {
                        Some((dep, source)) => (dep, Some(source.parse::<SourceId>()?)),
                        None => (text.as_str(), None),
                    };
                    let dep_source = match declared {
                        Some(source) => source,
                        None => {
                            let dep_name = text.split('(').next().unwrap_or_default().trim();
                            owner.get(dep_name).cloned().unwrap_or_else(|| id.clone())
                        }
                    };
                    manifest = manifest.with_dependency(Dependency::parse(text, dep_source)?);
                }
                manifests.push(manifest);
            }
        }

        let dependencies = self
            .dependencies
            .into_iter()
            .map(|d| {
                Ok(Dependency::new(
                    d.name,
                    Requirement::parse(&d.requirement)?,
                    d.source.parse()?,
                ))
            })
            .collect::<Result<Vec<_>, LockwiseError>>()?;

        Ok(Resolution::resolved(dependencies, manifests))
    }
}

/// Encoding of a [`Resolution`] to text and back.
pub trait LockCodec {
    fn serialize(&self, resolution: &Resolution) -> Result<String, LockwiseError>;
    fn parse(&self, text: &str) -> Result<Resolution, LockwiseError>;
}

/// The standard TOML codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlLockCodec;

impl LockCodec for TomlLockCodec {
    fn serialize(&self, resolution: &Resolution) -> Result<String, LockwiseError> {
        let doc = LockDocument::from_resolution(resolution)?;
        let body = toml::to_string_pretty(&doc).map_err(|e| LockwiseError::Lockfile {
            message: format!("failed to encode lockfile: {e}"),
        })?;
        Ok(format!("{HEADER}{body}"))
    }

    fn parse(&self, text: &str) -> Result<Resolution, LockwiseError> {
        let doc: LockDocument = toml::from_str(text).map_err(|e| LockwiseError::Lockfile {
            message: format!("failed to parse lockfile: {e}"),
        })?;
        doc.into_resolution()
    }
}

/// Serialize, parse, and re-serialize `resolution`, returning the text only
/// if both encodings are byte-for-byte identical.
pub fn bounce(codec: &dyn LockCodec, resolution: &Resolution) -> Result<String, LockwiseError> {
    let first = codec.serialize(resolution)?;
    let reparsed = codec.parse(&first)?;
    let second = codec.serialize(&reparsed)?;
    if first != second {
        tracing::error!("lockfile codec failed the round-trip check");
        return Err(LockwiseError::RoundTripInconsistency { first, second });
    }
    Ok(first)
}
