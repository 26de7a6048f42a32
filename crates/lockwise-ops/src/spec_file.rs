//! Reader for the project's `Lockwise.toml`.
//!
//! ```toml
//! [sources.main]
//! index = "vendor/index.toml"
//!
//! [dependencies]
//! a = ">= 1.0"
//! b = { requirement = "*", source = "main" }
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use lockwise_core::config::Context;
use lockwise_core::dependency::Dependency;
use lockwise_core::source::SourceId;
use lockwise_core::spec::Specification;
use lockwise_core::version::Requirement;
use lockwise_index::cache::LocalCache;
use lockwise_index::index::{self, IndexSource};
use lockwise_util::errors::LockwiseError;

/// The parsed contents of `Lockwise.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecFile {
    #[serde(default)]
    pub sources: BTreeMap<String, SourceDecl>,

    #[serde(default)]
    pub dependencies: BTreeMap<String, DependencyDecl>,
}

/// A named source. Index paths are relative to the project root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDecl {
    pub index: String,
}

/// A dependency entry: a bare requirement string or a table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DependencyDecl {
    Short(String),
    Detailed(DetailedDecl),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedDecl {
    #[serde(default = "any_requirement")]
    pub requirement: String,
    #[serde(default)]
    pub source: Option<String>,
}

fn any_requirement() -> String {
    "*".to_string()
}

impl SpecFile {
    pub fn from_path(path: &Path) -> miette::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| LockwiseError::Spec {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> miette::Result<Self> {
        toml::from_str(content).map_err(|e| {
            LockwiseError::Spec {
                message: format!("Failed to parse Lockwise.toml: {e}"),
            }
            .into()
        })
    }

    /// The id a declared source is registered under.
    pub fn source_id(&self, name: &str) -> Option<SourceId> {
        self.sources
            .get(name)
            .map(|decl| SourceId::new(index::KIND, decl.index.clone()))
    }

    /// Typed dependencies, sorted by name.
    ///
    /// An entry without a `source` uses the only declared source; with
    /// several sources declared it has to name one.
    pub fn dependencies(&self) -> Result<Vec<Dependency>, LockwiseError> {
        self.dependencies
            .iter()
            .map(|(name, decl)| {
                let (requirement, source) = match decl {
                    DependencyDecl::Short(req) => (req.as_str(), None),
                    DependencyDecl::Detailed(d) => (d.requirement.as_str(), d.source.as_deref()),
                };
                let source = self.source_for(name, source)?;
                let requirement = Requirement::parse(requirement).map_err(|e| LockwiseError::Spec {
                    message: format!("dependency `{name}`: {e}"),
                })?;
                Ok(Dependency::new(name.clone(), requirement, source))
            })
            .collect()
    }

    fn source_for(&self, dependency: &str, named: Option<&str>) -> Result<SourceId, LockwiseError> {
        match named {
            Some(name) => self.source_id(name).ok_or_else(|| LockwiseError::Spec {
                message: format!("dependency `{dependency}` refers to undeclared source `{name}`"),
            }),
            None => {
                let mut declared = self.sources.values();
                match (declared.next(), declared.next()) {
                    (Some(only), None) => Ok(SourceId::new(index::KIND, only.index.clone())),
                    (None, _) => Err(LockwiseError::Spec {
                        message: format!("dependency `{dependency}` has no source to come from"),
                    }),
                    _ => Err(LockwiseError::Spec {
                        message: format!(
                            "dependency `{dependency}` must name a source when several are declared"
                        ),
                    }),
                }
            }
        }
    }

    /// Build a [`Specification`], loading every declared index.
    ///
    /// Each index stores cached manifests under `ctx.cache_dir`.
    pub fn into_specification(self, ctx: &Context) -> miette::Result<Specification> {
        let mut builder = Specification::builder();
        for (name, decl) in &self.sources {
            let id = SourceId::new(index::KIND, decl.index.clone());
            let path = ctx.project_root.join(&decl.index);
            tracing::debug!(source = %name, path = %path.display(), "loading index");
            let source = IndexSource::load(id, &path)?.with_cache(LocalCache::new(&ctx.cache_dir));
            builder = builder.source(Arc::new(source));
        }
        for dependency in self.dependencies()? {
            builder = builder.dependency(dependency);
        }
        Ok(builder.build()?)
    }
}

/// Read `Lockwise.toml` for `ctx` and build its specification.
pub fn load_specification(ctx: &Context) -> miette::Result<Specification> {
    if !ctx.spec_path.is_file() {
        return Err(LockwiseError::Spec {
            message: format!("{} not found", ctx.spec_path.display()),
        }
        .into());
    }
    SpecFile::from_path(&ctx.spec_path)?.into_specification(ctx)
}
