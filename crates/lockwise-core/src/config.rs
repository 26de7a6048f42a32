use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use lockwise_util::errors::LockwiseError;

use crate::lockfile::LOCKFILE_NAME;

/// Name of the project specification file.
pub const SPEC_FILE_NAME: &str = "Lockwise.toml";

/// How the resolver orders the candidates a source returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CandidatePolicy {
    /// Keep the source's own order.
    #[default]
    SourceOrder,
    /// Highest version first.
    Newest,
    /// Lowest version first.
    Oldest,
}

/// Global user configuration loaded from `~/.lockwise/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub resolve: ResolveConfig,

    #[serde(default)]
    pub cache: CacheConfig,
}

/// Resolver settings from `[resolve]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolveConfig {
    #[serde(default)]
    pub policy: CandidatePolicy,
}

/// Manifest cache settings from `[cache]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Relative paths are taken from the project root, `~/` from the home directory.
    #[serde(default = "default_cache_dir")]
    pub dir: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
        }
    }
}

fn default_cache_dir() -> String {
    ".lockwise/cache".to_string()
}

impl GlobalConfig {
    /// Load the global configuration, or return defaults if the file doesn't exist.
    pub fn load() -> miette::Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load configuration from an explicit path, defaulting when it is absent.
    pub fn load_from(path: &Path) -> miette::Result<Self> {
        if !path.is_file() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| LockwiseError::Generic {
            message: format!("Failed to read global config: {e}"),
        })?;
        toml::from_str(&content).map_err(|e| {
            LockwiseError::Generic {
                message: format!("Failed to parse global config: {e}"),
            }
            .into()
        })
    }

    /// Returns the default path to the global config file.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }
}

/// Returns the path to the lockwise data directory (`~/.lockwise/`).
pub fn dirs_path() -> PathBuf {
    home_dir().join(".lockwise")
}

fn home_dir() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home)
}

/// Everything an operation needs to know about where it runs.
///
/// Passed explicitly to every operation instead of being cached globally.
#[derive(Debug, Clone)]
pub struct Context {
    pub project_root: PathBuf,
    pub spec_path: PathBuf,
    pub lock_path: PathBuf,
    pub cache_dir: PathBuf,
    pub policy: CandidatePolicy,
}

impl Context {
    /// Context for `project_root` with default settings.
    pub fn new(project_root: &Path) -> Self {
        Self::with_config(project_root, &GlobalConfig::default())
    }

    /// Context for `project_root` using values from `config`.
    pub fn with_config(project_root: &Path, config: &GlobalConfig) -> Self {
        let cache_dir = match config.cache.dir.strip_prefix("~/") {
            Some(rest) => home_dir().join(rest),
            None => project_root.join(&config.cache.dir),
        };
        Self {
            project_root: project_root.to_path_buf(),
            spec_path: project_root.join(SPEC_FILE_NAME),
            lock_path: project_root.join(LOCKFILE_NAME),
            cache_dir,
            policy: config.resolve.policy,
        }
    }

    /// Find the nearest directory at or above `start` holding `Lockwise.toml`.
    pub fn discover(start: &Path, config: &GlobalConfig) -> miette::Result<Self> {
        let root = lockwise_util::fs::find_ancestor_with(start, SPEC_FILE_NAME).ok_or_else(|| {
            LockwiseError::Spec {
                message: format!("No {SPEC_FILE_NAME} found in {} or any parent", start.display()),
            }
        })?;
        Ok(Self::with_config(&root, config))
    }
}
