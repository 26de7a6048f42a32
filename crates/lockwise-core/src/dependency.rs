use std::fmt;

use lockwise_util::errors::LockwiseError;

use crate::manifest::Manifest;
use crate::source::SourceId;
use crate::version::Requirement;

/// A named requirement bound to the source expected to satisfy it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub name: String,
    pub requirement: Requirement,
    pub source: SourceId,
}

impl Dependency {
    pub fn new(name: impl Into<String>, requirement: Requirement, source: SourceId) -> Self {
        Self {
            name: name.into(),
            requirement,
            source,
        }
    }

    /// Parse `"name (requirement)"` or a bare `"name"` (any version).
    pub fn parse(s: &str, source: SourceId) -> Result<Self, LockwiseError> {
        let s = s.trim();
        let (name, requirement) = match s.split_once('(') {
            Some((name, rest)) => {
                let inner = rest.strip_suffix(')').ok_or_else(|| LockwiseError::Version {
                    message: format!("unterminated requirement in `{s}`"),
                })?;
                (name.trim(), Requirement::parse(inner)?)
            }
            None => (s, Requirement::any()),
        };
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(LockwiseError::Spec {
                message: format!("invalid dependency name in `{s}`"),
            });
        }
        Ok(Self::new(name, requirement, source))
    }

    /// True if `manifest` has this dependency's name and an acceptable version.
    pub fn satisfied_by(&self, manifest: &Manifest) -> bool {
        manifest.name == self.name && self.requirement.satisfied_by(&manifest.version)
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.requirement)
    }
}
