//! Source identities and the capability trait every backend implements.

use std::fmt;
use std::str::FromStr;

use lockwise_util::errors::LockwiseError;

use crate::dependency::Dependency;
use crate::manifest::Manifest;

/// Opaque, totally ordered identity of a source: `kind+location`.
///
/// The kind names the backend (`index`, `path`, ...) and must not contain
/// `+`; the location is backend-defined.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId {
    kind: String,
    location: String,
}

impl SourceId {
    pub fn new(kind: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            location: location.into(),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn location(&self) -> &str {
        &self.location
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.kind, self.location)
    }
}

impl FromStr for SourceId {
    type Err = LockwiseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('+') {
            Some((kind, location)) if !kind.is_empty() => Ok(Self::new(kind, location)),
            _ => Err(LockwiseError::Lockfile {
                message: format!("`{s}` is not a source id (expected `kind+location`)"),
            }),
        }
    }
}

/// A pluggable provider of candidate manifests.
///
/// Calls are synchronous from the resolver's point of view; an implementation
/// may block on I/O internally.
pub trait Source: Send + Sync {
    fn id(&self) -> &SourceId;

    /// Manifests that may satisfy `dependency`, best candidate first.
    fn candidates(&self, dependency: &Dependency) -> Result<Vec<Manifest>, LockwiseError>;

    /// Fetch and store everything needed to install `manifests`.
    fn cache(&self, manifests: &[Manifest]) -> Result<(), LockwiseError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_parse() {
        let id = SourceId::new("index", "vendor/index.toml");
        assert_eq!(id.to_string(), "index+vendor/index.toml");
        let parsed: SourceId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn location_may_contain_plus() {
        let parsed: SourceId = "path+a+b".parse().unwrap();
        assert_eq!(parsed.kind(), "path");
        assert_eq!(parsed.location(), "a+b");
    }

    #[test]
    fn parse_rejects_missing_kind() {
        assert!("no-separator".parse::<SourceId>().is_err());
        assert!("+location".parse::<SourceId>().is_err());
    }

    #[test]
    fn ordering_is_kind_then_location() {
        let a = SourceId::new("index", "b");
        let b = SourceId::new("path", "a");
        assert!(a < b);
    }
}
