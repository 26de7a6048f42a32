use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all lockwise operations.
#[derive(Debug, Error, Diagnostic)]
pub enum LockwiseError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or malformed specification (e.g. Lockwise.toml).
    #[error("Specification error: {message}")]
    #[diagnostic(help("Check your Lockwise.toml for syntax errors"))]
    Spec { message: String },

    /// A version or requirement string could not be parsed.
    #[error("Invalid version: {message}")]
    Version { message: String },

    /// The lockfile could not be read or encoded.
    #[error("Lockfile error: {message}")]
    #[diagnostic(help("Delete Lockwise.lock and run `lockwise lock` to regenerate it"))]
    Lockfile { message: String },

    /// The search exhausted every choice point without finding a resolution.
    #[error("Dependency resolution failed: {message}")]
    Unresolvable { message: String },

    /// A targeted update was requested but the specification changed.
    #[error("Cannot update: {message}")]
    #[diagnostic(help("Run `lockwise lock` first to bring the lockfile in line with Lockwise.toml"))]
    DivergedSpec { message: String },

    /// An operation needed a lockfile that does not exist.
    #[error("No lockfile found at {}", path.display())]
    #[diagnostic(help("Run `lockwise lock` to create one"))]
    MissingLock { path: PathBuf },

    /// serialize -> parse -> serialize did not reproduce the same text.
    #[error("Lockfile round-trip mismatch: the codec produced different output on re-encoding")]
    #[diagnostic(help("This is a bug in the lockfile codec; the existing lockfile was left untouched"))]
    RoundTripInconsistency { first: String, second: String },

    /// A source could not produce candidates or cache manifests.
    #[error("Source {source_id} unavailable: {message}")]
    SourceUnavailable { source_id: String, message: String },

    /// A dependency cycle whose members do not satisfy each other.
    #[error("Inconsistent dependency cycle between: {}", names.join(", "))]
    Cycle { names: Vec<String> },

    /// An update named a package that is not in the lockfile.
    #[error("Package `{name}` is not in the lockfile")]
    UnknownDependency { name: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}
