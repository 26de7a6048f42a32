use std::path::PathBuf;

use lockwise_util::errors::LockwiseError;

#[test]
fn test_io_error_display() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
    let err = LockwiseError::from(io_err);
    assert!(err.to_string().contains("I/O error"), "got: {err}");
}

#[test]
fn test_spec_error_display() {
    let err = LockwiseError::Spec {
        message: "bad syntax".to_string(),
    };
    assert_eq!(err.to_string(), "Specification error: bad syntax");
}

#[test]
fn test_unresolvable_error_display() {
    let err = LockwiseError::Unresolvable {
        message: "conflict".to_string(),
    };
    assert_eq!(err.to_string(), "Dependency resolution failed: conflict");
}

#[test]
fn test_missing_lock_display_includes_path() {
    let err = LockwiseError::MissingLock {
        path: PathBuf::from("/tmp/project/Lockwise.lock"),
    };
    assert_eq!(
        err.to_string(),
        "No lockfile found at /tmp/project/Lockwise.lock"
    );
}

#[test]
fn test_source_unavailable_display() {
    let err = LockwiseError::SourceUnavailable {
        source_id: "index+vendor/index.toml".to_string(),
        message: "file not found".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Source index+vendor/index.toml unavailable: file not found"
    );
}

#[test]
fn test_cycle_display_lists_names() {
    let err = LockwiseError::Cycle {
        names: vec!["a".to_string(), "b".to_string()],
    };
    assert_eq!(err.to_string(), "Inconsistent dependency cycle between: a, b");
}

#[test]
fn test_generic_error_display() {
    let err = LockwiseError::Generic {
        message: "something broke".to_string(),
    };
    assert_eq!(err.to_string(), "something broke");
}

#[test]
fn test_io_error_from_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let lockwise_err: LockwiseError = io_err.into();
    assert!(matches!(lockwise_err, LockwiseError::Io(_)));
}
