use std::path::Path;

use lockwise_core::config::{dirs_path, CandidatePolicy, Context, GlobalConfig, SPEC_FILE_NAME};
use tempfile::TempDir;

#[test]
fn test_global_config_defaults() {
    let config = GlobalConfig::default();
    assert_eq!(config.resolve.policy, CandidatePolicy::SourceOrder);
    assert_eq!(config.cache.dir, ".lockwise/cache");
}

#[test]
fn test_global_config_from_empty_toml() {
    let config: GlobalConfig = toml::from_str("").unwrap();
    assert_eq!(config.resolve.policy, CandidatePolicy::SourceOrder);
    assert_eq!(config.cache.dir, ".lockwise/cache");
}

#[test]
fn test_global_config_parse_from_toml() {
    let toml = r#"
[resolve]
policy = "oldest"

[cache]
dir = "/custom/cache"
"#;
    let config: GlobalConfig = toml::from_str(toml).unwrap();
    assert_eq!(config.resolve.policy, CandidatePolicy::Oldest);
    assert_eq!(config.cache.dir, "/custom/cache");
}

#[test]
fn test_global_config_load_missing_file_is_default() {
    let tmp = TempDir::new().unwrap();
    let config = GlobalConfig::load_from(&tmp.path().join("config.toml")).unwrap();
    assert_eq!(config.resolve.policy, CandidatePolicy::SourceOrder);
}

#[test]
fn test_global_config_load_invalid_file_errors() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("config.toml");
    std::fs::write(&path, "[resolve]\npolicy = \"sideways\"\n").unwrap();
    assert!(GlobalConfig::load_from(&path).is_err());
}

#[test]
fn test_dirs_path_contains_lockwise() {
    assert!(dirs_path().ends_with(".lockwise"));
}

#[test]
fn test_context_paths() {
    let ctx = Context::new(Path::new("/work/app"));
    assert_eq!(ctx.spec_path, Path::new("/work/app/Lockwise.toml"));
    assert_eq!(ctx.lock_path, Path::new("/work/app/Lockwise.lock"));
    assert_eq!(ctx.cache_dir, Path::new("/work/app/.lockwise/cache"));
}

#[test]
fn test_context_discover_walks_up() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join(SPEC_FILE_NAME), "").unwrap();
    let nested = tmp.path().join("src").join("deep");
    std::fs::create_dir_all(&nested).unwrap();
    let ctx = Context::discover(&nested, &GlobalConfig::default()).unwrap();
    assert_eq!(ctx.project_root, tmp.path());
}

#[test]
fn test_context_discover_without_spec_errors() {
    let tmp = TempDir::new().unwrap();
    assert!(Context::discover(tmp.path(), &GlobalConfig::default()).is_err());
}
