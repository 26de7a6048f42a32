use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const SPEC: &str = r#"
[sources.main]
index = "index.toml"

[dependencies]
a = "*"
b = "*"
"#;

fn lockwise_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("lockwise").unwrap();
    cmd.current_dir(dir).env("HOME", dir).env_remove("RUST_LOG");
    cmd
}

fn index(versions: &[(&str, &str)]) -> String {
    versions
        .iter()
        .map(|(name, version)| format!("[[package]]\nname = \"{name}\"\nversion = \"{version}\"\n\n"))
        .collect()
}

fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("index.toml"), index(&[("a", "1.0"), ("b", "1.0")])).unwrap();
    fs::write(tmp.path().join("Lockwise.toml"), SPEC).unwrap();
    tmp
}

#[test]
fn update_without_lock_fails() {
    let tmp = project();
    lockwise_cmd(tmp.path())
        .arg("update")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No lockfile found"));
}

#[test]
fn update_of_unknown_package_fails() {
    let tmp = project();
    lockwise_cmd(tmp.path()).arg("lock").assert().success();
    lockwise_cmd(tmp.path())
        .args(["update", "zzz"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("zzz"));
}

#[test]
fn update_moves_only_named_package() {
    let tmp = project();
    lockwise_cmd(tmp.path()).arg("lock").assert().success();
    fs::write(
        tmp.path().join("index.toml"),
        index(&[("a", "1.0"), ("a", "1.1"), ("b", "1.0"), ("b", "1.1")]),
    )
    .unwrap();

    lockwise_cmd(tmp.path())
        .args(["update", "a"])
        .assert()
        .success()
        .stderr(predicate::str::contains("a 1.0 -> 1.1"))
        .stderr(predicate::str::contains("b 1.0").not());

    lockwise_cmd(tmp.path())
        .arg("tree")
        .assert()
        .success()
        .stdout("a (1.1)\nb (1.0)\n");
}
