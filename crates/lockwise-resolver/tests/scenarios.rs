use std::sync::Arc;

use lockwise_core::dependency::Dependency;
use lockwise_core::manifest::Manifest;
use lockwise_core::resolution::Resolution;
use lockwise_core::source::SourceId;
use lockwise_core::spec::Specification;
use lockwise_core::version::{Requirement, Version};
use lockwise_index::index::IndexSource;
use lockwise_resolver::{resolve, SpecChangeSet};

fn src() -> SourceId {
    SourceId::new("index", "scenarios")
}

fn dep(name: &str, req: &str) -> Dependency {
    Dependency::new(name, Requirement::parse(req).unwrap(), src())
}

fn m(name: &str, version: &str, deps: &[(&str, &str)]) -> Manifest {
    deps.iter().fold(
        Manifest::new(name, Version::parse(version).unwrap(), src()),
        |acc, (n, r)| acc.with_dependency(dep(n, r)),
    )
}

fn index(a2_needs: &str) -> IndexSource {
    IndexSource::new(
        src(),
        vec![
            m("a", "1.0", &[]),
            m("a", "2.0", &[("c", a2_needs)]),
            m("b", "1.0", &[]),
            m("c", "1.0", &[]),
            m("c", "2.0", &[]),
            m("d", "1.0", &[("c", "< 2")]),
        ],
    )
}

fn spec(source: IndexSource, deps: &[(&str, &str)]) -> Specification {
    deps.iter()
        .fold(Specification::builder().source(Arc::new(source)), |b, (n, r)| {
            b.dependency(dep(n, r))
        })
        .build()
        .unwrap()
}

fn keys(resolution: &Resolution) -> Vec<String> {
    let mut keys: Vec<String> = resolution.manifests().iter().map(Manifest::key).collect();
    keys.sort();
    keys
}

#[test]
fn scenario_a_newest_compatible() {
    let spec = spec(index(">= 1"), &[("a", ">= 1.0"), ("b", "*")]);
    let resolution = resolve(&spec, &[]);
    assert!(resolution.correct());
    assert_eq!(keys(&resolution), ["a@2.0", "b@1.0", "c@2.0"]);
}

#[test]
fn scenario_a_output_is_dependency_ordered() {
    let spec = spec(index(">= 1"), &[("a", ">= 1.0"), ("b", "*")]);
    let resolution = resolve(&spec, &[]);
    let names: Vec<&str> = resolution.manifests().iter().map(|m| m.name.as_str()).collect();
    let a = names.iter().position(|n| *n == "a").unwrap();
    let c = names.iter().position(|n| *n == "c").unwrap();
    assert!(c < a);
}

#[test]
fn scenario_b_backtracks_to_older_c() {
    let spec = spec(index(">= 1"), &[("a", ">= 1.0"), ("b", "*"), ("d", "*")]);
    let resolution = resolve(&spec, &[]);
    assert!(resolution.correct());
    assert_eq!(keys(&resolution), ["a@2.0", "b@1.0", "c@1.0", "d@1.0"]);
}

#[test]
fn scenario_b_falls_back_to_older_a() {
    // a 2.0 insists on c >= 2, which d rules out; a 1.0 has no such need.
    let spec = spec(index(">= 2"), &[("a", ">= 1.0"), ("b", "*"), ("d", "*")]);
    let resolution = resolve(&spec, &[]);
    assert!(resolution.correct());
    assert_eq!(keys(&resolution), ["a@1.0", "b@1.0", "c@1.0", "d@1.0"]);
}

#[test]
fn scenario_b_unsatisfiable() {
    let spec = spec(index(">= 2"), &[("a", ">= 2.0"), ("b", "*"), ("d", "*")]);
    let resolution = resolve(&spec, &[]);
    assert!(!resolution.correct());
    assert!(resolution.manifests().is_empty());
    let report = resolution.conflicts().unwrap();
    assert!(!report.is_empty());
    assert!(report.to_string().contains("c (< 2)"));
}

#[test]
fn scenario_c_only_changed_dependency_is_searched() {
    let lock = Resolution::resolved(
        vec![dep("a", "*"), dep("b", "*")],
        vec![m("a", "1.0", &[]), m("b", "1.0", &[])],
    );
    let spec = spec(index(">= 1"), &[("a", "*"), ("b", ">= 1.0")]);

    let changes = SpecChangeSet::new(&spec, &lock);
    assert!(!changes.same());
    assert_eq!(changes.changed_names(), ["b"]);
    let partial = changes.analyze();
    assert_eq!(partial, [m("a", "1.0", &[])]);

    // `a 1.0` is kept although the index offers a newer version.
    let resolution = resolve(&spec, &partial);
    assert!(resolution.correct());
    assert_eq!(keys(&resolution), ["a@1.0", "b@1.0"]);
}

#[test]
fn missing_package_is_unresolvable() {
    let spec = spec(index(">= 1"), &[("zzz", "*")]);
    let resolution = resolve(&spec, &[]);
    assert!(!resolution.correct());
    assert!(resolution
        .conflicts()
        .unwrap()
        .to_string()
        .contains("zzz (*) required by the specification has no matching candidates"));
}

fn chain_index() -> IndexSource {
    IndexSource::new(
        src(),
        vec![
            m("a", "1.0", &[("c", "*")]),
            m("c", "1.0", &[("e", "*")]),
            m("c", "2.0", &[("e", "*")]),
            m("e", "1.0", &[]),
            m("e", "2.0", &[]),
        ],
    )
}

fn chain_lock(top: &[&str]) -> Resolution {
    Resolution::resolved(
        top.iter().map(|n| dep(n, "*")).collect(),
        vec![
            m("e", "1.0", &[]),
            m("c", "1.0", &[("e", "*")]),
            m("a", "1.0", &[("c", "*")]),
        ],
    )
}

#[test]
fn scenario_c_promoting_a_transitive_dependency_keeps_locked_versions() {
    let lock = chain_lock(&["a"]);
    let spec = spec(chain_index(), &[("a", "*"), ("c", "*")]);

    let changes = SpecChangeSet::new(&spec, &lock);
    assert_eq!(changes.added_names(), ["c"]);
    let resolution = resolve(&spec, &changes.analyze());
    assert!(resolution.correct());
    assert_eq!(keys(&resolution), ["a@1.0", "c@1.0", "e@1.0"]);
}

#[test]
fn scenario_c_dropping_a_still_needed_dependency_keeps_locked_versions() {
    let lock = chain_lock(&["a", "c"]);
    let spec = spec(chain_index(), &[("a", "*")]);

    let changes = SpecChangeSet::new(&spec, &lock);
    assert_eq!(changes.removed_names(), ["c"]);
    let resolution = resolve(&spec, &changes.analyze());
    assert!(resolution.correct());
    assert_eq!(keys(&resolution), ["a@1.0", "c@1.0", "e@1.0"]);
}

#[test]
fn scenario_c_tightened_transitive_dependency_moves_alone() {
    let lock = chain_lock(&["a", "c"]);
    let spec = spec(chain_index(), &[("a", "*"), ("c", ">= 2")]);

    let changes = SpecChangeSet::new(&spec, &lock);
    assert_eq!(changes.changed_names(), ["c"]);
    let resolution = resolve(&spec, &changes.analyze());
    assert!(resolution.correct());
    assert_eq!(keys(&resolution), ["a@1.0", "c@2.0", "e@1.0"]);
}
