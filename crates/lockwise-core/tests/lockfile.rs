use lockwise_core::dependency::Dependency;
use lockwise_core::lockfile::{bounce, LockCodec, TomlLockCodec};
use lockwise_core::manifest::Manifest;
use lockwise_core::resolution::Resolution;
use lockwise_core::source::SourceId;
use lockwise_core::version::{Requirement, Version};
use lockwise_util::errors::LockwiseError;

fn src() -> SourceId {
    SourceId::new("index", "vendor/index.toml")
}

fn m(name: &str, version: &str, deps: &[(&str, &str)]) -> Manifest {
    deps.iter().fold(
        Manifest::new(name, Version::parse(version).unwrap(), src()),
        |acc, (n, r)| acc.with_dependency(Dependency::new(*n, Requirement::parse(r).unwrap(), src())),
    )
}

fn sample() -> Resolution {
    Resolution::resolved(
        vec![
            Dependency::new("a", Requirement::parse(">= 1.0").unwrap(), src()),
            Dependency::new("b", Requirement::any(), src()),
        ],
        vec![
            m("c", "2.0", &[]),
            m("a", "2.0", &[("c", ">= 1")]),
            m("b", "1.0", &[]),
        ],
    )
}

#[test]
fn round_trip_serialize_parse() {
    let text = TomlLockCodec.serialize(&sample()).unwrap();
    let parsed = TomlLockCodec.parse(&text).unwrap();

    assert!(parsed.correct());
    assert_eq!(parsed.manifests().len(), 3);
    assert_eq!(parsed.dependencies.len(), 2);
    let a = parsed.manifest("a").unwrap();
    assert_eq!(a.version, Version::parse("2.0").unwrap());
    assert_eq!(a.dependencies[0].to_string(), "c (>= 1)");
    assert_eq!(parsed.sources(), [src()]);
}

#[test]
fn serialization_is_independent_of_input_order() {
    let mut reversed = sample();
    reversed.dependencies.reverse();
    let shuffled = Resolution::resolved(
        reversed.dependencies.clone(),
        sample().manifests().iter().rev().cloned().collect(),
    );
    assert_eq!(
        TomlLockCodec.serialize(&sample()).unwrap(),
        TomlLockCodec.serialize(&shuffled).unwrap()
    );
}

#[test]
fn bounce_is_stable() {
    let first = bounce(&TomlLockCodec, &sample()).unwrap();
    let reparsed = TomlLockCodec.parse(&first).unwrap();
    assert_eq!(bounce(&TomlLockCodec, &reparsed).unwrap(), first);
}

#[test]
fn empty_resolution_round_trips() {
    let empty = Resolution::resolved(Vec::new(), Vec::new());
    let text = bounce(&TomlLockCodec, &empty).unwrap();
    let parsed = TomlLockCodec.parse(&text).unwrap();
    assert!(parsed.manifests().is_empty());
}

/// Emits packages in a different order on every call.
struct FlippingCodec {
    calls: std::cell::Cell<usize>,
}

impl LockCodec for FlippingCodec {
    fn serialize(&self, resolution: &Resolution) -> Result<String, LockwiseError> {
        let n = self.calls.get();
        self.calls.set(n + 1);
        let mut names: Vec<String> = resolution.manifests().iter().map(|m| m.key()).collect();
        if n % 2 == 1 {
            names.reverse();
        }
        Ok(names.join("\n"))
    }

    fn parse(&self, _text: &str) -> Result<Resolution, LockwiseError> {
        Ok(sample())
    }
}

#[test]
fn bounce_rejects_nondeterministic_codec() {
    let codec = FlippingCodec {
        calls: std::cell::Cell::new(0),
    };
    let err = bounce(&codec, &sample()).unwrap_err();
    match err {
        LockwiseError::RoundTripInconsistency { first, second } => assert_ne!(first, second),
        other => panic!("unexpected error: {other}"),
    }
}
