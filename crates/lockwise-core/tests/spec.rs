use std::sync::Arc;

use lockwise_core::dependency::Dependency;
use lockwise_core::manifest::Manifest;
use lockwise_core::source::{Source, SourceId};
use lockwise_core::spec::Specification;
use lockwise_core::version::Requirement;
use lockwise_util::errors::LockwiseError;

struct EmptySource(SourceId);

impl Source for EmptySource {
    fn id(&self) -> &SourceId {
        &self.0
    }

    fn candidates(&self, _dependency: &Dependency) -> Result<Vec<Manifest>, LockwiseError> {
        Ok(Vec::new())
    }

    fn cache(&self, _manifests: &[Manifest]) -> Result<(), LockwiseError> {
        Ok(())
    }
}

fn source() -> Arc<dyn Source> {
    Arc::new(EmptySource(SourceId::new("index", "main")))
}

fn dep(name: &str) -> Dependency {
    Dependency::new(name, Requirement::any(), SourceId::new("index", "main"))
}

#[test]
fn builder_keeps_declaration_order() {
    let spec = Specification::builder()
        .source(source())
        .dependency(dep("zeta"))
        .dependency(dep("alpha"))
        .build()
        .unwrap();
    let names: Vec<&str> = spec.dependencies().iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, ["zeta", "alpha"]);
    assert!(spec.dependency("alpha").is_some());
    assert!(spec.source(&SourceId::new("index", "main")).is_some());
}

#[test]
fn builder_rejects_duplicate_names() {
    let err = Specification::builder()
        .source(source())
        .dependency(dep("a"))
        .dependency(dep("a"))
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("declared more than once"));
}

#[test]
fn builder_rejects_unknown_source() {
    let err = Specification::builder()
        .dependency(dep("a"))
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("unknown source index+main"));
}
