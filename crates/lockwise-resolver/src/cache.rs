//! Candidate lists memoised for the length of one resolve call.
//!
//! Backtracking revisits the same dependency many times; each source is asked
//! about a given (name, requirement) pair once.

use std::collections::HashMap;

use lockwise_core::dependency::Dependency;
use lockwise_core::manifest::Manifest;
use lockwise_core::source::SourceId;

#[derive(Debug, Default)]
pub struct CandidateCache {
    entries: HashMap<(SourceId, String, String), Vec<Manifest>>,
    hits: usize,
}

impl CandidateCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(dependency: &Dependency) -> (SourceId, String, String) {
        (
            dependency.source.clone(),
            dependency.name.clone(),
            dependency.requirement.to_string(),
        )
    }

    /// Return the cached list for `dependency`, filling it with `fetch` on a
    /// miss.
    pub fn get_or_insert_with<F>(&mut self, dependency: &Dependency, fetch: F) -> &[Manifest]
    where
        F: FnOnce() -> Vec<Manifest>,
    {
        let key = Self::key(dependency);
        if self.entries.contains_key(&key) {
            self.hits += 1;
        }
        self.entries.entry(key).or_insert_with(fetch)
    }

    pub fn contains(&self, dependency: &Dependency) -> bool {
        self.entries.contains_key(&Self::key(dependency))
    }

    /// Number of lookups answered without asking a source.
    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockwise_core::version::{Requirement, Version};

    fn dep(req: &str) -> Dependency {
        Dependency::new("a", Requirement::parse(req).unwrap(), SourceId::new("index", "x"))
    }

    #[test]
    fn fetches_once_per_requirement() {
        let mut cache = CandidateCache::new();
        let mut calls = 0;
        for _ in 0..3 {
            let found = cache.get_or_insert_with(&dep(">= 1"), || {
                calls += 1;
                vec![Manifest::new("a", Version::parse("1.0").unwrap(), SourceId::new("index", "x"))]
            });
            assert_eq!(found.len(), 1);
        }
        assert_eq!(calls, 1);
        assert_eq!(cache.hits(), 2);
        assert!(cache.contains(&dep(">=1")));
        assert!(!cache.contains(&dep("< 1")));
        assert_eq!(cache.len(), 1);
    }
}
