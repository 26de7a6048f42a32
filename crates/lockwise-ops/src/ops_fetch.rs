//! Operation: hand every locked manifest to its source for caching.

use std::collections::HashSet;

use lockwise_core::config::Context;
use lockwise_core::lockfile::TomlLockCodec;
use lockwise_core::manifest::Manifest;
use lockwise_index::cache::LocalCache;
use lockwise_resolver::{manifest_set, SpecChangeSet};
use lockwise_util::errors::LockwiseError;
use lockwise_util::progress::{spinner, status};

use crate::{lockfile_io, spec_file};

/// What [`fetch`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchSummary {
    /// Sources whose `cache` was called.
    pub sources: usize,
    pub manifests: usize,
    /// Stale cache entries removed.
    pub pruned: u32,
}

/// Cache the locked manifests.
///
/// Each source is called once with all of its manifests, dependencies
/// before dependents. The lock must match the specification. Entries for
/// packages no longer locked are pruned from a cache inside the project.
pub fn fetch(ctx: &Context) -> miette::Result<FetchSummary> {
    let spec = spec_file::load_specification(ctx)?;
    let lock = lockfile_io::require_lock(&TomlLockCodec, &ctx.lock_path)?;
    if !SpecChangeSet::new(&spec, &lock).same() {
        return Err(LockwiseError::DivergedSpec {
            message: "Lockwise.lock is out of date with Lockwise.toml".to_string(),
        }
        .into());
    }

    let ordered = manifest_set::sort(lock.manifests())?;
    let mut summary = FetchSummary::default();

    let sp = spinner("Fetching manifests...");
    for id in lock.sources() {
        let manifests: Vec<Manifest> = ordered.iter().filter(|m| &m.source == id).cloned().collect();
        if manifests.is_empty() {
            continue;
        }
        let source = spec.source(id).ok_or_else(|| LockwiseError::SourceUnavailable {
            source_id: id.to_string(),
            message: "not declared in Lockwise.toml".to_string(),
        })?;
        sp.set_message(format!("Fetching {} manifests from {id}...", manifests.len()));
        source.cache(&manifests)?;
        summary.sources += 1;
        summary.manifests += manifests.len();
    }
    sp.finish_and_clear();

    if ctx.cache_dir.starts_with(&ctx.project_root) {
        let keep: HashSet<(String, String)> = lock
            .manifests()
            .iter()
            .map(|m| (m.name.clone(), m.version.to_string()))
            .collect();
        summary.pruned = LocalCache::new(&ctx.cache_dir).prune(&keep);
    }

    tracing::info!(
        sources = summary.sources,
        manifests = summary.manifests,
        pruned = summary.pruned,
        "fetched"
    );
    status(
        "Fetched",
        &format!(
            "{} packages from {} sources, {} pruned",
            summary.manifests, summary.sources, summary.pruned
        ),
    );
    Ok(summary)
}
