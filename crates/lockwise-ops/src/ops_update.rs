//! Operation: re-resolve selected packages against an existing lock.

use std::collections::BTreeMap;

use lockwise_core::config::Context;
use lockwise_core::lockfile::TomlLockCodec;
use lockwise_core::resolution::Resolution;
use lockwise_resolver::{manifest_set, SpecChangeSet};
use lockwise_util::errors::LockwiseError;
use lockwise_util::progress::{status, status_info};

use crate::{lockfile_io, resolve_spec, spec_file};

/// A package whose locked version moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionChange {
    pub name: String,
    /// `None` if the package is new to the lock.
    pub from: Option<String>,
    /// `None` if the package left the lock.
    pub to: Option<String>,
}

/// Update `names` (every package when empty) to the newest versions the
/// specification allows.
///
/// Requires a lock produced for the current specification: a changed
/// `Lockwise.toml` has to be locked first.
pub fn update(ctx: &Context, names: &[String]) -> miette::Result<Vec<VersionChange>> {
    let spec = spec_file::load_specification(ctx)?;
    let lock = lockfile_io::require_lock(&TomlLockCodec, &ctx.lock_path)?;

    let changes = SpecChangeSet::new(&spec, &lock);
    if !changes.same() {
        let mut differing: Vec<String> = changes
            .changes()
            .iter()
            .filter(|(_, c)| *c != lockwise_resolver::Change::Unchanged)
            .map(|(n, c)| format!("{n} ({c})"))
            .collect();
        differing.sort();
        return Err(LockwiseError::DivergedSpec {
            message: format!("Lockwise.toml changed since the last lock: {}", differing.join(", ")),
        }
        .into());
    }

    for name in names {
        if lock.manifest(name).is_none() {
            return Err(LockwiseError::UnknownDependency { name: name.clone() }.into());
        }
    }

    let partial = if names.is_empty() {
        Vec::new()
    } else {
        let roots: Vec<String> = lock.dependencies.iter().map(|d| d.name.clone()).collect();
        manifest_set::deep_strip_from(lock.manifests(), &roots, names)
    };
    tracing::debug!(kept = partial.len(), "updating");

    let resolution = resolve_spec(ctx, &spec, &partial)?;
    let moved = diff(&lock, &resolution);
    lockfile_io::write_lock(&TomlLockCodec, &ctx.lock_path, &resolution)?;

    if moved.is_empty() {
        status_info("Unchanged", "all packages already at their newest allowed versions");
    }
    for change in &moved {
        let line = match (&change.from, &change.to) {
            (Some(from), Some(to)) => format!("{} {from} -> {to}", change.name),
            (None, Some(to)) => format!("{} {to} (new)", change.name),
            (Some(from), None) => format!("{} {from} (removed)", change.name),
            (None, None) => continue,
        };
        status("Updating", &line);
    }
    Ok(moved)
}

/// Version changes between two resolutions, sorted by name.
pub fn diff(before: &Resolution, after: &Resolution) -> Vec<VersionChange> {
    let mut versions: BTreeMap<&str, (Option<String>, Option<String>)> = BTreeMap::new();
    for m in before.manifests() {
        versions.entry(m.name.as_str()).or_default().0 = Some(m.version.to_string());
    }
    for m in after.manifests() {
        versions.entry(m.name.as_str()).or_default().1 = Some(m.version.to_string());
    }
    versions
        .into_iter()
        .filter(|(_, (from, to))| from != to)
        .map(|(name, (from, to))| VersionChange {
            name: name.to_string(),
            from,
            to,
        })
        .collect()
}
