//! Operation: display the locked dependency tree.

use lockwise_core::config::Context;
use lockwise_core::lockfile::TomlLockCodec;
use lockwise_resolver::graph::ManifestGraph;
use lockwise_util::errors::LockwiseError;

use crate::lockfile_io;

/// Options for `lockwise tree`.
#[derive(Debug, Default)]
pub struct TreeOptions {
    /// Maximum tree depth to display.
    pub depth: Option<usize>,
    /// Show what depends on this package instead.
    pub invert: Option<String>,
    /// Show one path from a top-level dependency to this package.
    pub why: Option<String>,
}

/// Render the tree of `Lockwise.lock`, one top-level dependency per root.
pub fn tree(ctx: &Context, opts: &TreeOptions) -> miette::Result<String> {
    let lock = lockfile_io::require_lock(&TomlLockCodec, &ctx.lock_path)?;
    let graph = ManifestGraph::from_manifests(lock.manifests());
    let mut roots: Vec<_> = lock
        .dependencies
        .iter()
        .filter_map(|d| graph.find(&d.name))
        .collect();
    roots.sort_by_key(|&idx| graph.node(idx).name.clone());

    if let Some(target) = &opts.why {
        let path = graph
            .find_path(&roots, target)
            .ok_or_else(|| LockwiseError::UnknownDependency {
                name: target.clone(),
            })?;
        let mut output = String::new();
        for (i, manifest) in path.iter().enumerate() {
            output.push_str(&format!("{}{manifest}\n", "  ".repeat(i)));
        }
        return Ok(output);
    }

    if let Some(target) = &opts.invert {
        if graph.find(target).is_none() {
            return Err(LockwiseError::UnknownDependency {
                name: target.clone(),
            }
            .into());
        }
        return Ok(graph.print_inverted_tree(target));
    }

    if graph.is_empty() {
        return Ok("No dependencies.\n".to_string());
    }
    Ok(graph.print_tree(&roots, opts.depth))
}
