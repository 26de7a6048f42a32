//! Operation: resolve the specification and write Lockwise.lock.

use lockwise_core::config::Context;
use lockwise_core::lockfile::TomlLockCodec;
use lockwise_resolver::SpecChangeSet;
use lockwise_util::progress::{status, status_info};

use crate::{lockfile_io, resolve_spec, spec_file};

/// What [`lock`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockOutcome {
    /// The lock already matched the specification; nothing was resolved.
    Unchanged,
    Written { manifests: usize },
}

/// Bring `Lockwise.lock` in line with `Lockwise.toml`.
///
/// With an up-to-date lock this is a no-op. Otherwise the locked manifests
/// of unchanged dependencies are kept where possible and the rest is
/// resolved again.
pub fn lock(ctx: &Context) -> miette::Result<LockOutcome> {
    let spec = spec_file::load_specification(ctx)?;
    let previous = lockfile_io::read_lock(&TomlLockCodec, &ctx.lock_path)?;

    let partial = match &previous {
        Some(lock) => {
            let changes = SpecChangeSet::new(&spec, lock);
            if changes.same() {
                status_info("Fresh", "Lockwise.lock is up to date");
                return Ok(LockOutcome::Unchanged);
            }
            changes.analyze()
        }
        None => Vec::new(),
    };

    let resolution = resolve_spec(ctx, &spec, &partial)?;
    lockfile_io::write_lock(&TomlLockCodec, &ctx.lock_path, &resolution)?;

    let manifests = resolution.manifests().len();
    status("Locked", &format!("{manifests} packages"));
    Ok(LockOutcome::Written { manifests })
}
