//! High-level operations wiring CLI commands to the resolver: lock, update,
//! fetch and tree.

pub mod lockfile_io;
pub mod ops_fetch;
pub mod ops_lock;
pub mod ops_tree;
pub mod ops_update;
pub mod spec_file;

use lockwise_core::config::Context;
use lockwise_core::manifest::Manifest;
use lockwise_core::resolution::Resolution;
use lockwise_core::spec::Specification;
use lockwise_resolver::Resolver;
use lockwise_util::errors::LockwiseError;

/// Resolve `spec` with the context's candidate policy.
///
/// An exhausted search becomes an `Unresolvable` error carrying the conflict
/// trace, so callers never write a failed resolution.
pub(crate) fn resolve_spec(
    ctx: &Context,
    spec: &Specification,
    partial: &[Manifest],
) -> miette::Result<Resolution> {
    let sp = lockwise_util::progress::spinner("Resolving dependencies...");
    let resolution = Resolver::new(spec).with_policy(ctx.policy).resolve(partial);
    sp.finish_and_clear();

    match resolution.conflicts() {
        None => Ok(resolution),
        Some(report) => Err(LockwiseError::Unresolvable {
            message: report.to_string().trim_end().to_string(),
        }
        .into()),
    }
}
