//! Reading and writing `Lockwise.lock`.

use std::path::Path;

use lockwise_core::lockfile::{bounce, LockCodec};
use lockwise_core::resolution::Resolution;
use lockwise_util::errors::LockwiseError;

/// Parse the lockfile at `path`, or `None` if there is none.
pub fn read_lock(codec: &dyn LockCodec, path: &Path) -> miette::Result<Option<Resolution>> {
    if !path.is_file() {
        return Ok(None);
    }
    let text = std::fs::read_to_string(path).map_err(|e| LockwiseError::Lockfile {
        message: format!("Failed to read {}: {e}", path.display()),
    })?;
    Ok(Some(codec.parse(&text)?))
}

/// Like [`read_lock`], failing with `MissingLock` when the file is absent.
pub fn require_lock(codec: &dyn LockCodec, path: &Path) -> miette::Result<Resolution> {
    read_lock(codec, path)?.ok_or_else(|| {
        LockwiseError::MissingLock {
            path: path.to_path_buf(),
        }
        .into()
    })
}

/// Encode `resolution`, verify the encoding survives a round trip, and
/// replace the file at `path` with it.
///
/// Nothing is written when the round trip fails or when the file already
/// holds the same text. Returns whether the file was written.
pub fn write_lock(codec: &dyn LockCodec, path: &Path, resolution: &Resolution) -> miette::Result<bool> {
    let text = bounce(codec, resolution)?;
    if std::fs::read_to_string(path).is_ok_and(|existing| existing == text) {
        tracing::debug!(path = %path.display(), "lockfile already up to date");
        return Ok(false);
    }
    lockwise_util::fs::write_atomic(path, text.as_bytes()).map_err(LockwiseError::from)?;
    tracing::info!(
        path = %path.display(),
        manifests = resolution.manifests().len(),
        "wrote lockfile"
    );
    Ok(true)
}
