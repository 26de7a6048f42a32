//! Command dispatch and handler modules.

mod fetch;
mod lock;
mod tree;
mod update;

use miette::Result;

use lockwise_core::config::{Context, GlobalConfig};
use lockwise_util::errors::LockwiseError;

use crate::cli::{Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    let ctx = context()?;
    tracing::debug!(root = %ctx.project_root.display(), "project found");
    match cli.command {
        Command::Lock => lock::exec(&ctx),
        Command::Update { names } => update::exec(&ctx, &names),
        Command::Fetch => fetch::exec(&ctx),
        Command::Tree { depth, invert, why } => tree::exec(&ctx, depth, invert, why),
    }
}

/// Locate the project around the current directory.
fn context() -> Result<Context> {
    let cwd = std::env::current_dir().map_err(LockwiseError::Io)?;
    let config = GlobalConfig::load()?;
    Context::discover(&cwd, &config)
}
