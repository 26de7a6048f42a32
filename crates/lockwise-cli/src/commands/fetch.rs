//! Handler for `lockwise fetch`.

use miette::Result;

use lockwise_core::config::Context;

pub fn exec(ctx: &Context) -> Result<()> {
    lockwise_ops::ops_fetch::fetch(ctx)?;
    Ok(())
}
