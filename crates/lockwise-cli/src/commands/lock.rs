//! Handler for `lockwise lock`.

use miette::Result;

use lockwise_core::config::Context;
use lockwise_ops::ops_lock;

pub fn exec(ctx: &Context) -> Result<()> {
    ops_lock::lock(ctx)?;
    Ok(())
}
