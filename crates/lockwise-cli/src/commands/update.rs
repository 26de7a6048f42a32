//! Handler for `lockwise update`.

use miette::Result;

use lockwise_core::config::Context;
use lockwise_ops::ops_update;

pub fn exec(ctx: &Context, names: &[String]) -> Result<()> {
    ops_update::update(ctx, names)?;
    Ok(())
}
