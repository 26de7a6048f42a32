//! Handler for `lockwise tree`.

use miette::Result;

use lockwise_core::config::Context;
use lockwise_ops::ops_tree::{self, TreeOptions};

pub fn exec(ctx: &Context, depth: Option<u32>, invert: Option<String>, why: Option<String>) -> Result<()> {
    let opts = TreeOptions {
        depth: depth.map(|d| d as usize),
        invert,
        why,
    };
    print!("{}", ops_tree::tree(ctx, &opts)?);
    Ok(())
}
