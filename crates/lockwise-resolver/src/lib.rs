//! Dependency resolution engine: backtracking search over source candidates,
//! manifest-set algebra and specification/lock change analysis.

pub mod cache;
pub mod change_set;
pub mod graph;
pub mod manifest_set;
pub mod resolver;

pub use change_set::{Change, SpecChangeSet};
pub use resolver::{resolve, Resolver};
