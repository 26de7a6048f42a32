//! CLI argument definitions for lockwise.
//!
//! Each command corresponds to a handler in the [`super::commands`] module.

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "lockwise",
    version,
    about = "Resolve dependencies into a reproducible lockfile",
    long_about = "lockwise resolves the dependencies declared in Lockwise.toml against their \
                  sources and records the result in Lockwise.lock, re-resolving only what \
                  changed on later runs."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve Lockwise.toml and write Lockwise.lock
    Lock,

    /// Re-resolve packages to the newest versions Lockwise.toml allows
    Update {
        /// Packages to update; all packages when omitted
        names: Vec<String>,
    },

    /// Cache every locked manifest through its source
    Fetch,

    /// Print the locked dependency tree
    Tree {
        /// Maximum depth
        #[arg(long)]
        depth: Option<u32>,
        /// Show what depends on a package
        #[arg(long, value_name = "NAME")]
        invert: Option<String>,
        /// Explain why a package is locked
        #[arg(long, value_name = "NAME")]
        why: Option<String>,
    },
}

pub fn parse() -> Cli {
    Cli::parse()
}
