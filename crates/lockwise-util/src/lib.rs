//! Shared utilities for lockwise.
//!
//! This crate provides cross-cutting concerns used by all other lockwise crates:
//! the unified error type, filesystem helpers (including atomic writes used for
//! the lockfile), and terminal status output.

pub mod errors;
pub mod fs;
pub mod progress;
