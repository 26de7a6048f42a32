//! Core data types for lockwise.
//!
//! This crate defines the values the resolver works on: versions and
//! requirements, dependencies, manifests, the [`source::Source`] capability,
//! the typed specification, resolutions with their conflict trace, the
//! lockfile codec, and configuration.
//!
//! This crate is intentionally free of search logic and of any source
//! transport.

pub mod config;
pub mod conflict;
pub mod dependency;
pub mod lockfile;
pub mod manifest;
pub mod resolution;
pub mod source;
pub mod spec;
pub mod version;
