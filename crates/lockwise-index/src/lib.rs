//! Index source backend: reads a TOML package index, answers candidate
//! queries newest-first, and stores cached manifests in a local directory.

pub mod cache;
pub mod index;
