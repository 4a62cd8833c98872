//! Helper library for the bootcfg CLI.
//!
//! The CLI is a thin wrapper around `bootcfg-core`: it loads a
//! configuration-tree dump, runs the resolver, and writes generated C/CMake
//! artifacts. Everything here is file/format glue; the substantive logic
//! lives in the core crate.

pub mod render;

use std::path::Path;

use anyhow::{Context, Result};
use bootcfg_core::tree::ConfigTree;

/// Load a configuration-tree dump, choosing the parser by file extension
/// (`.json` parses as JSON, anything else as YAML).
pub fn load_tree(path: &Path) -> Result<ConfigTree> {
    ConfigTree::load(path)
        .with_context(|| format!("Failed to load configuration tree from {}", path.display()))
}
