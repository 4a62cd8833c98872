//! bootcfg-core
//!
//! Core library for resolving a hierarchical hardware-partition description
//! into a concrete boot configuration.
//!
//! This crate defines the configuration-tree model, stable identifier (UUID)
//! derivation, the boot-configuration value types, and the resolver that
//! determines which tree node is the active bootloader and which child node
//! is the currently-executing image.
//!
//! The goal is to keep all substantive logic here so it is fully testable and
//! reusable from multiple frontends. File emission, source rendering, and
//! argument handling live in the CLI crate.

pub mod ident;
pub mod model;
pub mod resolve;
pub mod tree;

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
