//! Boot-configuration resolution.
//!
//! Given a configuration tree and the address range of the active code
//! region (the region the currently-running firmware occupies), determine
//! which candidate node is the active bootloader and which child image is
//! the currently-executing image.
//!
//! The computation is pure and synchronous: no I/O, no shared state, one
//! resolution run per call.

use thiserror::Error;

use crate::ident::UuidError;
use crate::model::{addr_range, AddressRange, BootConfiguration, BootloaderConfig, ImageConfig};
use crate::tree::{ConfigTree, NodeId};

/// Error type for resolution failures.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Identifier derivation failed while building the configuration.
    #[error(transparent)]
    Uuid(#[from] UuidError),

    /// More than one image's partitions contain the active code region.
    /// Always fatal; a running address range cannot belong to two images.
    #[error(
        "Multiple images match the active code region (0x{addr:X}, 0x{size:X}); \
         ensure only one image covers it"
    )]
    AmbiguousImage { addr: u64, size: u64 },
}

/// Find the index of the first partition of `node` whose range contains the
/// active region.
///
/// Returns `None` when the node declares no partitions or none contain the
/// region. A bare single reference is treated as a one-element list. Ties
/// (multiple containing entries) resolve to declaration order, first wins.
pub fn find_matching_partition(
    tree: &ConfigTree,
    node: NodeId,
    region: AddressRange,
) -> Option<usize> {
    let partitions = tree.node(node).property("partitions")?.reference_list()?;

    partitions
        .iter()
        .position(|id| addr_range(Some(tree.node(*id))).contains(&region))
}

/// Resolve the boot configuration for the given active code region.
///
/// Candidate nodes are those carrying `compatible`, visited in document
/// order. For each candidate:
/// 1. If the candidate's own partitions contain the region, the running
///    firmware is that bootloader itself. The candidate is adopted as the
///    bootloader (first adoption wins) and the scan continues: an outer
///    bootloader may still list this region as one of its images.
/// 2. Otherwise each child under the candidate's `images` group is tested
///    the same way. The first matching image becomes the active image (with
///    the matched position as its active partition); a second match anywhere
///    is a configuration-authoring error and fails resolution.
///
/// Absence of a bootloader or image is not an error here; callers decide
/// whether `None` is fatal for their use.
pub fn resolve(
    tree: &ConfigTree,
    active: AddressRange,
    compatible: &str,
) -> Result<BootConfiguration, ResolveError> {
    let mut bootloader = None;
    let mut image = None;

    for candidate in tree.compatible_nodes(compatible) {
        if find_matching_partition(tree, candidate, active).is_some() {
            if bootloader.is_none() {
                bootloader = Some(BootloaderConfig::from_node(tree, candidate)?);
            }
            continue;
        }

        let Some(group) = tree.node(candidate).child("images") else {
            continue;
        };
        for (_, image_node) in &tree.node(group).children {
            if let Some(matched) = find_matching_partition(tree, *image_node, active) {
                if image.is_some() {
                    return Err(ResolveError::AmbiguousImage {
                        addr: active.start,
                        size: active.size,
                    });
                }
                image = Some(ImageConfig::from_node(tree, *image_node, Some(matched))?);
                if bootloader.is_none() {
                    bootloader = Some(BootloaderConfig::from_node(tree, candidate)?);
                }
            }
        }
    }

    Ok(BootConfiguration { bootloader, image })
}
