//! Boot-configuration value types.
//!
//! These are immutable value objects built once per resolution run from the
//! input tree:
//! - `AddressRange`: (start, size) extraction over a node.
//! - `PartitionEntry`: one partition slot with its derived vendor/class ids.
//! - `ImageConfig`: one image node's ordered partition entries.
//! - `BootloaderConfig`: the images declared under one bootloader node.
//! - `BootConfiguration`: the resolver's output.

use serde::Serialize;

use crate::ident::{BootUuid, Namespace, UuidError};
use crate::tree::{ConfigNode, ConfigTree, NodeId, PropValue};

/// A (start, size) address range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AddressRange {
    pub start: u64,
    pub size: u64,
}

impl AddressRange {
    pub fn new(start: u64, size: u64) -> Self {
        Self { start, size }
    }

    /// Containment test: `other` must fit entirely inside this range.
    /// Not an equality test; the active region may be a sub-range of a
    /// declared partition.
    ///
    /// Phrased as subtractions so ranges reaching the top of the address
    /// space cannot overflow an end-address computation.
    pub fn contains(&self, other: &AddressRange) -> bool {
        other.start >= self.start
            && other.size <= self.size.saturating_sub(other.start - self.start)
    }
}

/// Extract the address range of a node.
///
/// `None` and absent address/size fields degrade to `0` rather than failing:
/// abstract grouping nodes legitimately omit address information, and callers
/// must still be able to compare ranges without special-casing absence.
pub fn addr_range(node: Option<&ConfigNode>) -> AddressRange {
    let Some(node) = node else {
        return AddressRange::new(0, 0);
    };
    AddressRange {
        start: node.address.unwrap_or(0),
        size: node.regs.first().map(|r| r.size).unwrap_or(0),
    }
}

/// One partition slot inside an image or bootloader node.
#[derive(Debug, Clone, Serialize)]
pub struct PartitionEntry {
    /// Vendor identifier, derived under the DNS namespace.
    pub vid: Option<BootUuid>,
    /// Class identifier, derived under the vendor identifier's namespace.
    pub cid: Option<BootUuid>,
    /// The partition's address range.
    pub range: AddressRange,
    /// Path segments of the backing flash controller, normalized for use as
    /// identifier fragments downstream.
    pub device_path: Vec<String>,
    /// Primary label (if any) followed by label aliases.
    pub labels: Vec<String>,
}

/// One image node: ordered partition entries, position index, and (when this
/// is the active image) the identifiers of the active partition.
#[derive(Debug, Clone, Serialize)]
pub struct ImageConfig {
    pub name: String,
    pub index: Option<u64>,
    pub partitions: Vec<PartitionEntry>,
    pub active_vid: Option<BootUuid>,
    pub active_cid: Option<BootUuid>,
}

impl ImageConfig {
    /// Build an image config from a tree node.
    ///
    /// The node's `uuid-vid[]`, `uuid-cid[]`, and `partitions[]` properties
    /// are parallel lists; the identifier lists may each be shorter than the
    /// partition list, in which case the remaining entries carry no
    /// identifier. A class id derived from a bare string requires a vendor
    /// id as its namespace; a literal class id needs none.
    ///
    /// `active_index` designates which partition (if any) is the one
    /// currently running; its identifiers are mirrored into `active_vid` /
    /// `active_cid`.
    pub fn from_node(
        tree: &ConfigTree,
        id: NodeId,
        active_index: Option<usize>,
    ) -> Result<Self, UuidError> {
        let node = tree.node(id);

        let index = node.property("image-index").and_then(PropValue::as_int);
        let vids = node
            .property("uuid-vid")
            .and_then(PropValue::string_list)
            .unwrap_or_default();
        let cids = node
            .property("uuid-cid")
            .and_then(PropValue::string_list)
            .unwrap_or_default();
        let partition_ids = node
            .property("partitions")
            .and_then(PropValue::reference_list)
            .unwrap_or_default();

        let mut partitions = Vec::with_capacity(partition_ids.len());
        let mut active_vid = None;
        let mut active_cid = None;

        for (i, partition_id) in partition_ids.iter().enumerate() {
            let vid = match vids.get(i) {
                Some(value) => Some(BootUuid::derive(Some(Namespace::Dns), value)?),
                None => None,
            };
            let cid = match cids.get(i) {
                Some(value) => Some(BootUuid::derive(vid.as_ref().map(Namespace::Uuid), value)?),
                None => None,
            };

            let partition = tree.node(*partition_id);
            let range = addr_range(Some(partition));
            let device_path = partition
                .flash_controller
                .map(|controller| device_path_segments(&tree.node(controller).path))
                .unwrap_or_default();

            let mut labels = partition.labels.clone();
            if let Some(label) = &partition.label {
                labels.insert(0, label.clone());
            }

            if active_index == Some(i) {
                active_vid = vid.clone();
                active_cid = cid.clone();
            }

            partitions.push(PartitionEntry { vid, cid, range, device_path, labels });
        }

        Ok(Self { name: node.name.clone(), index, partitions, active_vid, active_cid })
    }
}

/// Normalize a node path into segments safe to embed in generated source:
/// `@` and `-` become `_`, and the leading empty segment is dropped.
fn device_path_segments(path: &str) -> Vec<String> {
    path.replace(['@', '-'], "_")
        .split('/')
        .skip(1)
        .map(str::to_string)
        .collect()
}

/// The set of images declared under one bootloader node, in ascending order
/// of image index (stable among ties).
#[derive(Debug, Clone, Serialize)]
pub struct BootloaderConfig {
    pub images: Vec<ImageConfig>,
}

impl BootloaderConfig {
    /// Build a bootloader config from a tree node.
    ///
    /// A node without an `images` child group yields an empty config, not an
    /// error. Images are built with no active partition; only the resolver,
    /// from the outside, knows which image is active.
    pub fn from_node(tree: &ConfigTree, id: NodeId) -> Result<Self, UuidError> {
        let mut images = Vec::new();

        if let Some(group) = tree.node(id).child("images") {
            for (_, image_id) in &tree.node(group).children {
                images.push(ImageConfig::from_node(tree, *image_id, None)?);
            }
            // Stable sort: equal indexes keep declaration order.
            images.sort_by_key(|image| image.index);
        }

        Ok(Self { images })
    }

    /// Look up an image by name.
    pub fn image(&self, name: &str) -> Option<&ImageConfig> {
        self.images.iter().find(|image| image.name == name)
    }
}

/// Resolver output: the active bootloader and the currently-executing image.
///
/// Either, both, or neither may be set; an image without a bootloader is
/// impossible since the bootloader is discovered alongside its active image.
#[derive(Debug, Clone, Serialize)]
pub struct BootConfiguration {
    pub bootloader: Option<BootloaderConfig>,
    pub image: Option<ImageConfig>,
}
