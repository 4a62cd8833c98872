//! Raw serde document format for configuration-tree dumps.
//!
//! The on-disk shape is a small, explicit adapter format rather than any
//! particular hardware-description source:
//!
//! ```yaml
//! chosen:
//!   zephyr,code-partition: /soc/flash@0/partitions/partition@8000
//! root:
//!   name: /
//!   children:
//!     - name: soc
//!       children: [...]
//! ```
//!
//! Children are an ordered array (each node carries its own `name`) so that
//! document order survives deserialization. Reference properties are written
//! as `{"ref": "/path"}` objects, or arrays of them, and are resolved to node
//! ids in a second pass after the whole tree has been assigned ids.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::{ConfigNode, ConfigTree, NodeId, PropValue, RegBlock, TreeError, TreeResult};

#[derive(Debug, Deserialize)]
pub(crate) struct RawDocument {
    #[serde(default)]
    chosen: BTreeMap<String, String>,
    root: RawNode,
}

#[derive(Debug, Deserialize)]
struct RawNode {
    name: String,
    #[serde(default)]
    address: Option<u64>,
    #[serde(default)]
    regs: Vec<RawReg>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    compatible: Vec<String>,
    #[serde(default, rename = "flash-controller")]
    flash_controller: Option<String>,
    #[serde(default)]
    properties: BTreeMap<String, RawValue>,
    #[serde(default)]
    children: Vec<RawNode>,
}

#[derive(Debug, Deserialize)]
struct RawReg {
    addr: u64,
    size: u64,
}

/// Untagged property value. Variant order matters: scalars before maps,
/// string arrays before reference arrays.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawValue {
    Int(u64),
    Str(String),
    Strs(Vec<String>),
    Ref(RawRef),
    Refs(Vec<RawRef>),
}

#[derive(Debug, Deserialize)]
struct RawRef {
    #[serde(rename = "ref")]
    target: String,
}

/// Per-node data that cannot be filled in until every node has an id.
struct Pending {
    id: NodeId,
    properties: BTreeMap<String, RawValue>,
    flash_controller: Option<String>,
}

/// Build a [`ConfigTree`] from a raw document: assign ids depth-first, then
/// resolve reference properties, flash controllers, and chosen entries.
pub(crate) fn build(doc: RawDocument) -> TreeResult<ConfigTree> {
    let mut nodes = Vec::new();
    let mut paths = BTreeMap::new();
    let mut pending = Vec::new();

    flatten(doc.root, None, &mut nodes, &mut paths, &mut pending);

    for entry in pending {
        if let Some(target) = entry.flash_controller {
            nodes[entry.id.0].flash_controller = Some(lookup(&paths, &target)?);
        }
        let mut properties = BTreeMap::new();
        for (name, value) in entry.properties {
            properties.insert(name, convert(value, &paths)?);
        }
        nodes[entry.id.0].properties = properties;
    }

    let mut chosen = BTreeMap::new();
    for (name, target) in doc.chosen {
        chosen.insert(name, lookup(&paths, &target)?);
    }

    Ok(ConfigTree::new(nodes, chosen))
}

fn flatten(
    raw: RawNode,
    parent_path: Option<&str>,
    nodes: &mut Vec<ConfigNode>,
    paths: &mut BTreeMap<String, NodeId>,
    pending: &mut Vec<Pending>,
) -> NodeId {
    let path = match parent_path {
        None => "/".to_string(),
        Some("/") => format!("/{}", raw.name),
        Some(parent) => format!("{}/{}", parent, raw.name),
    };

    let id = NodeId(nodes.len());
    nodes.push(ConfigNode {
        name: raw.name,
        path: path.clone(),
        address: raw.address,
        regs: raw.regs.iter().map(|r| RegBlock { addr: r.addr, size: r.size }).collect(),
        label: raw.label,
        labels: raw.labels,
        compatible: raw.compatible,
        flash_controller: None,
        properties: BTreeMap::new(),
        children: Vec::new(),
    });
    paths.insert(path.clone(), id);
    pending.push(Pending { id, properties: raw.properties, flash_controller: raw.flash_controller });

    let mut children = Vec::new();
    for child in raw.children {
        let name = child.name.clone();
        let child_id = flatten(child, Some(&path), nodes, paths, pending);
        children.push((name, child_id));
    }
    nodes[id.0].children = children;

    id
}

fn convert(value: RawValue, paths: &BTreeMap<String, NodeId>) -> TreeResult<PropValue> {
    Ok(match value {
        RawValue::Int(v) => PropValue::Int(v),
        RawValue::Str(s) => PropValue::Str(s),
        RawValue::Strs(v) => PropValue::Strs(v),
        RawValue::Ref(r) => PropValue::Ref(lookup(paths, &r.target)?),
        RawValue::Refs(refs) => {
            let mut ids = Vec::with_capacity(refs.len());
            for r in refs {
                ids.push(lookup(paths, &r.target)?);
            }
            PropValue::Refs(ids)
        }
    })
}

fn lookup(paths: &BTreeMap<String, NodeId>, target: &str) -> TreeResult<NodeId> {
    paths.get(target).copied().ok_or_else(|| TreeError::UnknownPath(target.to_string()))
}
