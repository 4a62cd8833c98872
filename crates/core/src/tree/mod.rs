//! Configuration tree model and loading.
//!
//! The resolver operates on an already-parsed tree of typed nodes. This
//! module defines:
//! - `ConfigTree`: an arena of nodes in document order, plus the chosen-node
//!   map used to locate the active code region.
//! - `ConfigNode`: the narrow read-only surface the resolver needs (name,
//!   unit address, register blocks, properties, children, labels, and the
//!   backing flash controller).
//! - `PropValue`: typed property values, with reference properties already
//!   resolved to node ids.
//!
//! Loading from a JSON/YAML dump lives in `source`; nothing in the rest of
//! the crate depends on where the tree came from.

mod source;

use std::collections::BTreeMap;
use std::path::Path;

use thiserror::Error;

/// Error type for tree loading and reference resolution.
#[derive(Debug, Error)]
pub enum TreeError {
    /// Failed to read the tree dump from disk.
    #[error("Failed to read tree file: {0}")]
    Io(#[from] std::io::Error),

    /// The tree dump is not valid JSON.
    #[error("Failed to parse tree JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The tree dump is not valid YAML.
    #[error("Failed to parse tree YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A reference property or chosen entry points at a path with no node.
    #[error("Reference to unknown node path: {0}")]
    UnknownPath(String),
}

/// Convenience result type for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;

/// Index of a node inside a [`ConfigTree`] arena.
///
/// Ids are assigned in depth-first document order, so comparing ids compares
/// tree order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// One register block of a node. The first block's size is the node's size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegBlock {
    pub addr: u64,
    pub size: u64,
}

/// A typed property value.
///
/// Reference properties are pre-resolved to node ids when the tree is built;
/// the resolver never sees raw paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropValue {
    Int(u64),
    Str(String),
    Strs(Vec<String>),
    Ref(NodeId),
    Refs(Vec<NodeId>),
}

impl PropValue {
    /// Integer value, if this property holds one.
    pub fn as_int(&self) -> Option<u64> {
        match self {
            PropValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// String values, normalizing a bare string to a one-element list.
    pub fn string_list(&self) -> Option<Vec<&str>> {
        match self {
            PropValue::Str(s) => Some(vec![s.as_str()]),
            PropValue::Strs(v) => Some(v.iter().map(String::as_str).collect()),
            _ => None,
        }
    }

    /// Referenced nodes, normalizing a bare reference to a one-element list.
    pub fn reference_list(&self) -> Option<Vec<NodeId>> {
        match self {
            PropValue::Ref(id) => Some(vec![*id]),
            PropValue::Refs(ids) => Some(ids.clone()),
            _ => None,
        }
    }
}

/// One node of the configuration tree.
#[derive(Debug, Clone)]
pub struct ConfigNode {
    /// Node name (the last path component; `/` for the root).
    pub name: String,
    /// Full slash-separated path from the root.
    pub path: String,
    /// Absolute unit address, if the node has one.
    pub address: Option<u64>,
    /// Register blocks; the first block's size is the node's size.
    pub regs: Vec<RegBlock>,
    /// Primary label, if any.
    pub label: Option<String>,
    /// Additional label aliases.
    pub labels: Vec<String>,
    /// Compatible strings used for candidate lookup.
    pub compatible: Vec<String>,
    /// Backing flash controller node, if any.
    pub flash_controller: Option<NodeId>,
    /// Named properties.
    pub properties: BTreeMap<String, PropValue>,
    /// Named children in declaration order.
    pub children: Vec<(String, NodeId)>,
}

impl ConfigNode {
    /// Look up a property by name.
    pub fn property(&self, name: &str) -> Option<&PropValue> {
        self.properties.get(name)
    }

    /// Look up a direct child by name.
    pub fn child(&self, name: &str) -> Option<NodeId> {
        self.children.iter().find(|(n, _)| n == name).map(|(_, id)| *id)
    }
}

/// An immutable configuration tree.
///
/// Nodes are stored in depth-first document order; the root is node 0.
#[derive(Debug, Clone)]
pub struct ConfigTree {
    nodes: Vec<ConfigNode>,
    chosen: BTreeMap<String, NodeId>,
}

impl ConfigTree {
    pub(crate) fn new(nodes: Vec<ConfigNode>, chosen: BTreeMap<String, NodeId>) -> Self {
        Self { nodes, chosen }
    }

    /// Access a node by id.
    pub fn node(&self, id: NodeId) -> &ConfigNode {
        &self.nodes[id.0]
    }

    /// The root node.
    pub fn root(&self) -> &ConfigNode {
        &self.nodes[0]
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the tree holds no nodes (never the case for a loaded tree).
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over all nodes in document order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &ConfigNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Look up a chosen entry by name (e.g., the active code region node).
    pub fn chosen(&self, name: &str) -> Option<NodeId> {
        self.chosen.get(name).copied()
    }

    /// All nodes carrying the given compatible string, in document order.
    pub fn compatible_nodes(&self, compatible: &str) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, node)| node.compatible.iter().any(|c| c == compatible))
            .map(|(id, _)| id)
            .collect()
    }

    /// Find a node by its full path.
    pub fn find_by_path(&self, path: &str) -> Option<NodeId> {
        self.iter().find(|(_, node)| node.path == path).map(|(id, _)| id)
    }

    /// Parse a tree from a JSON document string.
    pub fn from_json_str(input: &str) -> TreeResult<Self> {
        let doc: source::RawDocument = serde_json::from_str(input)?;
        source::build(doc)
    }

    /// Parse a tree from a YAML document string.
    pub fn from_yaml_str(input: &str) -> TreeResult<Self> {
        let doc: source::RawDocument = serde_yaml::from_str(input)?;
        source::build(doc)
    }

    /// Load a tree dump from disk, choosing the format by file extension
    /// (`.json` parses as JSON, anything else as YAML).
    pub fn load(path: &Path) -> TreeResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        if path.extension().and_then(|e| e.to_str()) == Some("json") {
            Self::from_json_str(&contents)
        } else {
            Self::from_yaml_str(&contents)
        }
    }
}
