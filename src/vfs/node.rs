use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Children of a directory, keyed by name. Ordered for deterministic listing.
pub type Children = BTreeMap<String, Node>;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NodeType {
    File,
    Directory,
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeType::File => f.write_str("file"),
            NodeType::Directory => f.write_str("directory"),
        }
    }
}

/// A node of the namespace tree.
///
/// Serialized untagged: a file is a plain string and a directory is a map,
/// so an empty file (`""`) and an empty directory (`{}`) never collide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    File(String),
    Directory(Children),
}

impl Node {
    pub fn empty_dir() -> Node {
        Node::Directory(Children::new())
    }

    pub fn file(content: impl Into<String>) -> Node {
        Node::File(content.into())
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            Node::File(_) => NodeType::File,
            Node::Directory(_) => NodeType::Directory,
        }
    }

    pub fn is_file(&self) -> bool {
        self.node_type() == NodeType::File
    }

    pub fn is_dir(&self) -> bool {
        self.node_type() == NodeType::Directory
    }
}
