mod node;
mod tree_fs;

pub use node::{Children, Node, NodeType};
pub use tree_fs::TreeFS;
