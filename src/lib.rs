//! An in-memory hierarchical namespace with Unix-like operations for Rust.
//! Emulates directories and text files entirely in memory. Ideal for teaching,
//! sandboxing, and tests that need a file tree without side effects.
//!
//! ### Overview
//!
//! `vfs-shell` keeps a single tree of directories and files plus a current working directory,
//! and exposes `mkdir`, `ls`, `cd`, `touch`, `echo`, `cat`, `rm`, `cp`, `mv` and `grep` through
//! the `FsBackend` trait. `TreeFS` is the in-memory implementation; `session` persists it as JSON
//! and `shell` drives it from text commands.
//!
//! **Key ideas**:
//! - **Tagged nodes**: a node is a directory or a file, never both; mismatches are errors.
//! - **Lexical paths**: `.`, `..` and `~` are resolved on the path string before any lookup.
//! - **Recursive copy**: a file and a whole subtree are copied by the same algorithm.
//! - **Clarity**: every error names the offending path and its kind.

mod core;
pub mod session;
pub mod shell;
mod vfs;

pub use crate::core::{ErrorKind, FsBackend, FsError, Result, VfsPath};
pub use session::Snapshot;
pub use shell::{Command, Shell};
pub use crate::vfs::{Children, Node, NodeType, TreeFS};
