//! This module provides the in-memory namespace engine: a tree of [`Node`]s rooted at `/`
//! plus a current working directory used to resolve relative paths.
//!
//! ### Key Features:
//! - **Tagged nodes**: every node is either a directory owning its children or a text file.
//! - **Path normalization**: `.`, `..`, `~` and redundant separators are resolved lexically,
//!   once per operation, before the tree is walked.
//! - **Recursive copy/move**: files and whole subtrees are copied with the same algorithm.
//! - **Content search**: regular expressions are applied to file content.

use std::collections::btree_map::Entry;

use regex::Regex;
use tracing::{debug, warn};

use super::node::{Children, Node};
use crate::core::{FsBackend, FsError, Result, VfsPath};

/// An in-memory virtual file system shaped as a tree.
///
/// `TreeFS` owns the root directory; each directory exclusively owns its children, so
/// every traversal starts at the root and walks one path segment per level.
///
/// ### Internal state
///
/// * `root` — the root directory node, reachable only through `/`.
/// * `cwd` — Current Working Directory, an absolute normalized path.
///   - Determines how relative paths (e.g., `docs/file.txt`) are resolved.
///   - Default value: `/`.
///   - Changed via `cd()`.
///   - If the directory it names is removed, the cwd becomes stale and every later
///     operation resolves relative paths against `/` instead.
///
/// ### Thread Safety
///
/// This struct is **not thread‑safe by default**. If concurrent access is required, wrap it in
/// a synchronization primitive (e.g., `Arc<Mutex<TreeFS>>`) at the application level. `cp()`
/// and `mv()` must run under that same lock as a whole.
///
/// ### Example
///
/// ```
/// use vfs_shell::{FsBackend, TreeFS};
///
/// let mut fs = TreeFS::new();
///
/// fs.mkdir("/docs").unwrap();
/// fs.write("/docs/note.txt", "Hello", false).unwrap();
///
/// assert!(fs.exists("/docs/note.txt"));
/// assert_eq!(fs.read("/docs/note.txt").unwrap(), "Hello");
///
/// fs.rm("/docs/note.txt").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct TreeFS {
    root: Node,   // always a directory
    cwd: VfsPath, // may be stale, see `cursor()`
}

impl Default for TreeFS {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeFS {
    /// Creates new TreeFS instance containing only the root directory.
    /// The current working directory is set to `/`.
    pub fn new() -> Self {
        Self {
            root: Node::empty_dir(),
            cwd: VfsPath::root(),
        }
    }

    /// Builds an instance from already validated parts.
    pub(crate) fn from_parts(root: Node, cwd: VfsPath) -> Self {
        Self { root, cwd }
    }

    pub(crate) fn root_node(&self) -> &Node {
        &self.root
    }

    /// Returns the current working directory, falling back to `/` if it is stale.
    fn cursor(&self) -> VfsPath {
        match self.lookup(&self.cwd) {
            Ok(node) if node.is_dir() => self.cwd.clone(),
            _ => {
                warn!(cwd = %self.cwd, "current directory no longer exists, using /");
                VfsPath::root()
            }
        }
    }

    fn to_inner(&self, path: &str) -> VfsPath {
        VfsPath::resolve(&self.cursor(), path)
    }

    /// Walks from the root to `path`.
    fn lookup(&self, path: &VfsPath) -> Result<&Node> {
        let mut node = &self.root;
        for (depth, name) in path.segments().iter().enumerate() {
            node = match node {
                Node::Directory(children) => children
                    .get(name)
                    .ok_or_else(|| FsError::not_found(path))?,
                Node::File(_) => return Err(FsError::not_a_directory(path.ancestor(depth))),
            };
        }
        Ok(node)
    }

    /// Returns the children of the existing directory at `path`.
    fn dir_mut(&mut self, path: &VfsPath) -> Result<&mut Children> {
        let mut node = &mut self.root;
        for (depth, name) in path.segments().iter().enumerate() {
            node = match node {
                Node::Directory(children) => children
                    .get_mut(name)
                    .ok_or_else(|| FsError::not_found(path))?,
                Node::File(_) => return Err(FsError::not_a_directory(path.ancestor(depth))),
            };
        }
        match node {
            Node::Directory(children) => Ok(children),
            Node::File(_) => Err(FsError::not_a_directory(path)),
        }
    }

    /// Creates every missing directory along `path` and returns the children of the last one.
    ///
    /// Missing segments can only follow the deepest existing one, so a file met on the way is
    /// always detected before anything is created: on error the tree is unchanged.
    fn mkdir_all(&mut self, path: &VfsPath) -> Result<&mut Children> {
        let mut node = &mut self.root;
        for (depth, name) in path.segments().iter().enumerate() {
            node = match node {
                Node::Directory(children) => {
                    children.entry(name.clone()).or_insert_with(Node::empty_dir)
                }
                Node::File(_) => return Err(FsError::not_a_directory(path.ancestor(depth))),
            };
        }
        match node {
            Node::Directory(children) => Ok(children),
            Node::File(_) => Err(FsError::not_a_directory(path)),
        }
    }

    /// Sets or appends the content of the file at `path`, creating it and its parents.
    ///
    /// A file standing where a parent directory should be makes the path unreachable: it is
    /// reported as not found, naming that file.
    fn put_file(&mut self, path: &VfsPath, content: &str, append: bool) -> Result<()> {
        let Some(name) = path.file_name() else {
            return Err(FsError::is_a_directory(path));
        };
        let parent = self.mkdir_all(&path.parent()).map_err(|err| match err {
            FsError::NotADirectory(segment) => FsError::NotFound(segment),
            err => err,
        })?;
        match parent.entry(name.to_string()) {
            Entry::Occupied(mut entry) => match entry.get_mut() {
                Node::File(existing) if append => existing.push_str(content),
                Node::File(existing) => *existing = content.to_string(),
                Node::Directory(_) => return Err(FsError::is_a_directory(path)),
            },
            Entry::Vacant(entry) => {
                entry.insert(Node::file(content));
            }
        }
        Ok(())
    }

    /// Detaches the node at `path` (with all its descendants) from its parent.
    fn remove_node(&mut self, path: &VfsPath) -> Result<Node> {
        let Some(name) = path.file_name() else {
            return Err(FsError::invalid_argument("the root cannot be removed"));
        };
        self.dir_mut(&path.parent())?
            .remove(name)
            .ok_or_else(|| FsError::not_found(path))
    }

    /// Removes the source of a move whose copy already landed at `target`.
    ///
    /// Through `mv()` the source always exists here, since the copy just read it; a failure
    /// is still reported as `MoveIncomplete` and leaves the copy in place.
    fn finish_move(&mut self, src: &VfsPath, target: &VfsPath) -> Result<()> {
        self.remove_node(src).map_err(|err| {
            warn!(from = %src, to = %target, %err, "mv left the source in place");
            FsError::MoveIncomplete {
                path: src.to_string(),
                cause: Box::new(err),
            }
        })?;
        Ok(())
    }

    /// Copies the node at `src` to `dst`, recursing into directories child by child.
    fn copy_into(&mut self, src: &VfsPath, dst: &VfsPath) -> Result<()> {
        let names: Vec<String> = match self.lookup(src)? {
            Node::File(content) => {
                let content = content.clone();
                return self.put_file(dst, &content, false);
            }
            Node::Directory(children) => children.keys().cloned().collect(),
        };

        self.mkdir_all(dst)?;
        for name in names {
            self.copy_into(&src.join(&name), &dst.join(&name))?;
        }
        Ok(())
    }
}

impl FsBackend for TreeFS {
    /// Returns current working directory (`/` if the remembered one was removed).
    fn pwd(&self) -> VfsPath {
        self.cursor()
    }

    /// Changes the current working directory.
    /// * `path` can be in relative or absolute form, but in both cases it must be an existing
    ///   directory. On error the current directory is unchanged.
    fn cd(&mut self, path: &str) -> Result<()> {
        let target = self.to_inner(path);
        if !self.lookup(&target)?.is_dir() {
            return Err(FsError::not_a_directory(&target));
        }
        debug!(cwd = %target, "cd");
        self.cwd = target;
        Ok(())
    }

    /// Checks if a `path` exists in the VFS.
    fn exists(&self, path: &str) -> bool {
        self.lookup(&self.to_inner(path)).is_ok()
    }

    /// Checks if `path` is a directory. Errors if it does not exist.
    fn is_dir(&self, path: &str) -> Result<bool> {
        Ok(self.lookup(&self.to_inner(path))?.is_dir())
    }

    /// Checks if `path` is a regular file. Errors if it does not exist.
    fn is_file(&self, path: &str) -> Result<bool> {
        Ok(self.lookup(&self.to_inner(path))?.is_file())
    }

    /// Lists names of the immediate children of the directory at `path`, sorted.
    ///
    /// # Returns
    /// * `Ok(Vec<String>)` - child names, possibly empty.
    /// * `Err(FsError)` - if `path` does not exist or is a file.
    fn ls(&self, path: &str) -> Result<Vec<String>> {
        let target = self.to_inner(path);
        match self.lookup(&target)? {
            Node::Directory(children) => Ok(children.keys().cloned().collect()),
            Node::File(_) => Err(FsError::not_a_directory(&target)),
        }
    }

    /// Creates directory and all its parents (if needed).
    /// Succeeds without changes if the directory already exists.
    /// If some segment of `path` is a file, nothing is created and the error names that segment.
    fn mkdir(&mut self, path: &str) -> Result<()> {
        let target = self.to_inner(path);
        self.mkdir_all(&target)?;
        debug!(path = %target, "mkdir");
        Ok(())
    }

    /// Creates an empty file, creating parent directories as needed.
    /// An existing file is truncated; an existing directory is an error.
    fn touch(&mut self, path: &str) -> Result<()> {
        let target = self.to_inner(path);
        self.put_file(&target, "", false)?;
        debug!(path = %target, "touch");
        Ok(())
    }

    /// Writes `content` to the file at `path`, replacing or (with `append`) extending it.
    /// The file and its parent directories are created if absent.
    fn write(&mut self, path: &str, content: &str, append: bool) -> Result<()> {
        let target = self.to_inner(path);
        self.put_file(&target, content, append)?;
        debug!(path = %target, bytes = content.len(), append, "write");
        Ok(())
    }

    /// Reads the entire content of a file.
    ///
    /// An empty string is a valid result for an empty file; a missing path is an error.
    fn read(&self, path: &str) -> Result<String> {
        let target = self.to_inner(path);
        match self.lookup(&target)? {
            Node::File(content) => Ok(content.clone()),
            Node::Directory(_) => Err(FsError::is_a_directory(&target)),
        }
    }

    /// Removes a file or directory at the specified path.
    /// If the path is a directory, all its contents are removed recursively.
    /// The root cannot be removed.
    fn rm(&mut self, path: &str) -> Result<()> {
        let target = self.to_inner(path);
        self.remove_node(&target)?;
        debug!(path = %target, "rm");
        Ok(())
    }

    /// Copies a file or a whole directory tree.
    ///
    /// If `dest` is an existing directory, the copy is placed inside it under the source's
    /// name. Files are created or overwritten; directories are merged child by child.
    /// Returns the path the copy landed at.
    ///
    /// # Notes
    /// - Copying a node onto itself or into its own subtree is rejected.
    /// - **Not atomic**: if copying some child fails, the nodes created before it are kept.
    fn cp(&mut self, source: &str, dest: &str) -> Result<VfsPath> {
        let src = self.to_inner(source);
        let dst = self.to_inner(dest);
        self.lookup(&src)?;

        let dest_is_dir = self.lookup(&dst).is_ok_and(Node::is_dir);
        let target = match src.file_name() {
            Some(name) if dest_is_dir => dst.join(name),
            _ => dst,
        };
        if target.starts_with(&src) {
            return Err(FsError::CopyIntoItself {
                source_path: src.to_string(),
                dest_path: target.to_string(),
            });
        }

        self.copy_into(&src, &target)?;
        debug!(from = %src, to = %target, "cp");
        Ok(target)
    }

    /// Moves a file or directory: `cp()` followed by removal of the source.
    ///
    /// Nothing is removed if the copy fails. If the copy succeeds but the source cannot be
    /// removed, `FsError::MoveIncomplete` is returned and the copy is kept.
    fn mv(&mut self, source: &str, dest: &str) -> Result<VfsPath> {
        let src = self.to_inner(source);
        let target = self.cp(source, dest)?;
        self.finish_move(&src, &target)?;
        debug!(from = %src, to = %target, "mv");
        Ok(target)
    }

    /// Returns all non-overlapping matches of the regular expression `pattern` in the file
    /// at `path`, in order of occurrence. No matches is an empty vector, not an error.
    fn grep(&self, pattern: &str, path: &str) -> Result<Vec<String>> {
        let target = self.to_inner(path);
        let content = match self.lookup(&target)? {
            Node::File(content) => content,
            Node::Directory(_) => return Err(FsError::is_a_directory(&target)),
        };
        let re = Regex::new(pattern)?;
        Ok(re
            .find_iter(content)
            .map(|m| m.as_str().to_string())
            .collect())
    }
}
