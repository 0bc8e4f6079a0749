//! Session persistence: snapshot the whole namespace (tree and current directory) and
//! restore it, in memory or through a JSON file on the host.
//!
//! The JSON form keeps files and directories apart by type: a file is a string, a
//! directory is an object (`{}` when empty).
//!
//! ```json
//! {
//!   "current_dir": "/docs",
//!   "root": { "docs": { "note.txt": "Hello", "drafts": {} } }
//! }
//! ```

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::path::is_valid_name;
use crate::core::{FsBackend, FsError, Result, VfsPath};
use crate::vfs::{Node, TreeFS};

/// A serializable copy of a [`TreeFS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub current_dir: String,
    pub root: Node,
}

impl TreeFS {
    /// Captures the current directory and the full tree.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            current_dir: self.pwd().to_string(),
            root: self.root_node().clone(),
        }
    }

    /// Rebuilds an instance from a snapshot.
    ///
    /// The root must be a directory, every entry name must be valid and the current directory
    /// must be absolute. A current directory that does not exist in the tree is kept and
    /// resolves to `/` like any stale one.
    pub fn restore(snapshot: Snapshot) -> Result<TreeFS> {
        if !snapshot.root.is_dir() {
            return Err(FsError::corrupt("the root must be a directory"));
        }
        validate_names(&snapshot.root, &VfsPath::root())?;
        if !snapshot.current_dir.starts_with('/') {
            return Err(FsError::corrupt(format!(
                "current directory must be absolute: {}",
                snapshot.current_dir
            )));
        }
        let cwd = VfsPath::parse(&snapshot.current_dir);
        Ok(TreeFS::from_parts(snapshot.root, cwd))
    }
}

fn validate_names(node: &Node, path: &VfsPath) -> Result<()> {
    if let Node::Directory(children) = node {
        for (name, child) in children {
            if !is_valid_name(name) {
                return Err(FsError::corrupt(format!("invalid entry name {name:?} in {path}")));
            }
            validate_names(child, &path.join(name))?;
        }
    }
    Ok(())
}

/// Encodes `vfs` as pretty-printed JSON.
pub fn to_json(vfs: &TreeFS) -> anyhow::Result<String> {
    serde_json::to_string_pretty(&vfs.snapshot()).context("failed to encode session")
}

/// Decodes a session previously produced by [`to_json`].
///
/// Trees may be nested deeper than serde_json's default limit of 128 levels: the recursion
/// limit is lifted and the stack grows on demand while decoding.
pub fn from_json(json: &str) -> anyhow::Result<TreeFS> {
    let snapshot = decode_snapshot(json).context("failed to decode session")?;
    Ok(TreeFS::restore(snapshot)?)
}

fn decode_snapshot(json: &str) -> serde_json::Result<Snapshot> {
    let mut de = serde_json::Deserializer::from_str(json);
    de.disable_recursion_limit();
    let snapshot = Snapshot::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(snapshot)
}

/// Writes the session of `vfs` to the host file `path`.
pub fn save<P: AsRef<Path>>(vfs: &TreeFS, path: P) -> anyhow::Result<()> {
    let path = path.as_ref();
    let json = to_json(vfs)?;
    fs::write(path, json)
        .with_context(|| format!("failed to write session file {}", path.display()))?;
    info!(path = %path.display(), "session saved");
    Ok(())
}

/// Reads a session from the host file `path`.
pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<TreeFS> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read session file {}", path.display()))?;
    let vfs =
        from_json(&json).with_context(|| format!("{} is not a valid session", path.display()))?;
    info!(path = %path.display(), "session loaded");
    Ok(vfs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ErrorKind;
    use tempdir::TempDir;

    fn setup_test_vfs() -> TreeFS {
        let mut vfs = TreeFS::new();
        vfs.mkdir("/home/user/empty").unwrap();
        vfs.write("/home/user/notes.txt", "line 1\nline 2", false)
            .unwrap();
        vfs.touch("/home/empty.txt").unwrap();
        vfs.mkdir("/etc").unwrap();
        vfs.cd("/home/user").unwrap();
        vfs
    }

    mod snapshot {
        use super::*;

        #[test]
        fn test_round_trip() -> Result<()> {
            let vfs = setup_test_vfs();
            let restored = TreeFS::restore(vfs.snapshot())?;

            assert_eq!(restored.snapshot(), vfs.snapshot());
            assert_eq!(restored.pwd().to_string(), "/home/user");
            assert_eq!(restored.read("/home/empty.txt")?, "");
            assert!(restored.is_dir("/home/user/empty")?);
            assert_eq!(restored.read("notes.txt")?, "line 1\nline 2");
            Ok(())
        }

        #[test]
        fn test_round_trip_empty_tree() -> Result<()> {
            let vfs = TreeFS::new();
            let restored = TreeFS::restore(vfs.snapshot())?;
            assert_eq!(restored.snapshot(), vfs.snapshot());
            Ok(())
        }

        #[test]
        fn test_restore_rejects_file_root() {
            let err = TreeFS::restore(Snapshot {
                current_dir: "/".into(),
                root: Node::file("oops"),
            })
            .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Io);
        }

        #[test]
        fn test_restore_rejects_bad_names() {
            let mut root = crate::vfs::Children::new();
            root.insert("a/b".into(), Node::empty_dir());
            let err = TreeFS::restore(Snapshot {
                current_dir: "/".into(),
                root: Node::Directory(root),
            })
            .unwrap_err();
            assert!(err.to_string().contains("a/b"));
        }

        #[test]
        fn test_restore_rejects_relative_cwd() {
            let err = TreeFS::restore(Snapshot {
                current_dir: "home".into(),
                root: Node::empty_dir(),
            })
            .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Io);
        }

        #[test]
        fn test_restore_with_missing_cwd_falls_back_to_root() -> Result<()> {
            let vfs = TreeFS::restore(Snapshot {
                current_dir: "/gone".into(),
                root: Node::empty_dir(),
            })?;
            assert_eq!(vfs.pwd(), VfsPath::root());
            Ok(())
        }
    }

    mod json {
        use super::*;

        #[test]
        fn test_json_shape() -> anyhow::Result<()> {
            let mut vfs = TreeFS::new();
            vfs.mkdir("/d")?;
            vfs.touch("/f")?;

            let value: serde_json::Value = serde_json::from_str(&to_json(&vfs)?)?;
            assert_eq!(
                value,
                serde_json::json!({ "current_dir": "/", "root": { "d": {}, "f": "" } })
            );
            Ok(())
        }

        #[test]
        fn test_json_round_trip() -> anyhow::Result<()> {
            let vfs = setup_test_vfs();
            let restored = from_json(&to_json(&vfs)?)?;
            assert_eq!(restored.snapshot(), vfs.snapshot());
            Ok(())
        }

        #[test]
        fn test_from_json_corrupt() {
            assert!(from_json("{ not json").is_err());
            assert!(from_json(r#"{"current_dir": "/", "root": 7}"#).is_err());
            assert!(from_json(r#"{"current_dir": "/", "root": {}} trailing"#).is_err());
        }

        #[test]
        fn test_json_round_trip_deep_tree() -> anyhow::Result<()> {
            let deep: Vec<String> = (0..200).map(|i| format!("d{i}")).collect();
            let deep = format!("/{}", deep.join("/"));

            let mut vfs = TreeFS::new();
            vfs.mkdir(&deep)?;
            vfs.write(&format!("{deep}/leaf.txt"), "bottom", false)?;
            vfs.cd(&deep)?;

            let restored = from_json(&to_json(&vfs)?)?;
            assert_eq!(restored.snapshot(), vfs.snapshot());
            assert_eq!(restored.pwd().to_string(), deep);
            assert_eq!(restored.read("leaf.txt")?, "bottom");
            Ok(())
        }
    }

    mod files {
        use super::*;

        #[test]
        fn test_save_and_load() -> anyhow::Result<()> {
            let tmp = TempDir::new("vfs_shell")?;
            let file = tmp.path().join("session.json");

            let vfs = setup_test_vfs();
            save(&vfs, &file)?;
            let loaded = load(&file)?;

            assert_eq!(loaded.snapshot(), vfs.snapshot());
            Ok(())
        }

        #[test]
        fn test_save_and_load_deep_tree() -> anyhow::Result<()> {
            let tmp = TempDir::new("vfs_shell")?;
            let file = tmp.path().join("deep.json");

            let mut vfs = TreeFS::new();
            for i in 0..150 {
                vfs.mkdir(&format!("level{i}"))?;
                vfs.cd(&format!("level{i}"))?;
            }
            vfs.touch("empty.txt")?;
            save(&vfs, &file)?;

            assert_eq!(load(&file)?.snapshot(), vfs.snapshot());
            Ok(())
        }

        #[test]
        fn test_load_missing_file() -> anyhow::Result<()> {
            let tmp = TempDir::new("vfs_shell")?;
            let err = load(tmp.path().join("absent.json")).unwrap_err();
            assert!(err.to_string().contains("failed to read session file"));
            Ok(())
        }

        #[test]
        fn test_load_corrupt_file() -> anyhow::Result<()> {
            let tmp = TempDir::new("vfs_shell")?;
            let file = tmp.path().join("broken.json");
            std::fs::write(&file, "[1, 2, 3]")?;

            let err = load(&file).unwrap_err();
            assert!(err.to_string().contains("is not a valid session"));
            Ok(())
        }
    }
}
