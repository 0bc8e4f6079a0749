//! Inner paths of the virtual namespace.
//!
//! A [`VfsPath`] is always absolute and normalized: it is stored as the list of
//! its segments, so `/a/b` is `["a", "b"]` and the root `/` is the empty list.
//! Normalization is purely lexical and never looks at the tree.

use std::fmt;

/// An absolute, normalized path inside the VFS.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct VfsPath {
    segments: Vec<String>,
}

impl VfsPath {
    /// Returns the root path `/`.
    pub fn root() -> Self {
        Self::default()
    }

    /// Resolves `input` against `cursor` and normalizes the result.
    ///
    /// * an input starting with `/` is absolute, otherwise it is relative to `cursor`;
    /// * `~` alone or as the first segment denotes the root;
    /// * an empty input resolves to `cursor` itself;
    /// * `.` segments are dropped, `..` removes the previous segment (a no-op at root);
    /// * repeated and trailing separators are ignored.
    pub fn resolve(cursor: &VfsPath, input: &str) -> VfsPath {
        let input = input.trim();
        let (mut base, rest) = if let Some(rest) = input.strip_prefix('/') {
            (VfsPath::root(), rest)
        } else if input == "~" {
            (VfsPath::root(), "")
        } else if let Some(rest) = input.strip_prefix("~/") {
            (VfsPath::root(), rest)
        } else {
            (cursor.clone(), input)
        };

        for component in rest.split('/') {
            match component {
                "" | "." => {}
                ".." => {
                    base.segments.pop();
                }
                name => base.segments.push(name.to_string()),
            }
        }
        base
    }

    /// Parses an absolute path string. Relative input is resolved against the root.
    pub fn parse(path: &str) -> VfsPath {
        Self::resolve(&VfsPath::root(), path)
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The last segment, `None` for the root.
    pub fn file_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// The parent directory; the root is its own parent.
    pub fn parent(&self) -> VfsPath {
        self.ancestor(self.segments.len().saturating_sub(1))
    }

    /// The prefix made of the first `depth` segments.
    pub fn ancestor(&self, depth: usize) -> VfsPath {
        VfsPath {
            segments: self.segments[..depth.min(self.segments.len())].to_vec(),
        }
    }

    /// Appends one child name.
    pub fn join(&self, name: &str) -> VfsPath {
        let mut joined = self.clone();
        joined.segments.push(name.to_string());
        joined
    }

    /// `true` if `self` equals `base` or lies below it.
    pub fn starts_with(&self, base: &VfsPath) -> bool {
        self.segments.starts_with(&base.segments)
    }
}

impl fmt::Display for VfsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

/// Checks that `name` can be stored as a single directory entry.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(cursor: &str, input: &str) -> String {
        VfsPath::resolve(&VfsPath::parse(cursor), input).to_string()
    }

    mod normalize {
        use super::*;

        #[test]
        fn test_normalize_path() {
            assert_eq!(resolve("/", "/a/b/c/"), "/a/b/c");
            assert_eq!(resolve("/", "/a/b/./c"), "/a/b/c");
            assert_eq!(resolve("/", "/a/b/../c"), "/a/c");
            assert_eq!(resolve("/", "/"), "/");
            assert_eq!(resolve("/", "/.."), "/");
            assert_eq!(resolve("/", "//a///b//"), "/a/b");
        }

        #[test]
        fn test_relative_to_cursor() {
            assert_eq!(resolve("/home", "user"), "/home/user");
            assert_eq!(resolve("/home/user", "../etc"), "/home/etc");
            assert_eq!(resolve("/home/user", "./docs/./a"), "/home/user/docs/a");
            assert_eq!(resolve("/home/user", ""), "/home/user");
            assert_eq!(resolve("/home/user", "."), "/home/user");
        }

        #[test]
        fn test_special_tokens() {
            assert_eq!(resolve("/home/user", "~"), "/");
            assert_eq!(resolve("/home/user", "~/docs"), "/docs");
            assert_eq!(resolve("/home/user", "/"), "/");
            assert_eq!(resolve("/home/user", ".."), "/home");
            assert_eq!(resolve("/home", ".."), "/");
        }

        #[test]
        fn test_ascending_past_root_is_noop() {
            assert_eq!(resolve("/", ".."), "/");
            assert_eq!(resolve("/a", "../../../b"), "/b");
        }

        #[test]
        fn test_resolution_is_deterministic() {
            let cursor = VfsPath::parse("/x/y");
            for input in ["a/../b", "../..", "~", "/q/./r/", ""] {
                assert_eq!(
                    VfsPath::resolve(&cursor, input),
                    VfsPath::resolve(&cursor, input)
                );
            }
        }

        #[test]
        fn test_segments_are_reusable() {
            let path = VfsPath::parse("/a/b/c");
            assert_eq!(path.segments(), ["a", "b", "c"]);
            assert!(VfsPath::root().segments().is_empty());
        }
    }

    mod navigation {
        use super::*;

        #[test]
        fn test_parent_and_file_name() {
            let path = VfsPath::parse("/a/b/c");
            assert_eq!(path.parent().to_string(), "/a/b");
            assert_eq!(path.file_name(), Some("c"));
            assert_eq!(VfsPath::root().parent(), VfsPath::root());
            assert_eq!(VfsPath::root().file_name(), None);
        }

        #[test]
        fn test_ancestor_and_join() {
            let path = VfsPath::parse("/a/b/c");
            assert_eq!(path.ancestor(0).to_string(), "/");
            assert_eq!(path.ancestor(2).to_string(), "/a/b");
            assert_eq!(path.ancestor(10), path);
            assert_eq!(VfsPath::root().join("x").to_string(), "/x");
        }

        #[test]
        fn test_starts_with() {
            let base = VfsPath::parse("/a/b");
            assert!(VfsPath::parse("/a/b").starts_with(&base));
            assert!(VfsPath::parse("/a/b/c").starts_with(&base));
            assert!(!VfsPath::parse("/a/bc").starts_with(&base));
            assert!(!VfsPath::parse("/a").starts_with(&base));
            assert!(base.starts_with(&VfsPath::root()));
        }
    }

    #[test]
    fn test_is_valid_name() {
        assert!(is_valid_name("file.txt"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("."));
        assert!(!is_valid_name(".."));
        assert!(!is_valid_name("a/b"));
    }
}
