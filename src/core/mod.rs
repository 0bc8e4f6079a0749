pub mod error;
pub mod path;

pub use error::{ErrorKind, FsError};
pub use path::VfsPath;

/// The operation surface of a namespace backend.
///
/// Every `path` argument is a user-supplied string: absolute, or relative to
/// the current working directory. An empty string denotes the current working
/// directory.
pub trait FsBackend {
    /// Returns the current working directory.
    fn pwd(&self) -> VfsPath;
    fn cd(&mut self, path: &str) -> Result<()>;
    fn exists(&self, path: &str) -> bool;
    fn is_dir(&self, path: &str) -> Result<bool>;
    fn is_file(&self, path: &str) -> Result<bool>;
    fn ls(&self, path: &str) -> Result<Vec<String>>;
    fn mkdir(&mut self, path: &str) -> Result<()>;
    fn touch(&mut self, path: &str) -> Result<()>;
    fn write(&mut self, path: &str, content: &str, append: bool) -> Result<()>;
    fn read(&self, path: &str) -> Result<String>;
    fn rm(&mut self, path: &str) -> Result<()>;
    fn cp(&mut self, source: &str, dest: &str) -> Result<VfsPath>;
    fn mv(&mut self, source: &str, dest: &str) -> Result<VfsPath>;
    fn grep(&self, pattern: &str, path: &str) -> Result<Vec<String>>;
}

pub type Result<T> = std::result::Result<T, FsError>;
