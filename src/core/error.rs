//! Error types of the namespace engine.

use thiserror::Error;

/// Coarse classification of an [`FsError`].
///
/// The shell and the session layer only care about these four kinds; the
/// concrete variant carries the offending path for the message.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A resolved path does not exist in the tree.
    NotFound,
    /// A directory was expected and a file was found, or vice versa.
    TypeMismatch,
    /// Malformed input: bad command arguments, bad pattern, forbidden target.
    InvalidArgument,
    /// Persistence failure (session file missing, unreadable or corrupt).
    Io,
}

/// Namespace engine error.
#[derive(Debug, Error)]
pub enum FsError {
    /// File or directory not found.
    #[error("{0}: no such file or directory")]
    NotFound(String),

    /// Expected a directory.
    #[error("{0}: not a directory")]
    NotADirectory(String),

    /// Expected a file.
    #[error("{0}: is a directory")]
    IsADirectory(String),

    /// Invalid path or argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid regular expression.
    #[error("invalid pattern")]
    InvalidPattern(#[from] regex::Error),

    /// Destination is the source itself or lies below it.
    #[error("cannot copy {source_path} into itself ({dest_path})")]
    CopyIntoItself {
        source_path: String,
        dest_path: String,
    },

    /// `mv` copied the source but could not remove it afterwards.
    #[error("{path}: moved partially, source was not removed")]
    MoveIncomplete {
        path: String,
        #[source]
        cause: Box<FsError>,
    },

    /// Snapshot could not be restored.
    #[error("corrupt session: {0}")]
    Corrupt(String),
}

impl FsError {
    /// Create a NotFound error.
    pub fn not_found(path: impl ToString) -> Self {
        Self::NotFound(path.to_string())
    }

    /// Create a NotADirectory error.
    pub fn not_a_directory(path: impl ToString) -> Self {
        Self::NotADirectory(path.to_string())
    }

    /// Create an IsADirectory error.
    pub fn is_a_directory(path: impl ToString) -> Self {
        Self::IsADirectory(path.to_string())
    }

    /// Create an InvalidArgument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a Corrupt error.
    pub fn corrupt(msg: impl Into<String>) -> Self {
        Self::Corrupt(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            FsError::NotFound(_) => ErrorKind::NotFound,
            FsError::NotADirectory(_) | FsError::IsADirectory(_) => ErrorKind::TypeMismatch,
            FsError::InvalidArgument(_)
            | FsError::InvalidPattern(_)
            | FsError::CopyIntoItself { .. } => ErrorKind::InvalidArgument,
            FsError::MoveIncomplete { cause, .. } => cause.kind(),
            FsError::Corrupt(_) => ErrorKind::Io,
        }
    }
}
