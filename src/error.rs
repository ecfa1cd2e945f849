//! Error types for stackbook operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building or writing a book.
///
/// Every variant is fatal: the first one raised aborts the build and is
/// propagated to the caller unchanged.
#[derive(Error, Debug)]
pub enum Error {
    /// A category descriptor or question file is not the expected XML shape.
    #[error("cannot parse {}: {reason}", path.display())]
    ResourceParse { path: PathBuf, reason: String },

    /// A directory could not be listed, or a file read or written.
    #[error("filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A node title has nothing a slug can be made of, so the node would
    /// have no usable output path or `xml:id`.
    #[error("{}: title {title:?} gives an empty slug", path.display())]
    EmptySlug { path: PathBuf, title: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::ResourceParse {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn fs(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Filesystem {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
