//! Abstractions over the question bank being read.
//!
//! The builder only ever needs two things from its input: the entries of a
//! directory, in the order the source reports them, and the bytes of a file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{Error, Result};

/// Kind of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub name: String,
    pub kind: EntryKind,
}

impl SourceEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// A readable tree of directories and files.
pub trait SourceTree {
    /// List the entries of `dir` in the source's own listing order.
    fn list(&self, dir: &Path) -> Result<Vec<SourceEntry>>;

    /// Read the full contents of the file at `path`.
    fn read(&self, path: &Path) -> Result<Vec<u8>>;
}

// --- Implementation: Local Filesystem ---

/// The real filesystem. Listing order is whatever `read_dir` yields.
///
/// Entries whose names are not valid UTF-8 are skipped with a warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskSource;

impl SourceTree for DiskSource {
    fn list(&self, dir: &Path) -> Result<Vec<SourceEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir).map_err(|e| Error::fs(dir, e))? {
            let entry = entry.map_err(|e| Error::fs(dir, e))?;
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    warn!(dir = %dir.display(), name = ?raw, "skipping entry with a non-UTF-8 name");
                    continue;
                }
            };
            let path = entry.path();
            // Follow symlinks; a dangling link counts as a file.
            let kind = match fs::metadata(&path) {
                Ok(meta) if meta.is_dir() => EntryKind::Directory,
                _ => EntryKind::File,
            };
            entries.push(SourceEntry { name, kind });
        }
        Ok(entries)
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(path).map_err(|e| Error::fs(path, e))
    }
}

// --- Implementation: In-Memory ---

/// An in-memory tree. Directories list their entries in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    dirs: BTreeMap<PathBuf, Vec<SourceEntry>>,
    files: BTreeMap<PathBuf, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, creating any missing parent directories.
    pub fn add_file(&mut self, path: impl AsRef<Path>, data: impl Into<Vec<u8>>) -> &mut Self {
        let path = path.as_ref();
        self.link(path, EntryKind::File);
        self.files.insert(path.to_path_buf(), data.into());
        self
    }

    /// Add an empty directory, creating any missing parents.
    pub fn add_dir(&mut self, path: impl AsRef<Path>) -> &mut Self {
        let path = path.as_ref();
        self.link(path, EntryKind::Directory);
        self.dirs.entry(path.to_path_buf()).or_default();
        self
    }

    fn link(&mut self, path: &Path, kind: EntryKind) {
        let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
            return;
        };
        if !parent.as_os_str().is_empty() && !self.dirs.contains_key(parent) {
            self.add_dir(parent);
        }
        let name = name.to_string_lossy().into_owned();
        let listing = self.dirs.entry(parent.to_path_buf()).or_default();
        if !listing.iter().any(|e| e.name == name) {
            listing.push(SourceEntry { name, kind });
        }
    }
}

impl SourceTree for MemorySource {
    fn list(&self, dir: &Path) -> Result<Vec<SourceEntry>> {
        self.dirs.get(dir).cloned().ok_or_else(|| {
            Error::fs(
                dir,
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such directory"),
            )
        })
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.files.get(path).cloned().ok_or_else(|| {
            Error::fs(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            )
        })
    }
}
