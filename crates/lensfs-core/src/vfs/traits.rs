//! Real-filesystem delegate trait and types.
//!
//! The lens engine never performs I/O itself; every listing, stat, read and
//! mutation goes through a [`Filesystem`] delegate operating on absolute real
//! paths. Filtering governs visibility only — never mutation legality.

use async_trait::async_trait;
use std::io;
use std::path::Path;
use std::time::SystemTime;

/// Metadata about a file or directory.
#[derive(Debug, Clone)]
pub struct Metadata {
    /// True if this is a directory.
    pub is_dir: bool,
    /// True if this is a file.
    pub is_file: bool,
    /// Size in bytes (0 for directories).
    pub size: u64,
    /// Last modification time, if available.
    pub modified: Option<SystemTime>,
    /// True if the entry cannot be written through this delegate.
    pub read_only: bool,
}

impl Metadata {
    /// A synthetic read-only directory descriptor stamped with `modified`.
    pub fn synthetic_dir(modified: SystemTime) -> Self {
        Self {
            is_dir: true,
            is_file: false,
            size: 0,
            modified: Some(modified),
            read_only: true,
        }
    }
}

/// Type of directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    File,
    Directory,
}

/// A directory entry returned by `list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Name of the entry (not full path).
    pub name: String,
    /// Type of entry.
    pub entry_type: EntryType,
}

impl DirEntry {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entry_type: EntryType::File,
        }
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entry_type: EntryType::Directory,
        }
    }
}

/// Abstract real-filesystem interface.
///
/// All paths are absolute real paths; the engine resolves virtual paths
/// before calling in. Listing order is whatever the underlying enumeration
/// produces — the engine preserves it.
#[async_trait]
pub trait Filesystem: Send + Sync {
    /// Read the entire contents of a file.
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Write data to a file, creating it if it doesn't exist.
    async fn write(&self, path: &Path, data: &[u8]) -> io::Result<()>;

    /// List entries in a directory, in enumeration order.
    async fn list(&self, path: &Path) -> io::Result<Vec<DirEntry>>;

    /// Get metadata for a file or directory.
    async fn stat(&self, path: &Path) -> io::Result<Metadata>;

    /// Create a directory (and parent directories if needed).
    async fn mkdir(&self, path: &Path) -> io::Result<()>;

    /// Remove a file or directory. Directories are removed recursively.
    async fn remove(&self, path: &Path) -> io::Result<()>;

    /// Rename (move) a file or directory.
    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Copy a file. Directories are not copied recursively.
    async fn copy(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Check if a path exists.
    async fn exists(&self, path: &Path) -> bool {
        self.stat(path).await.is_ok()
    }
}
