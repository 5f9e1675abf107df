//! In-memory delegate for deterministic engine tests.
//!
//! Listings come back in insertion order, not sorted, so tests can verify
//! that the view preserves the delegate's enumeration order.

use super::traits::{DirEntry, EntryType, Filesystem, Metadata};
use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

#[derive(Debug, Clone)]
enum Node {
    File { data: Vec<u8> },
    Directory,
}

#[derive(Debug, Clone)]
struct Entry {
    node: Node,
    /// Insertion sequence, drives listing order.
    seq: u64,
    modified: SystemTime,
}

/// In-memory filesystem keyed by absolute path.
#[derive(Debug, Default)]
pub struct MemFs {
    entries: RwLock<HashMap<PathBuf, Entry>>,
    counter: AtomicU64,
}

impl MemFs {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_seq(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::SeqCst)
    }

    /// Create a directory entry and all its ancestors.
    pub fn add_dir(&self, path: impl Into<PathBuf>) {
        let path = path.into();
        let mut entries = self.entries.write().expect("lock poisoned");
        let mut chain: Vec<PathBuf> = std::iter::successors(Some(path), |p| {
            p.parent().map(Path::to_path_buf)
        })
        .take_while(|p| !p.as_os_str().is_empty() && p != Path::new("/"))
        .collect();
        chain.reverse();
        for dir in chain {
            if !entries.contains_key(&dir) {
                let seq = self.counter.fetch_add(1, Ordering::SeqCst);
                entries.insert(
                    dir,
                    Entry {
                        node: Node::Directory,
                        seq,
                        modified: SystemTime::now(),
                    },
                );
            }
        }
    }

    /// Create a file entry (and parent directories).
    pub fn add_file(&self, path: impl Into<PathBuf>, data: &[u8]) {
        let path = path.into();
        if let Some(parent) = path.parent() {
            self.add_dir(parent.to_path_buf());
        }
        let seq = self.next_seq();
        self.entries.write().expect("lock poisoned").insert(
            path,
            Entry {
                node: Node::File {
                    data: data.to_vec(),
                },
                seq,
                modified: SystemTime::now(),
            },
        );
    }
}

#[async_trait]
impl Filesystem for MemFs {
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let entries = self.entries.read().expect("lock poisoned");
        match entries.get(path).map(|e| &e.node) {
            Some(Node::File { data }) => Ok(data.clone()),
            Some(Node::Directory) => Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("is a directory: {}", path.display()),
            )),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("not found: {}", path.display()),
            )),
        }
    }

    async fn write(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        self.add_file(path.to_path_buf(), data);
        Ok(())
    }

    async fn list(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let entries = self.entries.read().expect("lock poisoned");
        match entries.get(path).map(|e| &e.node) {
            Some(Node::Directory) => {}
            Some(Node::File { .. }) => {
                return Err(io::Error::new(
                    io::ErrorKind::NotADirectory,
                    format!("not a directory: {}", path.display()),
                ));
            }
            None => {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("not found: {}", path.display()),
                ));
            }
        }

        let mut children: Vec<(&PathBuf, &Entry)> = entries
            .iter()
            .filter(|(p, _)| p.parent() == Some(path))
            .collect();
        children.sort_by_key(|(_, e)| e.seq);

        Ok(children
            .into_iter()
            .map(|(p, e)| DirEntry {
                name: p
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                entry_type: match e.node {
                    Node::Directory => EntryType::Directory,
                    Node::File { .. } => EntryType::File,
                },
            })
            .collect())
    }

    async fn stat(&self, path: &Path) -> io::Result<Metadata> {
        let entries = self.entries.read().expect("lock poisoned");
        match entries.get(path) {
            Some(entry) => Ok(match &entry.node {
                Node::Directory => Metadata {
                    is_dir: true,
                    is_file: false,
                    size: 0,
                    modified: Some(entry.modified),
                    read_only: false,
                },
                Node::File { data } => Metadata {
                    is_dir: false,
                    is_file: true,
                    size: data.len() as u64,
                    modified: Some(entry.modified),
                    read_only: false,
                },
            }),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("not found: {}", path.display()),
            )),
        }
    }

    async fn mkdir(&self, path: &Path) -> io::Result<()> {
        self.add_dir(path.to_path_buf());
        Ok(())
    }

    async fn remove(&self, path: &Path) -> io::Result<()> {
        let mut entries = self.entries.write().expect("lock poisoned");
        if !entries.contains_key(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("not found: {}", path.display()),
            ));
        }
        entries.retain(|p, _| !p.starts_with(path));
        Ok(())
    }

    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let mut entries = self.entries.write().expect("lock poisoned");
        let moved: Vec<(PathBuf, Entry)> = entries
            .iter()
            .filter(|(p, _)| p.starts_with(from))
            .map(|(p, e)| (p.clone(), e.clone()))
            .collect();
        if moved.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("not found: {}", from.display()),
            ));
        }
        entries.retain(|p, _| !p.starts_with(from));
        for (p, e) in moved {
            let rel = p.strip_prefix(from).expect("filtered by starts_with");
            entries.insert(to.join(rel), e);
        }
        Ok(())
    }

    async fn copy(&self, from: &Path, to: &Path) -> io::Result<()> {
        let data = self.read(from).await?;
        self.add_file(to.to_path_buf(), &data);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_listing_preserves_insertion_order() {
        let mfs = MemFs::new();
        mfs.add_file("/w/z.txt", b"z");
        mfs.add_file("/w/a.txt", b"a");
        mfs.add_dir("/w/mid");

        let names: Vec<_> = mfs
            .list(Path::new("/w"))
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["z.txt", "a.txt", "mid"]);
    }

    #[tokio::test]
    async fn test_parents_created_implicitly() {
        let mfs = MemFs::new();
        mfs.add_file("/w/a/b/c.txt", b"x");

        assert!(mfs.stat(Path::new("/w/a")).await.unwrap().is_dir);
        assert!(mfs.stat(Path::new("/w/a/b")).await.unwrap().is_dir);
    }

    #[tokio::test]
    async fn test_remove_is_recursive() {
        let mfs = MemFs::new();
        mfs.add_file("/w/a/b.txt", b"x");
        mfs.remove(Path::new("/w/a")).await.unwrap();
        assert!(mfs.read(Path::new("/w/a/b.txt")).await.is_err());
    }

    #[tokio::test]
    async fn test_rename_moves_subtree() {
        let mfs = MemFs::new();
        mfs.add_file("/w/a/b.txt", b"x");
        mfs.rename(Path::new("/w/a"), Path::new("/w/c")).await.unwrap();
        assert_eq!(mfs.read(Path::new("/w/c/b.txt")).await.unwrap(), b"x");
        assert!(mfs.read(Path::new("/w/a/b.txt")).await.is_err());
    }
}
