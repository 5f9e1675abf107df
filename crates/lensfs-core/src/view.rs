//! Filtered view over resolved virtual paths.
//!
//! The view is never persisted — every listing is derived per-query from a
//! live read of the real filesystem, filtered through the current snapshot
//! of the filter set. Reads take their snapshots (`&RootMap`, `&FilterSet`)
//! as explicit parameters so there are no hidden cross-call dependencies.
//!
//! Visibility is a three-way decision per listed directory:
//!
//! 1. the directory's subpath is covered by a filter — every child is
//!    visible, no further tests (a match cascades to all descendants);
//! 2. a child's subpath is itself covered, or is a strict ancestor of some
//!    filter — the child is visible as a pass-through toward a deeper match
//!    without exposing its siblings;
//! 3. otherwise the child is hidden.

use std::sync::Arc;

use tracing::trace;

use crate::error::{LensError, LensResult};
use crate::filters::FilterSet;
use crate::roots::RootMap;
use crate::vfs::{DirEntry, Filesystem, Metadata};

/// Decide which real entries are visible under `subpath`.
///
/// `entries` arrive in the delegate's enumeration order and leave in the
/// same order — no sorting pass. The covered/ancestor tests apply to
/// directories and files alike; a file outside a covered directory is
/// visible exactly when a filter covers its full relative path.
pub fn select_visible(filters: &FilterSet, subpath: &str, entries: Vec<DirEntry>) -> Vec<DirEntry> {
    if filters.covers(subpath) {
        return entries;
    }

    entries
        .into_iter()
        .filter(|entry| {
            let child = if subpath.is_empty() {
                entry.name.clone()
            } else {
                format!("{subpath}/{}", entry.name)
            };
            filters.covers(&child) || filters.leads_to_filter(&child)
        })
        .collect()
}

/// Read/write access to the virtual namespace.
///
/// Owns only the delegate; mapping and filter state belong to the engine
/// and are passed per call.
#[derive(Clone)]
pub struct ScopedView {
    fs: Arc<dyn Filesystem>,
}

impl ScopedView {
    pub fn new(fs: Arc<dyn Filesystem>) -> Self {
        Self { fs }
    }

    /// The underlying delegate.
    pub fn delegate(&self) -> &Arc<dyn Filesystem> {
        &self.fs
    }

    /// List a virtual directory, filtered.
    ///
    /// The synthetic root lists the root names as directories in mapping
    /// order; the engine triggers a root rebuild before calling in for `/`.
    pub async fn list_dir(
        &self,
        roots: &RootMap,
        filters: &FilterSet,
        vpath: &str,
    ) -> LensResult<Vec<DirEntry>> {
        if is_synthetic_root(vpath) {
            return Ok(roots.names().map(DirEntry::directory).collect());
        }

        let (real, subpath) = roots.resolve(vpath)?;
        let entries = self.fs.list(&real).await?;
        let total = entries.len();
        let visible = select_visible(filters, &subpath, entries);
        trace!(vpath, total, visible = visible.len(), "listed virtual directory");
        Ok(visible)
    }

    /// Stat a virtual path.
    ///
    /// The synthetic root is a fixed read-only directory stamped with the
    /// last rebuild time; everything else mirrors its real counterpart.
    pub async fn stat(&self, roots: &RootMap, vpath: &str) -> LensResult<Metadata> {
        if is_synthetic_root(vpath) {
            let stamp = roots
                .rebuilt_at()
                .unwrap_or(std::time::UNIX_EPOCH);
            return Ok(Metadata::synthetic_dir(stamp));
        }

        let (real, _) = roots.resolve(vpath)?;
        Ok(self.fs.stat(&real).await?)
    }

    pub async fn read(&self, roots: &RootMap, vpath: &str) -> LensResult<Vec<u8>> {
        let (real, _) = roots.resolve(vpath)?;
        Ok(self.fs.read(&real).await?)
    }

    pub async fn write(&self, roots: &RootMap, vpath: &str, data: &[u8]) -> LensResult<()> {
        let (real, _) = roots.resolve(vpath)?;
        Ok(self.fs.write(&real, data).await?)
    }

    pub async fn mkdir(&self, roots: &RootMap, vpath: &str) -> LensResult<()> {
        if is_synthetic_root(vpath) {
            return Err(LensError::PermissionDenied("/".to_string()));
        }
        let (real, _) = roots.resolve(vpath)?;
        Ok(self.fs.mkdir(&real).await?)
    }

    pub async fn remove(&self, roots: &RootMap, vpath: &str) -> LensResult<()> {
        if is_synthetic_root(vpath) {
            return Err(LensError::PermissionDenied("/".to_string()));
        }
        let (real, _) = roots.resolve(vpath)?;
        Ok(self.fs.remove(&real).await?)
    }

    /// Rename across the virtual namespace. Endpoints resolve independently
    /// and may live under different roots.
    pub async fn rename(&self, roots: &RootMap, from: &str, to: &str) -> LensResult<()> {
        let (real_from, _) = roots.resolve(from)?;
        let (real_to, _) = roots.resolve(to)?;
        Ok(self.fs.rename(&real_from, &real_to).await?)
    }

    /// Copy a file across the virtual namespace.
    pub async fn copy(&self, roots: &RootMap, from: &str, to: &str) -> LensResult<()> {
        let (real_from, _) = roots.resolve(from)?;
        let (real_to, _) = roots.resolve(to)?;
        Ok(self.fs.copy(&real_from, &real_to).await?)
    }
}

/// True for `/`, the empty string, or any all-separator spelling.
fn is_synthetic_root(vpath: &str) -> bool {
    vpath.trim_matches('/').is_empty()
}
