//! The engine owning filter, root and view state.
//!
//! A [`Lens`] is an explicit value, not a singleton: all mutation funnels
//! through its methods on `&mut self`, all change batches go out through the
//! observer after the mutation completes, and the session's filter set is
//! mirrored to the profile store on every add/remove.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::{Profile, ProfileStore};
use crate::error::{LensError, LensResult};
use crate::events::{Change, ChangeKind, ViewObserver};
use crate::filters::FilterSet;
use crate::paths::{SourcePath, ancestors, join_virtual};
use crate::roots::RootMap;
use crate::vfs::{DirEntry, Filesystem, Metadata};
use crate::view::ScopedView;
use crate::watch::RootWatcher;

/// Engine construction options.
#[derive(Debug, Clone, Default)]
pub struct LensConfig {
    /// Establish real change-watches on registered roots.
    ///
    /// Off by default so embedded and test sessions stay inert; the CLI and
    /// long-lived hosts turn it on.
    pub watch_roots: bool,
}

/// The filtering/mapping engine.
pub struct Lens {
    config: LensConfig,
    filters: FilterSet,
    roots: RootMap,
    view: ScopedView,
    store: Arc<dyn ProfileStore>,
    observer: Arc<dyn ViewObserver>,
    watcher: RootWatcher,
}

impl Lens {
    pub fn new(
        config: LensConfig,
        fs: Arc<dyn Filesystem>,
        store: Arc<dyn ProfileStore>,
        observer: Arc<dyn ViewObserver>,
    ) -> Self {
        Self {
            config,
            filters: FilterSet::new(),
            roots: RootMap::new(),
            view: ScopedView::new(fs),
            store,
            observer,
            watcher: RootWatcher::new(),
        }
    }

    /// Load the profile and bring filters, roots and watches up.
    ///
    /// Attaches the virtual root to the host workspace when the mapping is
    /// non-empty. Startup counterpart of [`shutdown`](Self::shutdown).
    pub async fn start(&mut self) -> LensResult<()> {
        self.reload().await?;
        self.rebuild_roots().await?;
        if !self.roots.is_empty() {
            self.observer.attach_virtual_root();
        }
        Ok(())
    }

    /// Drop watches and detach the virtual root. Idempotent.
    pub fn shutdown(&mut self) {
        self.watcher.stop();
        self.observer.detach_virtual_root();
    }

    /// Replace the filter set from the store.
    ///
    /// No merge: entries absent from the reloaded list are dropped. Never
    /// fails on an absent profile — that is simply an empty set.
    pub async fn reload(&mut self) -> LensResult<()> {
        let profile = self.store.load().await?;
        self.filters.replace(profile.filters.iter());
        debug!(filters = self.filters.len(), "reloaded filter set");

        self.observer
            .view_changed(&[Change::new("/", ChangeKind::Changed)]);
        self.observer.tree_changed();
        Ok(())
    }

    /// Rebuild the root mapping from the store's named sources.
    ///
    /// Prior watches and mappings are fully discarded before re-registering.
    /// An empty resulting mapping detaches the virtual root. Always ends by
    /// signaling a view change for `/`.
    pub async fn rebuild_roots(&mut self) -> LensResult<()> {
        let profile = self.store.load().await?;

        self.watcher.stop();
        self.roots.rebuild(
            profile
                .roots
                .iter()
                .map(|(name, uri)| (name.clone(), SourcePath::parse(uri))),
        );

        if self.config.watch_roots && !self.roots.is_empty() {
            let table: Vec<_> = self
                .roots
                .bases()
                .map(|(n, b)| (n.to_string(), b.to_path_buf()))
                .collect();
            self.watcher.start(&table, Arc::clone(&self.observer))?;
        }

        info!(
            roots = self.roots.len(),
            generation = self.roots.generation(),
            "rebuilt root mapping"
        );

        if self.roots.is_empty() {
            self.observer.detach_virtual_root();
        }
        self.observer
            .view_changed(&[Change::new("/", ChangeKind::Changed)]);
        Ok(())
    }

    /// Add a filter derived from a real path.
    ///
    /// The path must be a `file`-scheme source under some registered root.
    /// Directories store a trailing-separator filter; files store the bare
    /// relative path. Idempotent on the set, but always persists and
    /// signals. Returns the stored filter string.
    pub async fn add_prefix(&mut self, raw_source: &str) -> LensResult<String> {
        let real = match SourcePath::parse(raw_source) {
            SourcePath::Local(path) => path,
            SourcePath::Foreign { scheme } => {
                return Err(LensError::UnsupportedSource(scheme));
            }
        };

        let (root, rel) = self
            .roots
            .relativize(&real)
            .map(|(n, r)| (n.to_string(), r))
            .ok_or_else(|| LensError::NotFound(real.display().to_string()))?;

        // Suspension point: directory vs. file decides the filter shape.
        let meta = self.view.delegate().stat(&real).await?;
        let filter = if meta.is_dir {
            self.filters.insert_dir(&rel)
        } else {
            self.filters.insert_file(&rel)
        }
        .ok_or_else(|| LensError::NotFound(real.display().to_string()))?;

        self.persist().await?;

        // Ancestors first, so tree consumers re-expand intermediate nodes.
        let mut batch: Vec<Change> = ancestors(&rel)
            .into_iter()
            .map(|a| Change::new(join_virtual(&root, &a), ChangeKind::Changed))
            .collect();
        batch.push(Change::new(
            join_virtual(&root, rel.trim_end_matches('/')),
            ChangeKind::Created,
        ));
        self.observer.view_changed(&batch);
        self.observer.tree_changed();

        info!(filter, root, "added prefix filter");
        Ok(filter)
    }

    /// Remove the exact filter string.
    ///
    /// A no-op on the set if absent, but still persists and signals, so a
    /// stale host entry always converges.
    pub async fn remove_prefix(&mut self, filter: &str) -> LensResult<()> {
        let removed = self.filters.remove(filter);
        self.persist().await?;

        // Previously-matched subtrees disappear from every root's view.
        let subpath = filter.trim_end_matches('/');
        let batch: Vec<Change> = self
            .roots
            .names()
            .map(|name| Change::new(join_virtual(name, subpath), ChangeKind::Deleted))
            .collect();
        self.observer.view_changed(&batch);
        self.observer.tree_changed();

        debug!(filter, removed, "removed prefix filter");
        Ok(())
    }

    /// List a virtual directory.
    ///
    /// Listing the synthetic root re-derives the root mapping first.
    pub async fn list_dir(&mut self, vpath: &str) -> LensResult<Vec<DirEntry>> {
        if vpath.trim_matches('/').is_empty() {
            self.rebuild_roots().await?;
        }
        self.view.list_dir(&self.roots, &self.filters, vpath).await
    }

    pub async fn stat(&self, vpath: &str) -> LensResult<Metadata> {
        self.view.stat(&self.roots, vpath).await
    }

    pub async fn read(&self, vpath: &str) -> LensResult<Vec<u8>> {
        self.view.read(&self.roots, vpath).await
    }

    pub async fn write(&self, vpath: &str, data: &[u8]) -> LensResult<()> {
        self.view.write(&self.roots, vpath, data).await
    }

    pub async fn mkdir(&self, vpath: &str) -> LensResult<()> {
        self.view.mkdir(&self.roots, vpath).await
    }

    pub async fn remove(&self, vpath: &str) -> LensResult<()> {
        self.view.remove(&self.roots, vpath).await
    }

    pub async fn rename(&self, from: &str, to: &str) -> LensResult<()> {
        self.view.rename(&self.roots, from, to).await
    }

    pub async fn copy(&self, from: &str, to: &str) -> LensResult<()> {
        self.view.copy(&self.roots, from, to).await
    }

    /// Current filters in lexicographic order.
    pub fn filters(&self) -> Vec<String> {
        self.filters.to_vec()
    }

    /// Current root mapping (read-only).
    pub fn roots(&self) -> &RootMap {
        &self.roots
    }

    /// Mirror the in-memory filter set back to the store, preserving the
    /// stored root sources.
    async fn persist(&self) -> LensResult<()> {
        let mut profile = self.store.load().await.unwrap_or_else(|_| Profile::default());
        profile.filters = self.filters.to_vec();
        self.store.save(&profile).await
    }
}
