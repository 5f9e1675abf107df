//! Change-watches on registered roots.
//!
//! Each rebuild establishes one debounced recursive watch per root base.
//! Real create/modify/remove notifications are re-rooted into virtual paths
//! (`/{root}/{relative}`) and handed to the observer as a single batch per
//! debounce window. Watches are disposed by dropping the debouncer before a
//! rebuild replaces them — never leaked to be collected implicitly.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{EventKind, RecommendedWatcher, RecursiveMode};
use notify_debouncer_full::{DebouncedEvent, Debouncer, RecommendedCache, new_debouncer};
use tracing::{debug, warn};

use crate::error::LensResult;
use crate::events::{Change, ChangeKind, ViewObserver};
use crate::paths::join_virtual;

const DEBOUNCE_WINDOW: Duration = Duration::from_millis(500);

/// Owns the active watches for the current root mapping.
///
/// Dropping (or calling [`stop`](Self::stop)) tears the watches down; a
/// fresh [`start`](Self::start) fully replaces them.
#[derive(Default)]
pub struct RootWatcher {
    debouncer: Option<Debouncer<RecommendedWatcher, RecommendedCache>>,
}

impl std::fmt::Debug for RootWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RootWatcher")
            .field("active", &self.debouncer.is_some())
            .finish()
    }
}

impl RootWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Watch every `(name, base)` pair, reporting changes to `observer`.
    ///
    /// Any previously started watches are discarded first.
    pub fn start(
        &mut self,
        roots: &[(String, PathBuf)],
        observer: Arc<dyn ViewObserver>,
    ) -> LensResult<()> {
        self.stop();
        if roots.is_empty() {
            return Ok(());
        }

        let table = roots.to_vec();
        let mut debouncer = new_debouncer(
            DEBOUNCE_WINDOW,
            None,
            move |result: Result<Vec<DebouncedEvent>, Vec<notify::Error>>| match result {
                Ok(events) => {
                    let batch = translate(&table, &events);
                    if !batch.is_empty() {
                        let structural = batch
                            .iter()
                            .any(|c| c.kind != ChangeKind::Changed);
                        observer.view_changed(&batch);
                        if structural {
                            observer.tree_changed();
                        }
                    }
                }
                Err(errors) => {
                    for error in errors {
                        warn!(%error, "root watch error");
                    }
                }
            },
        )
        .map_err(std::io::Error::other)?;

        for (name, base) in roots {
            debouncer
                .watch(base, RecursiveMode::Recursive)
                .map_err(std::io::Error::other)?;
            debug!(root = %name, base = %base.display(), "watching root");
        }

        self.debouncer = Some(debouncer);
        Ok(())
    }

    /// Dispose all watches.
    pub fn stop(&mut self) {
        self.debouncer = None;
    }

    pub fn is_active(&self) -> bool {
        self.debouncer.is_some()
    }
}

/// Translate debounced real-path events into a virtual-path change batch.
fn translate(roots: &[(String, PathBuf)], events: &[DebouncedEvent]) -> Vec<Change> {
    let mut batch = Vec::new();
    for event in events {
        let kind = match event.kind {
            EventKind::Create(_) => ChangeKind::Created,
            EventKind::Remove(_) => ChangeKind::Deleted,
            EventKind::Modify(_) => ChangeKind::Changed,
            _ => continue,
        };
        for path in &event.paths {
            if let Some(vpath) = reroot(roots, path) {
                batch.push(Change::new(vpath, kind));
            }
        }
    }
    batch
}

/// Map a real path back into the virtual namespace, if any root contains it.
fn reroot(roots: &[(String, PathBuf)], real: &Path) -> Option<String> {
    for (name, base) in roots {
        if let Ok(rel) = real.strip_prefix(base) {
            let rel = rel.to_string_lossy();
            return Some(join_virtual(name, rel.trim_matches('/')));
        }
    }
    None
}
