//! Change notification contract.
//!
//! The engine's only obligation is to hand the observer correctly-shaped
//! batches synchronously after each mutation completes — never before, and
//! never describing intermediate states. Delivery and dispatch mechanics
//! belong to the host integration layer.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::trace;

use crate::paths;

/// What happened to a virtual path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Changed,
    Deleted,
}

/// One change to the virtual view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    /// Virtual path, e.g. `/proj/libs/common`.
    pub path: String,
    pub kind: ChangeKind,
}

impl Change {
    pub fn new(path: impl Into<String>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// The change's path rendered under the `lens://` scheme.
    pub fn uri(&self) -> String {
        paths::to_uri(&self.path)
    }
}

/// Host-facing notification seam.
///
/// A batch atomically describes the new state; consumers re-query rather
/// than replaying the batch as a sequence of steps.
pub trait ViewObserver: Send + Sync {
    /// Opaque "something structural changed" signal; consumers re-query.
    fn tree_changed(&self);

    /// A batch of virtual-path changes, emitted after the mutation.
    fn view_changed(&self, batch: &[Change]);

    /// The virtual root gained content and should join the host workspace.
    fn attach_virtual_root(&self) {}

    /// The virtual root is empty or shutting down; drop it from the host.
    fn detach_virtual_root(&self) {}
}

/// Observer that discards everything. Default for embedded use.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl ViewObserver for NullObserver {
    fn tree_changed(&self) {}
    fn view_changed(&self, _batch: &[Change]) {}
}

/// Events forwarded over a channel, for hosts that consume a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    TreeChanged,
    ViewChanged(Vec<Change>),
    AttachRoot,
    DetachRoot,
}

/// Observer backed by an unbounded channel.
///
/// Sends never block; if the receiver is gone the event is dropped, which is
/// the right behavior during shutdown.
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<ViewEvent>,
}

impl ChannelObserver {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<ViewEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }
}

impl ViewObserver for ChannelObserver {
    fn tree_changed(&self) {
        let _ = self.tx.send(ViewEvent::TreeChanged);
    }

    fn view_changed(&self, batch: &[Change]) {
        trace!(len = batch.len(), "view change batch");
        let _ = self.tx.send(ViewEvent::ViewChanged(batch.to_vec()));
    }

    fn attach_virtual_root(&self) {
        let _ = self.tx.send(ViewEvent::AttachRoot);
    }

    fn detach_virtual_root(&self) {
        let _ = self.tx.send(ViewEvent::DetachRoot);
    }
}

/// Reconcile the host's ordered workspace list with the virtual root.
///
/// `folders` is the host's current ordered list of folder URIs. When no real
/// (non-`lens`) folders remain, everything goes — an empty filtered view has
/// nothing to show. Otherwise the virtual root URI appears exactly once, as
/// the last entry, so host folder-addition semantics stay undisturbed.
/// Idempotent.
pub fn reconcile_workspace(folders: &[String]) -> Vec<String> {
    let scheme_prefix = format!("{}://", paths::SCHEME);
    let real: Vec<String> = folders
        .iter()
        .filter(|f| !f.starts_with(&scheme_prefix))
        .cloned()
        .collect();

    if real.is_empty() {
        return Vec::new();
    }

    let mut out = real;
    out.push(virtual_root_uri());
    out
}

/// URI of the synthetic virtual root.
pub fn virtual_root_uri() -> String {
    paths::to_uri("/")
}

#[cfg(test)]
pub mod testing {
    //! Recording observer for engine tests.

    use super::*;
    use std::sync::Mutex;

    /// Records every notification for later assertions.
    #[derive(Debug, Default)]
    pub struct RecordingObserver {
        pub tree_changes: Mutex<usize>,
        pub batches: Mutex<Vec<Vec<Change>>>,
        pub attaches: Mutex<usize>,
        pub detaches: Mutex<usize>,
    }

    impl RecordingObserver {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        /// All recorded changes, flattened across batches.
        pub fn all_changes(&self) -> Vec<Change> {
            self.batches
                .lock()
                .unwrap()
                .iter()
                .flatten()
                .cloned()
                .collect()
        }
    }

    impl ViewObserver for RecordingObserver {
        fn tree_changed(&self) {
            *self.tree_changes.lock().unwrap() += 1;
        }

        fn view_changed(&self, batch: &[Change]) {
            self.batches.lock().unwrap().push(batch.to_vec());
        }

        fn attach_virtual_root(&self) {
            *self.attaches.lock().unwrap() += 1;
        }

        fn detach_virtual_root(&self) {
            *self.detaches.lock().unwrap() += 1;
        }
    }
}
