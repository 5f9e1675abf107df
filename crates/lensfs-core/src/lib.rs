//! lensfs-core: a filtered virtual filesystem view over real directory trees.
//!
//! Named real roots are aggregated under a synthetic virtual root; a set of
//! literal path-prefix filters decides which entries each directory listing
//! exposes. All I/O is delegated to the real filesystem — the view is derived
//! per query and never persisted.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                        Lens                             │
//! │  ┌────────────┐  ┌───────────┐  ┌────────────────────┐  │
//! │  │ FilterSet  │  │  RootMap  │  │  ScopedView        │  │
//! │  │ (prefixes) │  │ (name→dir)│  │  (visibility)      │  │
//! │  └────────────┘  └───────────┘  └─────────┬──────────┘  │
//! │  ┌────────────┐  ┌───────────┐            │             │
//! │  │ProfileStore│  │RootWatcher│   Arc<dyn Filesystem>    │
//! │  └────────────┘  └───────────┘            │             │
//! └───────────────────────────────────────────┼─────────────┘
//!                                      real filesystem
//! ```
//!
//! Visibility per listed entry is three-way: the listed directory is inside
//! a filter's scope (everything visible), the entry leads toward a deeper
//! filter (visible as a pass-through), or neither (hidden).

pub mod config;
pub mod error;
pub mod events;
pub mod filters;
pub mod lens;
pub mod paths;
pub mod roots;
pub mod vfs;
pub mod view;
pub mod watch;

pub use config::{JsonFileStore, MemoryStore, Profile, ProfileStore};
pub use error::{LensError, LensResult};
pub use events::{
    Change, ChangeKind, ChannelObserver, NullObserver, ViewEvent, ViewObserver,
    reconcile_workspace, virtual_root_uri,
};
pub use filters::FilterSet;
pub use lens::{Lens, LensConfig};
pub use roots::RootMap;
pub use vfs::{DirEntry, EntryType, Filesystem, LocalFs, Metadata};
pub use view::ScopedView;
pub use watch::RootWatcher;
