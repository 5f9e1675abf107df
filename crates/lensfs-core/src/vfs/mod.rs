//! Real-filesystem delegates.
//!
//! The engine's I/O seam. Everything the view reads or mutates flows through
//! the [`Filesystem`] trait:
//!
//! - **LocalFs**: pass-through to the real filesystem (`tokio::fs`)
//! - **MemFs** (tests only): deterministic in-memory delegate
//!
//! Delegates see absolute real paths; virtual-to-real resolution happens in
//! the root map before any call lands here.

mod local;
mod traits;

#[cfg(test)]
pub mod testing;

pub use local::LocalFs;
pub use traits::{DirEntry, EntryType, Filesystem, Metadata};

#[cfg(test)]
pub use testing::MemFs;
