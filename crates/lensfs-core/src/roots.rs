//! Named root mapping.
//!
//! Each registered root pairs a name (the first virtual path segment) with a
//! real base directory. The mapping is fully replaced on each rebuild, never
//! patched; a generation counter makes superseded mappings observable to
//! in-flight work.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

use crate::error::{LensError, LensResult};
use crate::paths::{SourcePath, split_virtual};

/// Mapping from root names to real base paths.
///
/// Keyed by a `BTreeMap` so iteration order is stable; the synthetic root's
/// children are listed in this order.
#[derive(Debug, Default)]
pub struct RootMap {
    roots: BTreeMap<String, PathBuf>,
    generation: u64,
    rebuilt_at: Option<SystemTime>,
}

impl RootMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole mapping from the given named sources.
    ///
    /// Only `file`-scheme sources register; foreign schemes are silently
    /// skipped. Bumps the generation and stamps the rebuild time. Safe to
    /// call repeatedly.
    pub fn rebuild<I, S>(&mut self, sources: I)
    where
        I: IntoIterator<Item = (S, SourcePath)>,
        S: Into<String>,
    {
        self.roots.clear();
        for (name, source) in sources {
            match source {
                SourcePath::Local(base) => {
                    self.roots.insert(name.into(), base);
                }
                SourcePath::Foreign { scheme } => {
                    debug!(scheme, "skipping non-local root source");
                }
            }
        }
        self.generation += 1;
        self.rebuilt_at = Some(SystemTime::now());
    }

    /// Resolve a virtual path to `(real path, subpath)`.
    ///
    /// Fails with `NotFound` when the first segment names no registered root,
    /// and with `PermissionDenied` when the subpath could escape the base
    /// (`.`, `..`, or empty segments). The synthetic root itself has no real
    /// counterpart and also resolves to `NotFound` here; callers special-case
    /// it before resolving.
    pub fn resolve(&self, vpath: &str) -> LensResult<(PathBuf, String)> {
        let (root, subpath) =
            split_virtual(vpath).ok_or_else(|| LensError::NotFound(vpath.to_string()))?;
        let base = self
            .roots
            .get(root)
            .ok_or_else(|| LensError::NotFound(vpath.to_string()))?;

        // An empty segment leaves the remainder absolute, so `join` would
        // discard the base entirely; `..` walks out of it.
        if !subpath.is_empty()
            && subpath
                .split('/')
                .any(|seg| seg.is_empty() || seg == "." || seg == "..")
        {
            return Err(LensError::PermissionDenied(vpath.to_string()));
        }

        let real = if subpath.is_empty() {
            base.clone()
        } else {
            base.join(subpath)
        };
        Ok((real, subpath.to_string()))
    }

    /// Find the root containing a real path, returning `(name, subpath)`.
    ///
    /// Used by `add_prefix` to turn a real candidate path into a filter
    /// relative to its containing root.
    pub fn relativize(&self, real: &Path) -> Option<(&str, String)> {
        for (name, base) in &self.roots {
            if let Ok(rel) = real.strip_prefix(base) {
                let rel = rel
                    .to_string_lossy()
                    .trim_matches('/')
                    .to_string();
                return Some((name.as_str(), rel));
            }
        }
        None
    }

    /// Root names in mapping-iteration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.roots.keys().map(|s| s.as_str())
    }

    /// Real base paths in mapping-iteration order.
    pub fn bases(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.roots.iter().map(|(n, b)| (n.as_str(), b.as_path()))
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Rebuild generation; increments once per rebuild.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Timestamp of the last rebuild; the synthetic root's mtime.
    pub fn rebuilt_at(&self) -> Option<SystemTime> {
        self.rebuilt_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RootMap {
        let mut map = RootMap::new();
        map.rebuild([
            ("proj", SourcePath::parse("/w/proj")),
            ("docs", SourcePath::parse("file:///w/docs")),
        ]);
        map
    }

    #[test]
    fn test_resolve_root_entry() {
        let map = sample();
        let (real, sub) = map.resolve("/proj").unwrap();
        assert_eq!(real, PathBuf::from("/w/proj"));
        assert_eq!(sub, "");
    }

    #[test]
    fn test_resolve_nested() {
        let map = sample();
        let (real, sub) = map.resolve("/proj/libs/common").unwrap();
        assert_eq!(real, PathBuf::from("/w/proj/libs/common"));
        assert_eq!(sub, "libs/common");
    }

    #[test]
    fn test_resolve_unknown_root() {
        let map = sample();
        let err = map.resolve("/nope/x").unwrap_err();
        assert!(matches!(err, LensError::NotFound(p) if p == "/nope/x"));
    }

    #[test]
    fn test_resolve_rejects_escaping_subpaths() {
        let map = sample();
        for vpath in [
            "/proj/../secret.txt",
            "/proj/libs/../../secret.txt",
            "/proj//etc/passwd",
            "/proj/./x",
            "/proj/a//b",
        ] {
            let err = map.resolve(vpath).unwrap_err();
            assert!(
                matches!(err, LensError::PermissionDenied(p) if p == vpath),
                "expected {vpath} to be rejected"
            );
        }
    }

    #[test]
    fn test_resolve_synthetic_root_fails() {
        let map = sample();
        assert!(map.resolve("/").is_err());
    }

    #[test]
    fn test_foreign_sources_skipped() {
        let mut map = RootMap::new();
        map.rebuild([
            ("local", SourcePath::parse("/w/local")),
            ("remote", SourcePath::parse("sftp://host/w")),
        ]);
        assert_eq!(map.len(), 1);
        assert!(map.resolve("/remote").is_err());
    }

    #[test]
    fn test_rebuild_replaces_and_bumps_generation() {
        let mut map = sample();
        assert_eq!(map.generation(), 1);
        map.rebuild([("other", SourcePath::parse("/w/other"))]);
        assert_eq!(map.generation(), 2);
        assert!(map.resolve("/proj").is_err());
        assert!(map.resolve("/other").is_ok());
        assert!(map.rebuilt_at().is_some());
    }

    #[test]
    fn test_relativize() {
        let map = sample();
        let (name, rel) = map.relativize(Path::new("/w/proj/libs/common")).unwrap();
        assert_eq!(name, "proj");
        assert_eq!(rel, "libs/common");

        let (name, rel) = map.relativize(Path::new("/w/proj")).unwrap();
        assert_eq!(name, "proj");
        assert_eq!(rel, "");

        assert!(map.relativize(Path::new("/elsewhere")).is_none());
    }

    #[test]
    fn test_names_ordered() {
        let map = sample();
        let names: Vec<_> = map.names().collect();
        assert_eq!(names, vec!["docs", "proj"]);
    }
}
