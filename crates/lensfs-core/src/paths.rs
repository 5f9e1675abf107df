//! Virtual path helpers.
//!
//! Virtual paths are `/`-delimited strings rooted at the synthetic root `/`.
//! The first segment names a registered root; the remainder is the *subpath*
//! used for all filter matching. Helpers here only do string math — nothing
//! in this module touches the filesystem.

use std::path::PathBuf;

/// URI scheme under which virtual paths are presented to hosts.
pub const SCHEME: &str = "lens";

/// Split a virtual path into `(root name, subpath)`.
///
/// Returns `None` for the synthetic root (`/` or the empty string).
/// The subpath is empty when the path names the root entry itself.
pub fn split_virtual(path: &str) -> Option<(&str, &str)> {
    let trimmed = path.trim_start_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.split_once('/') {
        Some((root, rest)) => Some((root, rest.trim_end_matches('/'))),
        None => Some((trimmed, "")),
    }
}

/// Join a root name and subpath back into a virtual path.
pub fn join_virtual(root: &str, subpath: &str) -> String {
    if subpath.is_empty() {
        format!("/{root}")
    } else {
        format!("/{root}/{}", subpath.trim_matches('/'))
    }
}

/// Render a virtual path as a URI (`lens:///proj/libs`).
pub fn to_uri(path: &str) -> String {
    format!("{SCHEME}://{path}")
}

/// All strict ancestors of a subpath, shortest first.
///
/// `"libs/common/x"` yields `["libs", "libs/common"]`. Used to signal the
/// ancestor chain of a freshly added filter so intermediate nodes refresh.
pub fn ancestors(subpath: &str) -> Vec<String> {
    let trimmed = subpath.trim_matches('/');
    let mut out = Vec::new();
    for (i, ch) in trimmed.char_indices() {
        if ch == '/' {
            out.push(trimmed[..i].to_string());
        }
    }
    out
}

/// A source path handed to `add_prefix`.
///
/// Plain paths and `file://` URIs are local; anything else carries a foreign
/// scheme the engine cannot address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourcePath {
    /// A real local filesystem path.
    Local(PathBuf),
    /// A non-local source; the engine refuses these.
    Foreign { scheme: String },
}

impl SourcePath {
    /// Parse a raw source string.
    ///
    /// `file:///w/proj` and `/w/proj` are equivalent. A `scheme://` prefix
    /// other than `file` is preserved for the error message.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once("://") {
            Some(("file", rest)) => SourcePath::Local(PathBuf::from(rest)),
            Some((scheme, _)) => SourcePath::Foreign {
                scheme: scheme.to_string(),
            },
            None => SourcePath::Local(PathBuf::from(raw)),
        }
    }
}
