//! Prefix filter set.
//!
//! Filters are literal path-segment prefixes relative to a named root.
//! Directory filters end in exactly one `/`; file filters carry no trailing
//! separator. Matching is case-sensitive and segment-aligned — there is no
//! glob or substring matching anywhere in this module.

use std::collections::BTreeSet;

/// The set of active prefix filters.
///
/// Stored sorted so presentation order is stable. Two predicates drive every
/// visibility decision:
///
/// - [`covers`](Self::covers): the subpath lies inside some filter's scope.
/// - [`leads_to_filter`](Self::leads_to_filter): the subpath is a strict
///   segment-ancestor of some filter, so descending through it can still
///   reach a match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    filters: BTreeSet<String>,
}

/// Canonicalize one raw filter string from a profile.
///
/// Collapses repeated trailing separators to one, strips a leading `/`, and
/// rejects empty strings (an empty filter would cover everything). Strings
/// without any trailing separator are file filters and pass through verbatim.
fn normalize(raw: &str) -> Option<String> {
    let lead_trimmed = raw.trim_start_matches('/');
    let stem = lead_trimmed.trim_end_matches('/');
    if stem.is_empty() {
        return None;
    }
    if lead_trimmed.ends_with('/') {
        Some(format!("{stem}/"))
    } else {
        Some(stem.to_string())
    }
}

/// A filter compared as a directory boundary: always separator-terminated.
fn dir_form(filter: &str) -> String {
    if filter.ends_with('/') {
        filter.to_string()
    } else {
        format!("{filter}/")
    }
}

impl FilterSet {
    /// Create an empty filter set. Nothing covers, nothing is reachable.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from raw profile strings, dropping anything that does not
    /// normalize. Never fails; garbage in the profile degrades to fewer
    /// filters, not an error.
    pub fn from_raw<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let filters = raw
            .into_iter()
            .filter_map(|s| normalize(s.as_ref()))
            .collect();
        Self { filters }
    }

    /// Replace the entire set with freshly normalized strings.
    ///
    /// No merge: stale entries absent from `raw` are dropped.
    pub fn replace<I, S>(&mut self, raw: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        *self = Self::from_raw(raw);
    }

    /// Insert a directory filter for `rel` (trailing separator enforced).
    ///
    /// Returns the stored filter string. Idempotent on the set.
    pub fn insert_dir(&mut self, rel: &str) -> Option<String> {
        let filter = normalize(&format!("{}/", rel.trim_end_matches('/')))?;
        self.filters.insert(filter.clone());
        Some(filter)
    }

    /// Insert a file filter for `rel` (no trailing separator).
    pub fn insert_file(&mut self, rel: &str) -> Option<String> {
        let filter = normalize(rel.trim_end_matches('/'))?;
        self.filters.insert(filter.clone());
        Some(filter)
    }

    /// Remove the exact filter string. Returns true if it was present.
    pub fn remove(&mut self, filter: &str) -> bool {
        self.filters.remove(filter)
    }

    /// True if `subpath` lies within some filter's scope.
    ///
    /// The test appends a single separator to the (separator-trimmed) subpath
    /// and asks whether any filter, in directory form, is a literal prefix.
    /// Comparing on separator-terminated strings keeps a file filter
    /// `libs/a.txt` from covering a sibling `libs/a.txtx`.
    pub fn covers(&self, subpath: &str) -> bool {
        let needle = format!("{}/", subpath.trim_end_matches('/'));
        self.filters.iter().any(|f| needle.starts_with(&dir_form(f)))
    }

    /// True if some filter, as a literal string, starts with `subpath + "/"`.
    ///
    /// This is strict ancestry: a normalized directory filter is never a
    /// prefix-of-filter of itself (`"a/"` would need a filter starting with
    /// `"a//"`).
    pub fn leads_to_filter(&self, subpath: &str) -> bool {
        let prefix = format!("{subpath}/");
        self.filters.iter().any(|f| f.starts_with(&prefix))
    }

    /// True if no filters are stored.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Number of stored filters.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Stored filters in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.filters.iter().map(|s| s.as_str())
    }

    /// Snapshot of the set for persistence.
    pub fn to_vec(&self) -> Vec<String> {
        self.filters.iter().cloned().collect()
    }
}
