//! Hierarchical group paths

use std::fmt;

/// Path separator between group names
pub const SEPARATOR: char = '/';

/// A `/`-delimited group path such as `/org/eng/backend`
///
/// Descendant checks respect segment boundaries: `/org/eng` is an ancestor
/// of `/org/eng/backend` but not of `/org/engineering`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupPath {
    /// Path without a trailing separator
    raw: String,
}

impl GroupPath {
    /// Create a path, dropping trailing separators
    pub fn new(path: &str) -> Self {
        Self {
            raw: path.trim_end_matches(SEPARATOR).to_string(),
        }
    }

    /// The normalized path string
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Non-empty path segments, root first
    pub fn segments(&self) -> Vec<&str> {
        self.raw.split(SEPARATOR).filter(|s| !s.is_empty()).collect()
    }

    /// Number of segments
    pub fn depth(&self) -> usize {
        self.segments().len()
    }

    /// Parent path, or `None` for a top-level group
    pub fn parent(&self) -> Option<GroupPath> {
        let idx = self.raw.rfind(SEPARATOR)?;
        if idx == 0 {
            return None;
        }
        Some(Self {
            raw: self.raw[..idx].to_string(),
        })
    }

    /// Whether `other` names this group or one of its descendants
    ///
    /// `other` must equal the path, or continue it with a separator. The
    /// comparison uses the normalized path, so a group stored as `/org/eng/`
    /// matches `/org/eng` and `/org/eng/backend` alike. An empty path is
    /// nobody's ancestor.
    pub fn is_self_or_ancestor_of(&self, other: &str) -> bool {
        if self.raw.is_empty() {
            return false;
        }

        match other.strip_prefix(self.raw.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with(SEPARATOR),
            None => false,
        }
    }
}

impl fmt::Display for GroupPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Whether a claim value is a hierarchical path rather than a bare group name
pub fn is_path(value: &str) -> bool {
    value.contains(SEPARATOR)
}
