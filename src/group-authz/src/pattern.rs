//! Full-match pattern compilation with compiled-regex caching
//!
//! Policy patterns must match the whole candidate string, and the text of the
//! first capturing group becomes the input for group matching. Patterns are
//! anchored once at compile time and the compiled `Regex` is cached by its
//! source text.

use dashmap::DashMap;
use regex::Regex;
use std::sync::Arc;
use tracing::warn;

use crate::error::{AuthzError, Result};

/// Default maximum number of cached patterns
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Compile `pattern` so that it only matches an entire input string
///
/// The pattern must be valid on its own before it is anchored; otherwise
/// the wrapper could close a group the pattern left open.
pub fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .and_then(|_| Regex::new(&format!("^(?:{})$", pattern)))
        .map_err(|e| {
            warn!("Rejected policy pattern {:?}: {}", pattern, e);
            AuthzError::Configuration(format!("invalid pattern '{}': {}", pattern, e))
        })
}

/// Extract the candidate input from `input` using a compiled full-match pattern
///
/// Returns `None` when the input does not match, when the pattern has no
/// capturing group, or when the first group captured empty text.
pub fn extract(regex: &Regex, input: &str) -> Option<String> {
    let captures = regex.captures(input)?;
    let group = captures.get(1)?;
    if group.as_str().is_empty() {
        return None;
    }
    Some(group.as_str().to_string())
}

/// Compiled pattern cache (thread-safe)
pub struct PatternCache {
    /// Compiled patterns keyed by their source text
    cache: Arc<DashMap<String, Arc<Regex>>>,

    /// Entries kept before the cache is flushed
    capacity: usize,
}

impl PatternCache {
    /// Create a cache with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    /// Create a cache holding at most `capacity` compiled patterns
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cache: Arc::new(DashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Compile a pattern, returning the cached program when available
    ///
    /// # Errors
    /// Returns `AuthzError::Configuration` if the pattern is not a valid regex
    pub fn get_or_compile(&self, pattern: &str) -> Result<Arc<Regex>> {
        if let Some(regex) = self.cache.get(pattern) {
            return Ok(regex.clone());
        }

        let regex = Arc::new(compile(pattern)?);

        if self.cache.len() >= self.capacity {
            self.cache.clear();
        }
        self.cache.insert(pattern.to_string(), regex.clone());

        Ok(regex)
    }

    /// Number of cached patterns
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Drop every cached pattern
    pub fn clear(&self) {
        self.cache.clear();
    }
}

impl Default for PatternCache {
    fn default() -> Self {
        Self::new()
    }
}
